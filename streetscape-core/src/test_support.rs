//! Builders for small planar scenes used by unit and behaviour tests.
//!
//! Coordinates are metres in an arbitrary planar frame, so scenes pair
//! naturally with [`crate::PlanarIdentity`].

use geo::{LineString, Point, Polygon, Rect, coord};

use crate::{ElementGeometry, ElementId, OsmElement, Tags};

/// Axis-aligned rectangle polygon.
#[must_use]
pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }).to_polygon()
}

/// Closed way describing an area.
#[must_use]
pub fn area_way(raw: i64, polygon: Polygon<f64>, tags: &[(&str, &str)]) -> OsmElement {
    OsmElement::new(
        ElementId::way(raw),
        ElementGeometry::Area(polygon),
        tags.iter().copied().collect::<Tags>(),
    )
}

/// Open way through `coords`.
#[must_use]
pub fn line_way(raw: i64, coords: &[(f64, f64)], tags: &[(&str, &str)]) -> OsmElement {
    OsmElement::new(
        ElementId::way(raw),
        ElementGeometry::Line(LineString::from(coords.to_vec())),
        tags.iter().copied().collect::<Tags>(),
    )
}

/// Tagged node at `(x, y)`.
#[must_use]
pub fn tagged_node(raw: i64, x: f64, y: f64, tags: &[(&str, &str)]) -> OsmElement {
    OsmElement::new(
        ElementId::node(raw),
        ElementGeometry::Point(Point::new(x, y)),
        tags.iter().copied().collect::<Tags>(),
    )
}
