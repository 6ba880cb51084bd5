//! Buffer engine: footprints for lines and points, repair for areas.
//!
//! Lines become flat-capped strips whose total width comes from tags or the
//! width tables in [`WidthConfig`]; point barriers become disks. Areas are
//! snapped to a grid, stripped of repeated vertices and unioned with
//! themselves to dissolve self-intersections. A polygon that cannot be
//! repaired is reported as a [`GeometryError`] and dropped by the caller.

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap};
use geo::{Area, BooleanOps, LineString, MapCoords, MultiPolygon, Polygon, RemoveRepeatedPoints};
use log::debug;
use streetscape_core::{
    ElementGeometry, ElementId, GeometryElement, GeometryError, OsmElement, ShapeKind, SpaceType,
    Tags, WidthConfig,
};

use crate::geometry::{empty, snap};

/// A candidate footprint together with the shape of its source geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// Footprint and classification.
    pub element: GeometryElement,
    /// Shape of the geometry the footprint was built from.
    pub shape: ShapeKind,
}

/// Read a width tag such as `3.5`, `3,5 m` or `4m`.
///
/// Only the leading number counts; zero, negative and unparsable values
/// yield `None`.
#[must_use]
pub fn parse_width(raw: &str) -> Option<f64> {
    let normalised = raw.trim().replace(',', ".");
    let end = normalised
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(normalised.len(), |(i, _)| i);
    let value: f64 = normalised.get(..end)?.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Carriageway width of a highway line, from tags or estimated.
///
/// `width:carriageway` wins over `width`. Without either, the estimate
/// starts from the default roadway width for the highway value (one-way
/// roads use the narrower value), scales it by `lanes`, then adds cycle
/// infrastructure and street-side parking.
#[must_use]
pub fn highway_width(tags: &Tags, widths: &WidthConfig) -> f64 {
    if let Some(width) = tags
        .get("width:carriageway")
        .and_then(parse_width)
        .or_else(|| tags.get("width").and_then(parse_width))
    {
        return width;
    }

    let highway = tags.get("highway").unwrap_or_default();
    let oneway = tags.has("oneway") && !tags.is("oneway", "no");
    let defaults = widths.highway.get(highway).unwrap_or(&widths.highway_fallback);
    let (mut width, usual_lanes) = if oneway {
        (defaults.unidirectional, 1.0)
    } else {
        (defaults.bidirectional, 2.0)
    };

    if let Some(lanes) = tags.get("lanes").and_then(parse_width) {
        if (lanes - usual_lanes).abs() > f64::EPSILON {
            width *= lanes / usual_lanes;
        }
    }

    if highway != "cycleway" {
        for (key, values) in &widths.cycleway {
            if let Some(extra) = tags.get(key).and_then(|value| values.get(value)) {
                width += extra;
            }
        }
    }

    if widths.streetside_parking_highways.iter().any(|h| h == highway) {
        width += widths.streetside_parking;
    }
    width
}

/// Total width of a line footprint, or `None` when the line has no width model.
#[must_use]
pub fn line_width(tags: &Tags, space_type: Option<SpaceType>, widths: &WidthConfig) -> Option<f64> {
    if space_type == Some(SpaceType::Barrier) || tags.has("barrier") {
        let barrier = tags.get("barrier").unwrap_or_default();
        let width = tags
            .get("width")
            .and_then(parse_width)
            .or_else(|| widths.barrier.get(barrier).copied())
            .unwrap_or(widths.barrier_fallback);
        return Some(width);
    }
    if tags.is("railway", "tram") {
        return Some(widths.tram_gauge + widths.tram_extra);
    }
    if tags.is("railway", "rail") {
        return Some(widths.train_gauge + widths.train_extra);
    }
    if let Some(highway) = tags.get("highway") {
        let tabled = widths.highway.contains_key(highway);
        if space_type == Some(SpaceType::WalkingArea) && !tabled {
            return Some(tags.get("width").and_then(parse_width).unwrap_or(widths.pedestrian_way));
        }
        return Some(highway_width(tags, widths));
    }
    None
}

/// Flat-capped strip of total width `width` centred on `line`.
#[must_use]
pub fn buffer_line(line: &LineString<f64>, width: f64) -> MultiPolygon<f64> {
    if width <= 0.0 || line.0.len() < 2 {
        return empty();
    }
    line.buffer_with_style(BufferStyle::new(width / 2.0).line_cap(LineCap::Butt))
}

/// Square-capped strip used to close tiny gaps between outlines.
#[must_use]
pub fn buffer_line_square(line: &LineString<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance <= 0.0 || line.0.len() < 2 {
        return empty();
    }
    line.buffer_with_style(BufferStyle::new(distance).line_cap(LineCap::Square))
}

/// Snap, de-duplicate and self-union a polygon.
///
/// # Errors
/// Returns [`GeometryError`] when coordinates are not finite, when the
/// outer ring keeps fewer than four coordinates, or when the repaired
/// polygon has no area.
pub fn repair_polygon(
    id: ElementId,
    polygon: &Polygon<f64>,
    snap_tolerance: f64,
) -> Result<MultiPolygon<f64>, GeometryError> {
    let finite = polygon
        .exterior()
        .coords()
        .chain(polygon.interiors().iter().flat_map(LineString::coords))
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return Err(GeometryError::NonFinite { id });
    }

    let cleaned = polygon
        .map_coords(|c| snap(c, snap_tolerance))
        .remove_repeated_points();
    let ring_len = cleaned.exterior().0.len();
    if ring_len < 4 {
        return Err(GeometryError::TooFewCoordinates {
            id,
            found: ring_len.saturating_sub(1),
        });
    }
    let interiors = cleaned
        .interiors()
        .iter()
        .filter(|ring| ring.0.len() >= 4)
        .cloned()
        .collect();
    let simple = MultiPolygon::new(vec![Polygon::new(cleaned.exterior().clone(), interiors)]);
    let repaired = simple.union(&empty());
    if repaired.unsigned_area() <= 0.0 {
        return Err(GeometryError::Collapsed { id });
    }
    Ok(repaired)
}

/// Build the footprint of one classified element.
///
/// Areas are repaired, lines are buffered by their width and point barriers
/// become disks. Returns `Ok(None)` for geometries with no footprint, such
/// as non-barrier points or lines without a width model.
///
/// # Errors
/// Propagates repair failures for areas.
pub fn element_footprint(
    element: &OsmElement,
    widths: &WidthConfig,
    snap_tolerance: f64,
) -> Result<Option<Footprint>, GeometryError> {
    let geometry = match &element.geometry {
        ElementGeometry::Area(polygon) => repair_polygon(element.id, polygon, snap_tolerance)?,
        ElementGeometry::Line(line) => {
            let Some(width) = line_width(&element.tags, element.space_type(), widths) else {
                debug!("{} has no width model; skipping", element.id);
                return Ok(None);
            };
            let cleaned = line.remove_repeated_points();
            if cleaned.0.len() < 2 {
                return Err(GeometryError::TooFewCoordinates {
                    id: element.id,
                    found: cleaned.0.len(),
                });
            }
            buffer_line(&cleaned, width)
        }
        ElementGeometry::Point(point) => {
            if element.space_type() != Some(SpaceType::Barrier) {
                return Ok(None);
            }
            point.buffer(widths.point_barrier / 2.0)
        }
    };
    if geometry.unsigned_area() <= 0.0 {
        return Err(GeometryError::Collapsed { id: element.id });
    }
    Ok(Some(Footprint {
        element: GeometryElement::from_element(element, geometry),
        shape: element.shape(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rstest::{fixture, rstest};
    use streetscape_core::test_support::{line_way, tagged_node};

    #[fixture]
    fn widths() -> WidthConfig {
        WidthConfig::default()
    }

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().copied().collect()
    }

    #[rstest]
    #[case("3.5", Some(3.5))]
    #[case("3,5 m", Some(3.5))]
    #[case("4m", Some(4.0))]
    #[case("0", None)]
    #[case("wide", None)]
    fn widths_parse_leading_number(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_width(raw), expected);
    }

    #[rstest]
    #[case(&[("highway", "service")], 4.5)]
    #[case(&[("highway", "service"), ("oneway", "yes")], 3.0)]
    #[case(&[("highway", "service"), ("lanes", "4")], 9.0)]
    #[case(&[("highway", "residential")], 4.5 + 6.5)]
    #[case(&[("highway", "service"), ("cycleway:both", "lane")], 4.5 + 3.2)]
    #[case(&[("highway", "cycleway"), ("cycleway", "lane")], 2.0)]
    #[case(&[("highway", "unknown_kind")], 4.8)]
    #[case(&[("highway", "primary"), ("width", "12")], 12.0)]
    #[case(&[("highway", "primary"), ("width", "12"), ("width:carriageway", "7")], 7.0)]
    fn highway_widths_follow_tags_and_tables(
        widths: WidthConfig,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: f64,
    ) {
        let width = highway_width(&tags(pairs), &widths);
        assert!((width - expected).abs() < 1e-9, "{width} != {expected}");
    }

    #[rstest]
    fn rail_widths_add_track_bed(widths: WidthConfig) {
        let tram = line_width(&tags(&[("railway", "tram")]), Some(SpaceType::Rail), &widths);
        assert_eq!(tram, Some(1.435 + 0.5));
    }

    #[rstest]
    fn fence_strip_has_configured_width(widths: WidthConfig) {
        let fence = line_way(1, &[(0.0, 0.0), (100.0, 0.0)], &[("barrier", "fence")]);
        let footprint = element_footprint(&fence, &widths, 0.001).unwrap().unwrap();
        let area = footprint.element.geometry.unsigned_area();
        assert!((area - 50.0).abs() < 1e-6, "flat caps keep length: {area}");
    }

    #[rstest]
    fn plain_points_have_no_footprint(widths: WidthConfig) {
        let node = tagged_node(1, 0.0, 0.0, &[("leisure", "playground")]);
        assert_eq!(element_footprint(&node, &widths, 0.001), Ok(None));
    }

    #[rstest]
    fn point_barriers_become_disks(widths: WidthConfig) {
        let mut node = tagged_node(1, 0.0, 0.0, &[("barrier", "bollard")]);
        node.set_space_type(SpaceType::Barrier);
        let footprint = element_footprint(&node, &widths, 0.001).unwrap().unwrap();
        let area = footprint.element.geometry.unsigned_area();
        let expected = std::f64::consts::PI * 0.25 * 0.25;
        assert!((area - expected).abs() < expected * 0.05);
    }

    #[test]
    fn bow_tie_is_split_into_two_triangles() {
        let bow_tie = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let repaired = repair_polygon(ElementId::way(1), &bow_tie, 0.001).unwrap();
        assert!((repaired.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn near_duplicate_vertices_collapse() {
        let sliver = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0001, y: 0.0),
            (x: 0.0001, y: 0.0002),
            (x: 0.0, y: 0.0),
        ];
        let result = repair_polygon(ElementId::way(9), &sliver, 0.001);
        assert!(matches!(
            result,
            Err(GeometryError::TooFewCoordinates { .. } | GeometryError::Collapsed { .. })
        ));
    }

    #[test]
    fn non_finite_polygons_are_rejected() {
        let broken = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        assert_eq!(
            repair_polygon(ElementId::way(2), &broken, 0.001),
            Err(GeometryError::NonFinite { id: ElementId::way(2) })
        );
    }
}
