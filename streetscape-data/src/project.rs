//! Moving elements into the working coordinate reference.

use streetscape_core::{OsmElement, Projection};

/// Project every element's geometry forward from WGS84.
///
/// Tags and classification state are kept as they are.
///
/// # Examples
/// ```
/// use geo::Point;
/// use streetscape_core::{
///     ElementGeometry, ElementId, LambertAzimuthalEqualArea, OsmElement, Tags,
/// };
/// use streetscape_data::project_elements;
///
/// let bench = OsmElement::new(
///     ElementId::node(1),
///     ElementGeometry::Point(Point::new(10.0, 52.0)),
///     Tags::from([("amenity", "bench")]),
/// );
/// let projected = project_elements(vec![bench], &LambertAzimuthalEqualArea::etrs89_europe());
/// let ElementGeometry::Point(point) = projected[0].geometry else { unreachable!() };
/// assert!((point.x() - 4_321_000.0).abs() < 1e-6);
/// assert!((point.y() - 3_210_000.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn project_elements(elements: Vec<OsmElement>, projection: &dyn Projection) -> Vec<OsmElement> {
    elements
        .into_iter()
        .map(|mut element| {
            element.geometry = element.geometry.map_coords(|c| projection.forward(c));
            element
        })
        .collect()
}
