//! OpenStreetMap elements and synthetic geometries flowing through the pipeline.

use geo::{BoundingRect, Coord, LineString, MapCoords, MultiPolygon, Point, Polygon, Rect};

use crate::space::{Access, AccessSource, SpaceType};
use crate::tags::Tags;

/// Kind of OpenStreetMap primitive an element was built from.
///
/// Nodes order before ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// A single tagged node.
    Node,
    /// A way, open or closed.
    Way,
}

impl ElementKind {
    /// Lowercase name used in identifiers such as `way/42`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
        }
    }
}

/// Stable identity of an OpenStreetMap element.
///
/// Ids are totally ordered by kind and then by raw id, which makes every
/// id-based tie-break reproducible.
///
/// # Examples
/// ```
/// use streetscape_core::ElementId;
///
/// let id = ElementId::way(42);
/// assert_eq!(id.to_string(), "way/42");
/// assert!(ElementId::node(99) < id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    /// Primitive kind.
    pub kind: ElementKind,
    /// OpenStreetMap id within that kind.
    pub raw: i64,
}

impl ElementId {
    /// Identifier of a node.
    #[must_use]
    pub const fn node(raw: i64) -> Self {
        Self {
            kind: ElementKind::Node,
            raw,
        }
    }

    /// Identifier of a way.
    #[must_use]
    pub const fn way(raw: i64) -> Self {
        Self {
            kind: ElementKind::Way,
            raw,
        }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.raw)
    }
}

/// Broad shape of a geometry, used by rules that only apply to some shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// A single coordinate.
    Point,
    /// An open or un-filled line.
    Line,
    /// A filled polygon.
    Area,
}

/// Geometry of an element.
///
/// Coordinates are WGS84 (`x = longitude`, `y = latitude`) straight after
/// ingestion and working-CRS metres once projected.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementGeometry {
    /// Tagged node.
    Point(Point<f64>),
    /// Open way, or a closed way that does not describe an area.
    Line(LineString<f64>),
    /// Closed way describing an area.
    Area(Polygon<f64>),
}

impl ElementGeometry {
    /// Broad shape of the geometry.
    #[must_use]
    pub const fn shape(&self) -> ShapeKind {
        match self {
            Self::Point(_) => ShapeKind::Point,
            Self::Line(_) => ShapeKind::Line,
            Self::Area(_) => ShapeKind::Area,
        }
    }

    /// Axis-aligned envelope, or `None` for an empty line or polygon.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Self::Point(point) => Some(point.bounding_rect()),
            Self::Line(line) => line.bounding_rect(),
            Self::Area(polygon) => polygon.bounding_rect(),
        }
    }

    /// Whether every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        let finite = |c: &Coord<f64>| c.x.is_finite() && c.y.is_finite();
        match self {
            Self::Point(point) => finite(&point.0),
            Self::Line(line) => line.coords().all(finite),
            Self::Area(polygon) => polygon
                .exterior()
                .coords()
                .chain(polygon.interiors().iter().flat_map(LineString::coords))
                .all(finite),
        }
    }

    /// Apply `transform` to every coordinate.
    #[must_use]
    pub fn map_coords(&self, transform: impl Fn(Coord<f64>) -> Coord<f64> + Copy) -> Self {
        match self {
            Self::Point(point) => Self::Point(point.map_coords(transform)),
            Self::Line(line) => Self::Line(line.map_coords(transform)),
            Self::Area(polygon) => Self::Area(polygon.map_coords(transform)),
        }
    }
}

/// An OpenStreetMap feature with its classification state.
///
/// Classification fields are write-once: [`OsmElement::set_space_type`] and
/// [`OsmElement::set_access`] only fill empty fields. Access inference uses
/// [`OsmElement::override_access`] when it must replace a value.
///
/// # Examples
/// ```
/// use geo::Point;
/// use streetscape_core::{
///     Access, AccessSource, ElementGeometry, ElementId, OsmElement, SpaceType, Tags,
/// };
///
/// let mut playground = OsmElement::new(
///     ElementId::node(7),
///     ElementGeometry::Point(Point::new(0.0, 0.0)),
///     Tags::from([("leisure", "playground")]),
/// );
/// assert!(playground.set_space_type(SpaceType::Playground));
/// assert!(!playground.set_space_type(SpaceType::Park));
/// assert_eq!(playground.space_type(), Some(SpaceType::Playground));
///
/// playground.set_access(Access::Public, AccessSource::Tags);
/// playground.override_access(Access::Private, AccessSource::Override);
/// assert_eq!(playground.access(), Some(Access::Private));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OsmElement {
    /// Stable OpenStreetMap identity.
    pub id: ElementId,
    /// Geometry in the current coordinate reference.
    pub geometry: ElementGeometry,
    /// Raw tags.
    pub tags: Tags,
    space_type: Option<SpaceType>,
    access: Option<Access>,
    access_source: Option<AccessSource>,
}

impl OsmElement {
    /// Create an unclassified element.
    #[must_use]
    pub const fn new(id: ElementId, geometry: ElementGeometry, tags: Tags) -> Self {
        Self {
            id,
            geometry,
            tags,
            space_type: None,
            access: None,
            access_source: None,
        }
    }

    /// Assigned space type, if any.
    #[must_use]
    pub const fn space_type(&self) -> Option<SpaceType> {
        self.space_type
    }

    /// Assigned access, if any.
    #[must_use]
    pub const fn access(&self) -> Option<Access> {
        self.access
    }

    /// Where the assigned access came from.
    #[must_use]
    pub const fn access_source(&self) -> Option<AccessSource> {
        self.access_source
    }

    /// Set the space type if none is set yet. Returns whether it was written.
    pub const fn set_space_type(&mut self, space_type: SpaceType) -> bool {
        if self.space_type.is_some() {
            return false;
        }
        self.space_type = Some(space_type);
        true
    }

    /// Set access if none is set yet. Returns whether it was written.
    pub const fn set_access(&mut self, access: Access, source: AccessSource) -> bool {
        if self.access.is_some() {
            return false;
        }
        self.access = Some(access);
        self.access_source = Some(source);
        true
    }

    /// Replace access unconditionally.
    pub const fn override_access(&mut self, access: Access, source: AccessSource) {
        self.access = Some(access);
        self.access_source = Some(source);
    }

    /// Shape of the element's geometry.
    #[must_use]
    pub const fn shape(&self) -> ShapeKind {
        self.geometry.shape()
    }
}

/// Where a [`GeometryElement`] came from.
///
/// OpenStreetMap sources order before synthetic ones, so synthetic
/// geometries lose otherwise exact ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometrySource {
    /// Footprint of an OpenStreetMap element.
    Osm(ElementId),
    /// Geometry derived by the pipeline, numbered in creation order.
    Synthetic(u32),
}

impl GeometrySource {
    /// Originating OpenStreetMap id, if any.
    #[must_use]
    pub const fn origin(self) -> Option<ElementId> {
        match self {
            Self::Osm(id) => Some(id),
            Self::Synthetic(_) => None,
        }
    }
}

/// A polygonal footprint in the working coordinate reference.
///
/// Every candidate the overlap resolver consumes is a `GeometryElement`:
/// cleaned areas, buffered lines and points, and synthetic enclosures.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryElement {
    /// Origin of the footprint.
    pub source: GeometrySource,
    /// Footprint in working coordinates.
    pub geometry: MultiPolygon<f64>,
    /// Assigned space type, if any.
    pub space_type: Option<SpaceType>,
    /// Assigned access, if any.
    pub access: Option<Access>,
    /// Where the assigned access came from.
    pub access_source: Option<AccessSource>,
}

impl GeometryElement {
    /// Footprint of an OpenStreetMap element, carrying its classification.
    #[must_use]
    pub const fn from_element(element: &OsmElement, geometry: MultiPolygon<f64>) -> Self {
        Self {
            source: GeometrySource::Osm(element.id),
            geometry,
            space_type: element.space_type,
            access: element.access,
            access_source: element.access_source,
        }
    }

    /// A synthetic footprint.
    #[must_use]
    pub const fn synthetic(
        index: u32,
        geometry: MultiPolygon<f64>,
        space_type: SpaceType,
        access: Option<Access>,
        access_source: Option<AccessSource>,
    ) -> Self {
        Self {
            source: GeometrySource::Synthetic(index),
            geometry,
            space_type: Some(space_type),
            access,
            access_source,
        }
    }

    /// Originating OpenStreetMap id, `None` for synthetic footprints.
    #[must_use]
    pub const fn origin(&self) -> Option<ElementId> {
        self.source.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, polygon};
    use rstest::rstest;

    #[rstest]
    #[case(ElementId::node(5), ElementId::way(1))]
    #[case(ElementId::way(1), ElementId::way(2))]
    fn ids_order_by_kind_then_raw(#[case] lower: ElementId, #[case] higher: ElementId) {
        assert!(lower < higher);
    }

    #[test]
    fn osm_sources_sort_before_synthetic() {
        assert!(GeometrySource::Osm(ElementId::way(i64::MAX)) < GeometrySource::Synthetic(0));
    }

    #[test]
    fn set_access_is_write_once() {
        let mut element = OsmElement::new(
            ElementId::way(3),
            ElementGeometry::Line(LineString::from(vec![(0.0, 0.0), (1.0, 0.0)])),
            Tags::new(),
        );
        assert!(element.set_access(Access::Restricted, AccessSource::Tags));
        assert!(!element.set_access(Access::Public, AccessSource::SpaceTypeDefault));
        assert_eq!(element.access(), Some(Access::Restricted));
        assert_eq!(element.access_source(), Some(AccessSource::Tags));
    }

    #[test]
    fn map_coords_preserves_shape() {
        let geometry = ElementGeometry::Area(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]);
        let shifted = geometry.map_coords(|c| coord! { x: c.x + 10.0, y: c.y });
        assert_eq!(shifted.shape(), ShapeKind::Area);
        let rect = shifted.bounding_rect().unwrap();
        assert_eq!(rect.min(), coord! { x: 10.0, y: 0.0 });
    }

    #[test]
    fn non_finite_coordinates_are_detected() {
        let geometry = ElementGeometry::Point(Point::new(f64::NAN, 0.0));
        assert!(!geometry.is_finite());
    }
}
