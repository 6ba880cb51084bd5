//! Core domain types for the streetscape public-space mapper.
//!
//! The crate holds the vocabulary shared by every stage of the pipeline:
//! OpenStreetMap elements and their tags, the closed space-type and access
//! enumerations, the bounding box of a run, mapping configuration and the
//! projection between geographic and working coordinates. Constructors
//! return `Result` so that invalid input surfaces before any geometry work
//! starts.

#![forbid(unsafe_code)]

pub mod bbox;
pub mod config;
pub mod element;
pub mod projection;
pub mod region;
pub mod space;
pub mod tags;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod warning;

pub use bbox::{BoundingBox, BoundingBoxError};
pub use config::{ConfigurationError, EnclosureConfig, LaneWidths, MappingConfig, WidthConfig};
pub use element::{
    ElementGeometry, ElementId, ElementKind, GeometryElement, GeometrySource, OsmElement,
    ShapeKind,
};
pub use projection::{
    LambertAzimuthalEqualArea, PlanarIdentity, Projection, ETRS89_LAEA_EPSG, WGS84_EPSG,
    projection_for_epsg,
};
pub use region::{ClassifiedRegion, SpaceFeature, SpaceFeatureCollection};
pub use space::{Access, AccessSource, SpaceType};
pub use tags::Tags;
pub use warning::{GeometryError, RunWarning};
