//! Facade crate for the streetscape public-space mapper.
//!
//! This crate re-exports the core domain types and the mapping pipeline, and
//! exposes the file adapters behind the `data` feature.

#![forbid(unsafe_code)]

pub use streetscape_core::{
    Access, AccessSource, BoundingBox, BoundingBoxError, ClassifiedRegion, ConfigurationError,
    ElementGeometry, ElementId, ElementKind, GeometryError, LambertAzimuthalEqualArea,
    MappingConfig, OsmElement, PlanarIdentity, Projection, RunWarning, SpaceFeature,
    SpaceFeatureCollection, SpaceType, Tags, projection_for_epsg,
};

pub use streetscape_engine::{
    MappingJob, MappingOutcome, PipelineError, classify, map_many, map_public_space,
};

#[cfg(feature = "data")]
pub use streetscape_data::{
    GeoJsonError, OsmIngestError, OsmLoadReport, load_osm_elements, project_elements,
    write_geojson, write_geojson_file,
};
