//! File adapters for the streetscape public-space mapper.
//!
//! Responsibilities:
//! - Load OpenStreetMap PBF extracts into [`streetscape_core::OsmElement`]s.
//! - Move elements between WGS84 and the working coordinate reference.
//! - Write the published feature collection as GeoJSON.
//!
//! Boundaries:
//! - Do not encode classification rules (they live in `streetscape-engine`).
//! - Keep all filesystem access behind `streetscape-fs`.

#![forbid(unsafe_code)]

pub mod geojson;
pub mod ingest;
pub mod project;

pub use geojson::{GeoJsonError, write_geojson, write_geojson_file};
pub use ingest::{OsmIngestError, OsmIngestSummary, OsmLoadReport, load_osm_elements};
pub use project::project_elements;
