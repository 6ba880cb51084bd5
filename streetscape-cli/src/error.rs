//! Error types emitted by the streetscape CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use streetscape_core::{BoundingBoxError, ConfigurationError};
use streetscape_data::{GeoJsonError, OsmIngestError};
use streetscape_engine::PipelineError;
use thiserror::Error;

/// Errors emitted by the streetscape CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The bounding box text could not be parsed or validated.
    #[error("invalid bounding box {value:?}: {source}")]
    InvalidBoundingBox {
        /// Text supplied for the box.
        value: String,
        /// Parse or validation failure.
        #[source]
        source: BoundingBoxError,
    },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Flag naming the input.
        field: &'static str,
        /// Path supplied for the input.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the input.
        field: &'static str,
        /// Path supplied for the input.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Reading the mapping configuration file failed.
    #[error("failed to read mapping configuration at {path:?}: {source}")]
    ReadMappingConfig {
        /// Configuration file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The mapping configuration file is not valid JSON for the schema.
    #[error("failed to parse mapping configuration JSON at {path:?}: {source}")]
    ParseMappingConfig {
        /// Configuration file.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The mapping configuration is internally inconsistent.
    #[error("invalid mapping configuration: {0}")]
    MappingConfiguration(#[from] ConfigurationError),
    /// Projecting the bounding box into the working reference failed.
    #[error("failed to project the bounding box: {0}")]
    ProjectBoundingBox(#[source] BoundingBoxError),
    /// OSM ingestion failed.
    #[error("failed to ingest OSM data: {0}")]
    OsmIngest(#[from] OsmIngestError),
    /// The mapping pipeline aborted.
    #[error("mapping failed: {0}")]
    Pipeline(#[from] PipelineError),
    /// Writing the GeoJSON output failed.
    #[error(transparent)]
    WriteOutput(#[from] GeoJsonError),
}
