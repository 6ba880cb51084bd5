//! Map command implementation for the streetscape CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use streetscape_core::{BoundingBox, MappingConfig, projection_for_epsg};
use streetscape_data::{load_osm_elements, project_elements, write_geojson_file};
use streetscape_engine::map_public_space;

use crate::{
    ARG_BBOX, ARG_MAPPING_CONFIG, ARG_OSM_PBF, ARG_OUTPUT, CliError, ENV_BBOX, ENV_OSM_PBF,
};

const DEFAULT_OUTPUT: &str = "public_space.geojson";

/// CLI arguments for the `map` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Classify the ground-level space inside a bounding box \
                 into disjoint regions with one space type and one access \
                 level each, and write them as GeoJSON. Paths and the box \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Map public space inside a bounding box"
)]
#[ortho_config(prefix = "STREETSCAPE")]
pub(crate) struct MapArgs {
    /// Path to the OpenStreetMap PBF extract.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Area of interest as `left,bottom,right,top` in WGS84 degrees.
    #[arg(long = ARG_BBOX, value_name = "bbox", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    /// Destination GeoJSON file (defaults to `public_space.geojson`).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// JSON file overriding any subset of the mapping configuration.
    #[arg(long = ARG_MAPPING_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) mapping_config: Option<Utf8PathBuf>,
}

impl MapArgs {
    pub(crate) fn into_config(self) -> Result<MapConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MapConfig::try_from(merged)
    }
}

/// Resolved `map` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MapConfig {
    /// OpenStreetMap PBF extract.
    pub(crate) osm_pbf: Utf8PathBuf,
    /// Area of interest in WGS84 degrees.
    pub(crate) bbox: BoundingBox,
    /// Destination GeoJSON file.
    pub(crate) output: Utf8PathBuf,
    /// Optional mapping configuration overrides.
    pub(crate) mapping_config: Option<Utf8PathBuf>,
}

impl MapConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.osm_pbf, ARG_OSM_PBF)?;
        if let Some(path) = &self.mapping_config {
            Self::require_existing(path, ARG_MAPPING_CONFIG)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match streetscape_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<MapArgs> for MapConfig {
    type Error = CliError;

    fn try_from(args: MapArgs) -> Result<Self, Self::Error> {
        let osm_pbf = args.osm_pbf.ok_or(CliError::MissingArgument {
            field: ARG_OSM_PBF,
            env: ENV_OSM_PBF,
        })?;
        let text = args.bbox.ok_or(CliError::MissingArgument {
            field: ARG_BBOX,
            env: ENV_BBOX,
        })?;
        let bbox = text
            .parse::<BoundingBox>()
            .map_err(|source| CliError::InvalidBoundingBox {
                value: text.clone(),
                source,
            })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));
        Ok(Self {
            osm_pbf,
            bbox,
            output,
            mapping_config: args.mapping_config,
        })
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MapSummary {
    /// Features written.
    pub(crate) features: usize,
    /// Warnings raised by the pipeline.
    pub(crate) warnings: usize,
}

pub(crate) fn run_map(args: MapArgs) -> Result<MapSummary, CliError> {
    let config = resolve_map_config(args)?;
    execute_map(&config)
}

pub(crate) fn resolve_map_config(args: MapArgs) -> Result<MapConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn load_mapping_config(path: Option<&Utf8Path>) -> Result<MappingConfig, CliError> {
    let Some(path) = path else {
        return Ok(MappingConfig::default());
    };
    let text =
        streetscape_fs::read_to_string(path).map_err(|source| CliError::ReadMappingConfig {
            path: path.to_path_buf(),
            source,
        })?;
    let config: MappingConfig =
        serde_json::from_str(&text).map_err(|source| CliError::ParseMappingConfig {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn execute_map(config: &MapConfig) -> Result<MapSummary, CliError> {
    let mapping = load_mapping_config(config.mapping_config.as_deref())?;
    let projection = projection_for_epsg(mapping.working_epsg)?;
    let working_bbox = config
        .bbox
        .project(projection.as_ref())
        .map_err(CliError::ProjectBoundingBox)?;

    let report = load_osm_elements(&config.osm_pbf, &config.bbox)?;
    let elements = project_elements(report.elements, projection.as_ref());
    let outcome = map_public_space(elements, &working_bbox, &mapping, projection.as_ref())?;
    for warning in &outcome.warnings {
        warn!("{warning}");
    }

    write_geojson_file(&config.output, &outcome.features)?;
    info!(
        "Wrote {} feature(s) to {} with {} warning(s)",
        outcome.features.len(),
        config.output,
        outcome.warnings.len()
    );
    Ok(MapSummary {
        features: outcome.features.len(),
        warnings: outcome.warnings.len(),
    })
}
