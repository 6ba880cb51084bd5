//! Command-line interface for the streetscape public-space mapper.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;

mod error;
mod map;

pub use error::CliError;

use map::MapArgs;

pub(crate) const ARG_OSM_PBF: &str = "osm-pbf";
pub(crate) const ARG_BBOX: &str = "bbox";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_MAPPING_CONFIG: &str = "mapping-config";
pub(crate) const ENV_OSM_PBF: &str = "STREETSCAPE_CMDS_MAP_OSM_PBF";
pub(crate) const ENV_BBOX: &str = "STREETSCAPE_CMDS_MAP_BBOX";

/// Run the streetscape CLI with the current process arguments and environment.
///
/// # Errors
/// Returns the first [`CliError`] raised while parsing arguments, layering
/// configuration, reading input, mapping or writing output.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Map(args) => map::run_map(args).map(|_| ()),
    }
}

/// Install `env_logger`; `RUST_LOG` still takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let installed = env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .try_init();
    if installed.is_err() {
        log::debug!("logger already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "streetscape",
    about = "Classify ground-level public space from OpenStreetMap extracts",
    version
)]
struct Cli {
    /// Log every pipeline stage.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Map the public space inside a bounding box to GeoJSON.
    Map(MapArgs),
}

#[cfg(test)]
mod tests;
