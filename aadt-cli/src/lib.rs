//! Command-line interface for estimating traffic volume near a coordinate.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod estimate;
mod files;

pub use error::CliError;
pub use files::FileFeatureSource;

use estimate::{EstimateArgs, run_estimate};

const ARG_LATITUDE: &str = "lat";
const ARG_LONGITUDE: &str = "lon";
const ARG_RADIUS_MILES: &str = "radius-miles";
const ARG_STATION_URL: &str = "station-url";
const ARG_VOLUME_MAP_URL: &str = "volume-map-url";
const ARG_POINTS_FILE: &str = "points-file";
const ARG_LINES_FILE: &str = "lines-file";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ENV_LATITUDE: &str = "AADT_CMDS_ESTIMATE_LATITUDE";
const ENV_LONGITUDE: &str = "AADT_CMDS_ESTIMATE_LONGITUDE";
const ENV_STATION_URL: &str = "AADT_CMDS_ESTIMATE_STATION_URL";
const ENV_VOLUME_MAP_URL: &str = "AADT_CMDS_ESTIMATE_VOLUME_MAP_URL";
const ENV_POINTS_FILE: &str = "AADT_CMDS_ESTIMATE_POINTS_FILE";
const ENV_LINES_FILE: &str = "AADT_CMDS_ESTIMATE_LINES_FILE";

/// Run the AADT CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration layering,
/// feature retrieval, or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Estimate(args) => run_estimate(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "aadt",
    about = "Estimate annual average daily traffic near a coordinate",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Select the most representative traffic count near a coordinate.
    Estimate(EstimateArgs),
}

#[cfg(test)]
mod tests;
