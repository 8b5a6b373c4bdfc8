//! Estimate command implementation for the AADT CLI.

use std::io::Write;
use std::time::Duration;

use aadt_core::{
    DEFAULT_SEARCH_RADIUS_MILES, EstimateResponse, Estimator, FeatureQuery, FeatureSource,
    QueryCoordinate,
};
use aadt_data::{HttpFeatureSource, HttpFeatureSourceConfig};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::files::{FileFeatureSource, file_is_file};
use crate::{
    ARG_LATITUDE, ARG_LINES_FILE, ARG_LONGITUDE, ARG_POINTS_FILE, ARG_RADIUS_MILES,
    ARG_STATION_URL, ARG_TIMEOUT_SECS, ARG_VOLUME_MAP_URL, CliError, ENV_LATITUDE, ENV_LINES_FILE,
    ENV_LONGITUDE, ENV_POINTS_FILE, ENV_STATION_URL, ENV_VOLUME_MAP_URL,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI arguments for the `estimate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Estimate annual average daily traffic at a coordinate by \
                 querying a count-station layer and a road-segment volume \
                 layer, then selecting the nearest, freshest reading. \
                 Features come from two ArcGIS feature services or, for \
                 offline runs, from two saved JSON query responses.",
    about = "Estimate traffic volume near a coordinate"
)]
#[ortho_config(prefix = "AADT")]
pub(crate) struct EstimateArgs {
    /// Latitude of the query point in decimal degrees.
    #[arg(long = ARG_LATITUDE, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the query point in decimal degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "deg", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Search radius in statute miles (default 0.5).
    #[arg(long = ARG_RADIUS_MILES, value_name = "miles")]
    #[serde(default)]
    pub(crate) radius_miles: Option<f64>,
    /// Feature-layer URL serving traffic count stations.
    #[arg(long = ARG_STATION_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) station_url: Option<String>,
    /// Feature-layer URL serving road-segment volumes.
    #[arg(long = ARG_VOLUME_MAP_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) volume_map_url: Option<String>,
    /// Saved station query response; overrides the station URL.
    #[arg(long = ARG_POINTS_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) points_file: Option<Utf8PathBuf>,
    /// Saved road-segment query response; overrides the volume-map URL.
    #[arg(long = ARG_LINES_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) lines_file: Option<Utf8PathBuf>,
    /// HTTP request timeout in seconds (default 30).
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl EstimateArgs {
    pub(crate) fn into_config(self) -> Result<EstimateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EstimateConfig::try_from(merged)
    }
}

/// Where features are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceConfig {
    /// Two ArcGIS feature layers.
    Http {
        station_url: String,
        volume_map_url: String,
        timeout: Duration,
    },
    /// Two saved query responses on disk.
    Files {
        points: Utf8PathBuf,
        lines: Utf8PathBuf,
    },
}

/// Resolved `estimate` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EstimateConfig {
    /// Validated query point and radius.
    pub(crate) query: FeatureQuery,
    /// Feature source selection.
    pub(crate) source: SourceConfig,
}

impl EstimateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.source {
            SourceConfig::Files { points, lines } => {
                require_existing(points, ARG_POINTS_FILE)?;
                require_existing(lines, ARG_LINES_FILE)
            }
            SourceConfig::Http { .. } => Ok(()),
        }
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
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

impl TryFrom<EstimateArgs> for EstimateConfig {
    type Error = CliError;

    fn try_from(args: EstimateArgs) -> Result<Self, Self::Error> {
        let latitude = args.latitude.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_LATITUDE,
        })?;
        let longitude = args.longitude.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_LONGITUDE,
        })?;
        let coordinate = QueryCoordinate::new(latitude, longitude)?;
        let radius_miles = args.radius_miles.unwrap_or(DEFAULT_SEARCH_RADIUS_MILES);
        let query = FeatureQuery::new(coordinate, radius_miles)?;

        let source = match (args.points_file, args.lines_file) {
            (None, None) => SourceConfig::Http {
                station_url: args.station_url.ok_or(CliError::MissingArgument {
                    field: ARG_STATION_URL,
                    env: ENV_STATION_URL,
                })?,
                volume_map_url: args.volume_map_url.ok_or(CliError::MissingArgument {
                    field: ARG_VOLUME_MAP_URL,
                    env: ENV_VOLUME_MAP_URL,
                })?,
                timeout: timeout_from_secs(args.timeout_secs)?,
            },
            (Some(points), Some(lines)) => SourceConfig::Files { points, lines },
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LINES_FILE,
                    env: ENV_LINES_FILE,
                });
            }
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_POINTS_FILE,
                    env: ENV_POINTS_FILE,
                });
            }
        };

        Ok(Self { query, source })
    }
}

fn timeout_from_secs(timeout_secs: Option<u64>) -> Result<Duration, CliError> {
    match timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => Err(CliError::InvalidTimeout {
            field: ARG_TIMEOUT_SECS,
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Builds a feature source for the current estimate invocation.
pub(crate) trait EstimateSourceBuilder {
    fn build(&self, config: &EstimateConfig) -> Result<Box<dyn FeatureSource>, CliError>;
}

pub(crate) struct DefaultEstimateSourceBuilder;

impl EstimateSourceBuilder for DefaultEstimateSourceBuilder {
    fn build(&self, config: &EstimateConfig) -> Result<Box<dyn FeatureSource>, CliError> {
        match &config.source {
            SourceConfig::Http {
                station_url,
                volume_map_url,
                timeout,
            } => {
                let source = HttpFeatureSource::with_config(
                    HttpFeatureSourceConfig::new(station_url.as_str(), volume_map_url.as_str())
                        .with_timeout(*timeout),
                )?;
                Ok(Box::new(source))
            }
            SourceConfig::Files { points, lines } => Ok(Box::new(FileFeatureSource::new(
                points.clone(),
                lines.clone(),
            ))),
        }
    }
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_estimate_with(args, &DefaultEstimateSourceBuilder, &mut stdout)
}

pub(crate) fn run_estimate_with(
    args: EstimateArgs,
    builder: &dyn EstimateSourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_estimate(args, builder)?;
    write_estimate_response(writer, &response)
}

fn execute_estimate(
    args: EstimateArgs,
    builder: &dyn EstimateSourceBuilder,
) -> Result<EstimateResponse, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    debug!("resolved estimate configuration: {config:?}");
    let estimator = Estimator::new(builder.build(&config)?);
    let response = estimator.estimate(&config.query)?;
    info!(
        "estimate for {},{} considered {} candidates",
        config.query.coordinate.latitude(),
        config.query.coordinate.longitude(),
        response.candidate_count()
    );
    Ok(response)
}

fn write_estimate_response(
    writer: &mut dyn Write,
    response: &EstimateResponse,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(response).map_err(CliError::SerializeEstimate)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteEstimate)?;
    writer.write_all(b"\n").map_err(CliError::WriteEstimate)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<EstimateConfig, CliError> {
    let merged = EstimateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    EstimateConfig::try_from(merged)
}
