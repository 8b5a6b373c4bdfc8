//! Focused unit tests covering estimate CLI configuration and output.

use super::helpers::{EMPTY_EXPORT, SEGMENT_EXPORT, STATION_EXPORT, Workspace};
use super::*;
use crate::estimate::{
    DefaultEstimateSourceBuilder, EstimateArgs, EstimateConfig, EstimateSourceBuilder,
    SourceConfig, config_from_layers_for_test, run_estimate_with,
};
use aadt_core::test_support::StaticFeatureSource;
use aadt_core::{
    DEFAULT_SEARCH_RADIUS_MILES, FeatureSource, FeatureSourceError, QueryError, RawFeature, Source,
};
use camino::Utf8PathBuf;
use rstest::rstest;
use std::time::Duration;

fn located_args() -> EstimateArgs {
    EstimateArgs {
        latitude: Some(35.0),
        longitude: Some(-80.0),
        station_url: Some("https://gis.example.com/FeatureServer/0".to_owned()),
        volume_map_url: Some("https://gis.example.com/FeatureServer/1".to_owned()),
        ..EstimateArgs::default()
    }
}

struct StaticSourceBuilder {
    points: Vec<RawFeature>,
    error: Option<FeatureSourceError>,
}

impl EstimateSourceBuilder for StaticSourceBuilder {
    fn build(&self, _config: &EstimateConfig) -> Result<Box<dyn FeatureSource>, CliError> {
        let source = match &self.error {
            Some(error) => StaticFeatureSource::with_error(error.clone()),
            None => StaticFeatureSource::with_features(self.points.clone(), Vec::new()),
        };
        Ok(Box::new(source))
    }
}

#[rstest]
#[case(None, Some(-80.0), ARG_LATITUDE, ENV_LATITUDE)]
#[case(Some(35.0), None, ARG_LONGITUDE, ENV_LONGITUDE)]
fn converting_without_coordinates_errors(
    #[case] latitude: Option<f64>,
    #[case] longitude: Option<f64>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = EstimateArgs {
        latitude,
        longitude,
        ..located_args()
    };
    let err = EstimateConfig::try_from(args).expect_err("missing coordinate should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::latitude_out_of_range(Some(91.0), None, QueryError::InvalidLatitude { latitude: 91.0 })]
#[case::zero_radius(Some(35.0), Some(0.0), QueryError::InvalidRadius { radius_miles: 0.0 })]
fn converting_invalid_query_errors(
    #[case] latitude: Option<f64>,
    #[case] radius_miles: Option<f64>,
    #[case] expected: QueryError,
) {
    let args = EstimateArgs {
        latitude,
        radius_miles,
        ..located_args()
    };
    let err = EstimateConfig::try_from(args).expect_err("invalid query should error");
    match err {
        CliError::InvalidQuery(source) => assert_eq!(source, expected),
        other => panic!("expected InvalidQuery, found {other:?}"),
    }
}

#[rstest]
fn http_config_uses_default_radius_and_timeout() {
    let config = EstimateConfig::try_from(located_args()).expect("config should build");

    assert_eq!(config.query.radius_miles, DEFAULT_SEARCH_RADIUS_MILES);
    assert_eq!(
        config.source,
        SourceConfig::Http {
            station_url: "https://gis.example.com/FeatureServer/0".to_owned(),
            volume_map_url: "https://gis.example.com/FeatureServer/1".to_owned(),
            timeout: Duration::from_secs(30),
        }
    );
}

#[rstest]
fn zero_timeout_is_rejected() {
    let args = EstimateArgs {
        timeout_secs: Some(0),
        ..located_args()
    };
    let err = EstimateConfig::try_from(args).expect_err("zero timeout should error");
    match err {
        CliError::InvalidTimeout { field } => assert_eq!(field, ARG_TIMEOUT_SECS),
        other => panic!("expected InvalidTimeout, found {other:?}"),
    }
}

#[rstest]
fn explicit_timeout_is_kept() {
    let args = EstimateArgs {
        timeout_secs: Some(5),
        ..located_args()
    };
    let config = EstimateConfig::try_from(args).expect("config should build");
    assert!(matches!(
        config.source,
        SourceConfig::Http { timeout, .. } if timeout == Duration::from_secs(5)
    ));
}

#[rstest]
#[case(None, Some("https://gis.example.com/1"), ARG_STATION_URL)]
#[case(Some("https://gis.example.com/0"), None, ARG_VOLUME_MAP_URL)]
fn http_config_requires_both_urls(
    #[case] station_url: Option<&str>,
    #[case] volume_map_url: Option<&str>,
    #[case] field: &'static str,
) {
    let args = EstimateArgs {
        station_url: station_url.map(str::to_owned),
        volume_map_url: volume_map_url.map(str::to_owned),
        ..located_args()
    };
    let err = EstimateConfig::try_from(args).expect_err("missing URL should error");
    match err {
        CliError::MissingArgument { field: missing, .. } => assert_eq!(missing, field),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn files_take_precedence_over_urls() {
    let args = EstimateArgs {
        points_file: Some(Utf8PathBuf::from("points.json")),
        lines_file: Some(Utf8PathBuf::from("lines.json")),
        ..located_args()
    };
    let config = EstimateConfig::try_from(args).expect("config should build");
    assert_eq!(
        config.source,
        SourceConfig::Files {
            points: Utf8PathBuf::from("points.json"),
            lines: Utf8PathBuf::from("lines.json"),
        }
    );
}

#[rstest]
fn lone_points_file_requires_lines_file() {
    let args = EstimateArgs {
        points_file: Some(Utf8PathBuf::from("points.json")),
        ..located_args()
    };
    let err = EstimateConfig::try_from(args).expect_err("lines file should be required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_LINES_FILE);
            assert_eq!(env, ENV_LINES_FILE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_and_directory_inputs() {
    let workspace = Workspace::new();
    let points = workspace.write("points.json", EMPTY_EXPORT);
    let missing = workspace.path("absent.json");

    let config = EstimateConfig::try_from(EstimateArgs {
        points_file: Some(points.clone()),
        lines_file: Some(missing),
        ..located_args()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("missing lines file") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_LINES_FILE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }

    let config = EstimateConfig::try_from(EstimateArgs {
        points_file: Some(workspace.root().to_path_buf()),
        lines_file: Some(points),
        ..located_args()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("directory points file") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_POINTS_FILE),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn default_builder_reads_files() {
    let workspace = Workspace::new();
    let config = EstimateConfig::try_from(EstimateArgs {
        points_file: Some(workspace.write("points.json", STATION_EXPORT)),
        lines_file: Some(workspace.write("lines.json", SEGMENT_EXPORT)),
        ..located_args()
    })
    .expect("config should build");

    let source = DefaultEstimateSourceBuilder
        .build(&config)
        .expect("file source should build");
    let collections = source
        .fetch_features(&config.query)
        .expect("files should load");

    assert_eq!(collections.points.len(), 1);
    assert_eq!(collections.lines.len(), 1);
}

#[rstest]
fn default_builder_rejects_invalid_urls() {
    let config = EstimateConfig::try_from(EstimateArgs {
        station_url: Some("not a url".to_owned()),
        ..located_args()
    })
    .expect("config should build");

    let err = DefaultEstimateSourceBuilder
        .build(&config)
        .map(|_| ())
        .expect_err("invalid URL should fail");
    assert!(
        matches!(err, CliError::BuildFeatureSource(_)),
        "expected BuildFeatureSource, found {err:?}"
    );
}

#[rstest]
fn run_estimate_writes_pretty_json() {
    let builder = StaticSourceBuilder {
        points: vec![
            RawFeature::new()
                .with_point(-80.0, 35.0)
                .with_attribute("AADT", 4_400.0),
        ],
        error: None,
    };
    let mut stdout = Vec::new();

    run_estimate_with(located_args(), &builder, &mut stdout).expect("estimate should succeed");

    let text = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(text.ends_with('\n'));
    let json: serde_json::Value = serde_json::from_str(&text).expect("output should be JSON");
    assert_eq!(json["status"], "found");
    assert_eq!(json["aadt"], 4_400);
    assert!(json["aadt"].is_u64(), "whole volumes print as integers");
    assert_eq!(json["distance_meters"], 0);
}

#[rstest]
fn run_estimate_propagates_fetch_errors() {
    let error = FeatureSourceError::Timeout {
        layer: Source::VolumeMap,
        url: "https://gis.example.com/FeatureServer/1/query".to_owned(),
        timeout_secs: 30,
    };
    let builder = StaticSourceBuilder {
        points: Vec::new(),
        error: Some(error.clone()),
    };
    let mut stdout = Vec::new();

    let err = run_estimate_with(located_args(), &builder, &mut stdout)
        .expect_err("fetch failure should surface");

    match err {
        CliError::FetchFeatures(source) => assert_eq!(source, error),
        other => panic!("expected FetchFeatures, found {other:?}"),
    }
    assert!(stdout.is_empty());
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "latitude": "north" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "station_url": "https://from-file.example.com/0",
            "volume_map_url": "https://from-file.example.com/1",
            "radius_miles": 2.0,
            "timeout_secs": 5,
        }),
        None,
    );
    composer.push_environment(json!({
        "latitude": 40.0,
        "longitude": -75.0,
        "station_url": "https://from-env.example.com/0",
    }));
    composer.push_cli(json!({
        "latitude": 35.0,
        "radius_miles": 1.0,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.query.coordinate.latitude(), 35.0);
    assert_eq!(config.query.coordinate.longitude(), -75.0);
    assert_eq!(config.query.radius_miles, 1.0);
    assert_eq!(
        config.source,
        SourceConfig::Http {
            station_url: "https://from-env.example.com/0".to_owned(),
            volume_map_url: "https://from-file.example.com/1".to_owned(),
            timeout: Duration::from_secs(5),
        }
    );
}
