//! Error types emitted by the AADT CLI.
//!
//! Keep this error type reasonably small, as CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use aadt_core::{FeatureSourceError, QueryError};
use aadt_data::SourceBuildError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the AADT CLI.
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
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The query coordinate or radius is out of range.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    /// The HTTP timeout was zero, which would fail every request.
    #[error("--{field} must be at least 1 second")]
    InvalidTimeout {
        /// Long flag name of the option.
        field: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Long flag name of the option.
        field: &'static str,
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Constructing the HTTP feature source failed.
    #[error("failed to build feature source: {0}")]
    BuildFeatureSource(#[from] SourceBuildError),
    /// Fetching features from the configured source failed.
    #[error(transparent)]
    FetchFeatures(#[from] FeatureSourceError),
    /// Serializing the estimate failed.
    #[error("failed to serialize estimate: {0}")]
    SerializeEstimate(#[source] serde_json::Error),
    /// Writing the estimate failed.
    #[error("failed to write estimate: {0}")]
    WriteEstimate(#[source] std::io::Error),
}
