use thiserror::Error;

use crate::Source;

/// Errors from [`crate::source::FeatureSource::fetch_features`].
///
/// Every variant names the upstream layer that failed so callers can tell
/// which of the two concurrent queries went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureSourceError {
    /// The request did not complete within the configured timeout.
    #[error("{layer} query to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Layer being queried.
        layer: Source,
        /// Request URL.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("{layer} query to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Layer being queried.
        layer: Source,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("{layer} query to {url} failed: {message}")]
    Network {
        /// Layer being queried.
        layer: Source,
        /// Request URL.
        url: String,
        /// Error description.
        message: String,
    },
    /// The service returned an error payload instead of features.
    #[error("{layer} service reported error {code}: {message}")]
    Service {
        /// Layer being queried.
        layer: Source,
        /// Service error code.
        code: i64,
        /// Service error message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse {layer} features: {message}")]
    Parse {
        /// Layer being queried.
        layer: Source,
        /// Decoder error description.
        message: String,
    },
    /// Reading features from local storage failed.
    #[error("failed to read {layer} features from {path}: {message}")]
    Io {
        /// Layer being read.
        layer: Source,
        /// Path that could not be read.
        path: String,
        /// I/O error description.
        message: String,
    },
}

impl FeatureSourceError {
    /// Layer the error relates to.
    #[must_use]
    pub const fn layer(&self) -> Source {
        match self {
            Self::Timeout { layer, .. }
            | Self::Http { layer, .. }
            | Self::Network { layer, .. }
            | Self::Service { layer, .. }
            | Self::Parse { layer, .. }
            | Self::Io { layer, .. } => *layer,
        }
    }
}
