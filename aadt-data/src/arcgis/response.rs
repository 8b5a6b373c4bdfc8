//! ArcGIS REST `query` response types.
//!
//! A successful query returns `{"features": [...]}` with each feature holding
//! an `attributes` map and an optional `geometry`. Failures are reported with
//! HTTP 200 and an `{"error": {...}}` body, so the payload must be inspected
//! before the features are trusted.
//!
//! See: <https://developers.arcgis.com/rest/services-reference/enterprise/query-feature-service-layer/>

use aadt_core::{FeatureSourceError, RawFeature, Source};
use serde::Deserialize;

/// Body of a feature-layer `query` response.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    /// Matching features; absent when the service reports an error.
    #[serde(default)]
    pub features: Vec<RawFeature>,

    /// Error payload returned in place of features.
    pub error: Option<ServiceError>,
}

/// Error object embedded in a failed query response.
#[derive(Debug, Deserialize)]
pub struct ServiceError {
    /// Service error code, usually mirroring an HTTP status.
    #[serde(default)]
    pub code: i64,

    /// Short error description.
    #[serde(default)]
    pub message: String,

    /// Additional diagnostic lines.
    #[serde(default)]
    pub details: Vec<String>,
}

impl ServiceError {
    fn describe(&self) -> String {
        if self.details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, self.details.join("; "))
        }
    }
}

impl QueryResponse {
    /// Convert the response into features, surfacing embedded errors.
    ///
    /// # Errors
    /// Returns [`FeatureSourceError::Service`] when the body carries an
    /// `error` object.
    pub fn into_features(self, layer: Source) -> Result<Vec<RawFeature>, FeatureSourceError> {
        match self.error {
            Some(error) => Err(FeatureSourceError::Service {
                layer,
                code: error.code,
                message: error.describe(),
            }),
            None => Ok(self.features),
        }
    }
}

/// Decode a raw `query` response body for `layer`.
///
/// # Errors
/// Returns [`FeatureSourceError::Parse`] when the body is not valid JSON of
/// the expected shape and [`FeatureSourceError::Service`] when the service
/// reported an error.
///
/// # Examples
///
/// ```
/// use aadt_core::Source;
/// use aadt_data::parse_layer_response;
///
/// let body = r#"{"features": [{"attributes": {"AADT": 9100}, "geometry": {"x": -80.0, "y": 35.0}}]}"#;
/// let features = parse_layer_response(Source::Station, body)?;
/// assert_eq!(features.len(), 1);
/// # Ok::<(), aadt_core::FeatureSourceError>(())
/// ```
pub fn parse_layer_response(
    layer: Source,
    body: &str,
) -> Result<Vec<RawFeature>, FeatureSourceError> {
    serde_json::from_str::<QueryResponse>(body)
        .map_err(|err| FeatureSourceError::Parse {
            layer,
            message: err.to_string(),
        })?
        .into_features(layer)
}
