//! HTTP-based `FeatureSource` querying two ArcGIS feature layers.
//!
//! The [`FeatureSource`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This source bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.

use std::time::Duration;

use aadt_core::{
    FeatureCollections, FeatureQuery, FeatureSource, FeatureSourceError, RawFeature, Source,
};
use log::{debug, warn};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::response::parse_layer_response;

/// Errors raised while constructing an [`HttpFeatureSource`].
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// A layer URL could not be parsed.
    #[error("invalid {layer} layer URL {url:?}: {source}")]
    InvalidUrl {
        /// Layer the URL belongs to.
        layer: Source,
        /// Rejected URL text.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for feature-service requests.
pub const DEFAULT_USER_AGENT: &str = "aadt-locator/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpFeatureSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFeatureSourceConfig {
    /// Layer URL for point count stations, without the trailing `/query`.
    pub station_url: String,
    /// Layer URL for road-segment volumes, without the trailing `/query`.
    pub volume_map_url: String,
    /// Request timeout applied to connection and whole-request time.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpFeatureSourceConfig {
    /// Create a configuration for the two layer URLs.
    #[must_use]
    pub fn new(station_url: impl Into<String>, volume_map_url: impl Into<String>) -> Self {
        Self {
            station_url: station_url.into(),
            volume_map_url: volume_map_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Feature source backed by two ArcGIS REST feature layers.
///
/// The source owns a Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the stored runtime drives the requests. Inside
/// a multi-threaded runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]) the caller's handle is used with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// A `current_thread` runtime can neither be blocked in place nor host a
/// nested `block_on`, so there the stored runtime drives the requests on a
/// short-lived scoped thread while the caller's thread waits.
///
/// Dropping the source shuts its runtime down in the background, so the
/// source may be dropped from async code.
pub struct HttpFeatureSource {
    client: Client,
    config: HttpFeatureSourceConfig,
    station_endpoint: Url,
    volume_map_endpoint: Url,
    // `None` only while dropping.
    runtime: Option<Runtime>,
}

impl Drop for HttpFeatureSource {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for HttpFeatureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFeatureSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpFeatureSource {
    /// Create a source with default timeout and user agent.
    ///
    /// # Errors
    /// Returns an error if a URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(
        station_url: impl Into<String>,
        volume_map_url: impl Into<String>,
    ) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpFeatureSourceConfig::new(station_url, volume_map_url))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if a URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpFeatureSourceConfig) -> Result<Self, SourceBuildError> {
        let station_endpoint = query_endpoint(Source::Station, &config.station_url)?;
        let volume_map_endpoint = query_endpoint(Source::VolumeMap, &config.volume_map_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            station_endpoint,
            volume_map_endpoint,
            runtime: Some(runtime),
        })
    }

    /// The configuration the source was built from.
    #[must_use]
    pub const fn config(&self) -> &HttpFeatureSourceConfig {
        &self.config
    }

    /// Build the spatial `query` URL for `layer` around `query`.
    ///
    /// Coordinates are sent as `lon,lat` in WGS 84 and the radius in
    /// statute miles.
    #[must_use]
    pub fn query_url(&self, layer: Source, query: &FeatureQuery) -> Url {
        let mut url = match layer {
            Source::Station => self.station_endpoint.clone(),
            Source::VolumeMap => self.volume_map_endpoint.clone(),
        };
        let geometry = format!(
            "{},{}",
            query.coordinate.longitude(),
            query.coordinate.latitude()
        );
        url.query_pairs_mut()
            .append_pair("geometry", &geometry)
            .append_pair("geometryType", "esriGeometryPoint")
            .append_pair("inSR", "4326")
            .append_pair("outSR", "4326")
            .append_pair("spatialRel", "esriSpatialRelIntersects")
            .append_pair("distance", &query.radius_miles.to_string())
            .append_pair("units", "esriSRUnit_StatuteMile")
            .append_pair("outFields", "*")
            .append_pair("returnGeometry", "true")
            .append_pair("f", "json");
        url
    }

    /// Fetch both layers concurrently.
    async fn fetch_async(
        &self,
        query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        let (points, lines) = tokio::try_join!(
            self.fetch_layer(Source::Station, query),
            self.fetch_layer(Source::VolumeMap, query),
        )?;
        Ok(FeatureCollections::new(points, lines))
    }

    /// Fetch and decode a single layer.
    async fn fetch_layer(
        &self,
        layer: Source,
        query: &FeatureQuery,
    ) -> Result<Vec<RawFeature>, FeatureSourceError> {
        let url = self.query_url(layer, query);
        debug!("querying {layer} layer: {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(layer, &err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(layer, &err, &url))?;

        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(layer, &err, &url))?;

        let features = parse_layer_response(layer, &body).inspect_err(|err| {
            warn!("{layer} layer returned an unusable response: {err}");
        })?;
        debug!("{layer} layer returned {} features", features.len());
        Ok(features)
    }

    /// Convert a reqwest error to a `FeatureSourceError`.
    fn convert_reqwest_error(
        &self,
        layer: Source,
        error: &reqwest::Error,
        url: &Url,
    ) -> FeatureSourceError {
        let url = url.to_string();
        if error.is_timeout() {
            return FeatureSourceError::Timeout {
                layer,
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FeatureSourceError::Http {
                layer,
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() || error.is_body() {
            return FeatureSourceError::Parse {
                layer,
                message: error.to_string(),
            };
        }

        FeatureSourceError::Network {
            layer,
            url,
            message: error.to_string(),
        }
    }
}

impl FeatureSource for HttpFeatureSource {
    /// Fetch both layers around `query`.
    ///
    /// # Runtime behaviour
    ///
    /// Callable from plain threads and from either Tokio runtime flavour.
    /// A `current_thread` caller is blocked until both layers arrive.
    fn fetch_features(
        &self,
        query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        let future = self.fetch_async(query);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // Nested block_on panics on the caller's thread.
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.block_on_owned(future))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            }),
            Err(_) => self.block_on_owned(future),
        }
    }
}

impl HttpFeatureSource {
    fn block_on_owned<F>(&self, future: F) -> Result<FeatureCollections, FeatureSourceError>
    where
        F: Future<Output = Result<FeatureCollections, FeatureSourceError>>,
    {
        self.runtime.as_ref().map_or_else(
            || {
                Err(FeatureSourceError::Network {
                    layer: Source::Station,
                    url: self.station_endpoint.to_string(),
                    message: "feature source runtime has shut down".to_owned(),
                })
            },
            |runtime| runtime.block_on(future),
        )
    }
}

/// Parse a layer URL and append the `query` operation.
fn query_endpoint(layer: Source, base: &str) -> Result<Url, SourceBuildError> {
    let invalid = |source| SourceBuildError::InvalidUrl {
        layer,
        url: base.to_owned(),
        source,
    };
    let mut endpoint = Url::parse(base.trim_end_matches('/')).map_err(invalid)?;
    if endpoint.cannot_be_a_base() {
        return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }
    let path = format!("{}/query", endpoint.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    Ok(endpoint)
}
