//! ArcGIS REST feature-service access.
//!
//! [`HttpFeatureSource`] implements [`aadt_core::FeatureSource`] by issuing a
//! spatial `query` against two feature layers: one serving point count
//! stations and one serving road segments. Both requests run concurrently and
//! the synchronous trait is satisfied by blocking on an internal Tokio
//! runtime, so the core stays embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use aadt_core::{Estimator, FeatureQuery, QueryCoordinate};
//! use aadt_data::{HttpFeatureSource, HttpFeatureSourceConfig};
//!
//! let config = HttpFeatureSourceConfig::new(
//!     "https://services.example.com/arcgis/rest/services/Stations/FeatureServer/0",
//!     "https://services.example.com/arcgis/rest/services/Volumes/FeatureServer/0",
//! )
//! .with_timeout(Duration::from_secs(10));
//! let estimator = Estimator::new(HttpFeatureSource::with_config(config)?);
//!
//! let query = FeatureQuery::with_default_radius(QueryCoordinate::new(35.0, -80.0)?);
//! let response = estimator.estimate(&query)?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod response;

pub use provider::{
    DEFAULT_USER_AGENT, HttpFeatureSource, HttpFeatureSourceConfig, SourceBuildError,
};
pub use response::parse_layer_response;
