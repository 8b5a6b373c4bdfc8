//! Upstream data access for the AADT locator.
//!
//! Responsibilities:
//! - Implement [`aadt_core::FeatureSource`] against ArcGIS REST feature
//!   services.
//! - Encapsulate the upstream wire format and map transport failures onto
//!   [`aadt_core::FeatureSourceError`].
//!
//! Boundaries:
//! - Do not encode selection rules (live in `aadt-core`).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod arcgis;

pub use arcgis::{
    DEFAULT_USER_AGENT, HttpFeatureSource, HttpFeatureSourceConfig, SourceBuildError,
    parse_layer_response,
};
