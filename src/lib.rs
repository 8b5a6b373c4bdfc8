//! Facade crate for the AADT locator.
//!
//! This crate re-exports the core estimation types and exposes the ArcGIS
//! feature source behind the `http` feature flag.

#![forbid(unsafe_code)]

pub use aadt_core::{
    Candidate, CandidateError, CandidateExtractor, DEFAULT_SEARCH_RADIUS_MILES, Estimate,
    EstimateResponse, Estimator, ExtractionSchema, FeatureCollections, FeatureQuery, FeatureSource,
    FeatureSourceError, QueryCoordinate, QueryError, RawFeature, Selection, Source, estimate,
    extract_candidates, select_nearest,
};

#[cfg(feature = "http")]
pub use aadt_data::{HttpFeatureSource, HttpFeatureSourceConfig, SourceBuildError};

#[cfg(feature = "test-support")]
pub use aadt_core::test_support;
