//! Core domain logic for estimating Annual Average Daily Traffic (AADT).
//!
//! The crate turns two raw feature collections, point count stations and
//! polyline volume-map segments, into a single traffic-volume estimate for a
//! query coordinate. It is split into:
//!
//! - [`extract`]: parse-or-skip conversion of [`RawFeature`] values into
//!   [`Candidate`] readings tagged with their [`Source`] layer.
//! - [`select`]: deterministic nearest-candidate ranking producing a
//!   [`Selection`].
//! - [`estimate`](mod@estimate): the pure pipeline plus [`Estimator`], which wires a
//!   [`FeatureSource`] to the pipeline and renders an [`EstimateResponse`].
//!
//! The crate performs no I/O. Fetching upstream features is delegated to
//! [`FeatureSource`] implementations living in adapter crates.
//!
//! # Examples
//!
//! ```
//! use aadt_core::{QueryCoordinate, RawFeature, Selection, Source, estimate};
//!
//! # fn main() -> Result<(), aadt_core::QueryError> {
//! let query = QueryCoordinate::new(35.0, -80.0)?;
//! let points = vec![
//!     RawFeature::new()
//!         .with_point(-80.001, 35.001)
//!         .with_attribute("AADT", 12_000.0)
//!         .with_attribute("AADT_YEAR", 2022),
//! ];
//!
//! let Selection::Found(best) = estimate(query, &points, &[]) else {
//!     panic!("expected a station estimate");
//! };
//! assert_eq!(best.source, Source::Station);
//! assert_eq!(best.distance_meters, 144);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod candidate;
pub mod distance;
pub mod estimate;
pub mod extract;
mod feature;
mod query;
pub mod select;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use candidate::{Candidate, CandidateError, Source};
pub use estimate::{EstimateResponse, Estimator, NOT_FOUND_MESSAGE, SearchParameters, estimate};
pub use extract::{
    AttributeProbe, CandidateExtractor, ExtractionSchema, LayerSchema, extract_candidates,
};
pub use feature::{FeatureCollections, FeatureSet, RawFeature, RawGeometry, Scalar};
pub use query::{DEFAULT_SEARCH_RADIUS_MILES, FeatureQuery, QueryCoordinate, QueryError};
pub use select::{Estimate, Selection, rank_candidates, ranking_order, select_nearest};
pub use source::{FeatureSource, FeatureSourceError};
