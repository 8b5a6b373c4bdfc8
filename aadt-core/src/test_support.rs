//! Test doubles for [`FeatureSource`] used by unit and behaviour tests in
//! this and downstream crates.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{FeatureCollections, FeatureQuery, FeatureSource, FeatureSourceError, RawFeature};

/// `FeatureSource` returning a pre-configured response for every query.
///
/// # Examples
///
/// ```
/// use aadt_core::test_support::StaticFeatureSource;
/// use aadt_core::{FeatureQuery, FeatureSource, QueryCoordinate};
///
/// let source = StaticFeatureSource::empty();
/// let query = FeatureQuery::with_default_radius(QueryCoordinate::new(0.0, 0.0).unwrap());
/// let collections = source.fetch_features(&query).unwrap();
/// assert!(collections.points.is_empty());
/// assert_eq!(source.calls(), 1);
/// ```
#[derive(Debug)]
pub struct StaticFeatureSource {
    response: Result<FeatureCollections, FeatureSourceError>,
    calls: AtomicUsize,
}

impl StaticFeatureSource {
    /// Return the given collections for every query.
    #[must_use]
    pub const fn with_features(points: Vec<RawFeature>, lines: Vec<RawFeature>) -> Self {
        Self {
            response: Ok(FeatureCollections::new(points, lines)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Return empty collections for every query.
    #[must_use]
    pub const fn empty() -> Self {
        Self::with_features(Vec::new(), Vec::new())
    }

    /// Fail every query with `error`.
    #[must_use]
    pub const fn with_error(error: FeatureSourceError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl FeatureSource for StaticFeatureSource {
    fn fetch_features(
        &self,
        _query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.response.clone()
    }
}
