//! Feature-source trait shared by HTTP and file-backed adapters.

use crate::{FeatureCollections, FeatureQuery};

use super::error::FeatureSourceError;

/// Fetch both raw feature collections for a query.
///
/// Implementations trust the radius in the [`FeatureQuery`] to bound the
/// search window and must return fully materialised collections; the core
/// does not care in which order the two layers arrived. Implementations must
/// be `Send + Sync` so one source can serve concurrent callers.
///
/// # Examples
///
/// ```rust
/// use aadt_core::{
///     FeatureCollections, FeatureQuery, FeatureSource, FeatureSourceError, QueryCoordinate,
///     RawFeature,
/// };
///
/// struct SingleStation;
///
/// impl FeatureSource for SingleStation {
///     fn fetch_features(
///         &self,
///         query: &FeatureQuery,
///     ) -> Result<FeatureCollections, FeatureSourceError> {
///         let station = RawFeature::new()
///             .with_point(query.coordinate.longitude(), query.coordinate.latitude())
///             .with_attribute("AADT", 1_000.0);
///         Ok(FeatureCollections::new(vec![station], Vec::new()))
///     }
/// }
///
/// let query = FeatureQuery::with_default_radius(QueryCoordinate::new(35.0, -80.0).unwrap());
/// let collections = SingleStation.fetch_features(&query)?;
/// assert_eq!(collections.points.len(), 1);
/// # Ok::<(), FeatureSourceError>(())
/// ```
pub trait FeatureSource: Send + Sync {
    /// Return the point and polyline features around `query`.
    ///
    /// # Errors
    /// Returns [`FeatureSourceError`] when either layer cannot be fetched or
    /// decoded.
    fn fetch_features(&self, query: &FeatureQuery)
    -> Result<FeatureCollections, FeatureSourceError>;
}

impl<T: FeatureSource + ?Sized> FeatureSource for Box<T> {
    fn fetch_features(
        &self,
        query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        (**self).fetch_features(query)
    }
}

impl<T: FeatureSource + ?Sized> FeatureSource for &T {
    fn fetch_features(
        &self,
        query: &FeatureQuery,
    ) -> Result<FeatureCollections, FeatureSourceError> {
        (**self).fetch_features(query)
    }
}
