//! End-to-end estimation: extraction followed by nearest selection.
//!
//! [`estimate`] is the pure pipeline. [`Estimator`] wraps a
//! [`FeatureSource`] around it and renders an [`EstimateResponse`] suitable
//! for serialisation.

use log::{debug, warn};
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    CandidateExtractor, ExtractionSchema, FeatureQuery, FeatureSource, FeatureSourceError,
    QueryCoordinate, RawFeature, Selection, Source, extract_candidates, select_nearest,
};

/// Message reported when no candidate survives extraction.
pub const NOT_FOUND_MESSAGE: &str = "no traffic volume data found";

/// Estimate traffic volume at `query` from raw station and volume-map
/// features.
///
/// The function is pure and allocates only local state, so it may be called
/// concurrently without coordination.
#[must_use]
pub fn estimate(query: QueryCoordinate, points: &[RawFeature], lines: &[RawFeature]) -> Selection {
    select_nearest(&extract_candidates(query, points, lines))
}

/// Search window echoed back when nothing was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Query latitude in degrees.
    pub latitude: f64,
    /// Query longitude in degrees.
    pub longitude: f64,
    /// Search radius in statute miles.
    pub radius_miles: f64,
}

impl From<&FeatureQuery> for SearchParameters {
    fn from(query: &FeatureQuery) -> Self {
        Self {
            latitude: query.coordinate.latitude(),
            longitude: query.coordinate.longitude(),
            radius_miles: query.radius_miles,
        }
    }
}

/// Serialisable outcome of an estimate, tagged by `status`.
///
/// # Examples
///
/// ```
/// use aadt_core::{EstimateResponse, FeatureQuery, QueryCoordinate, Selection};
///
/// let query = FeatureQuery::with_default_radius(QueryCoordinate::new(35.0, -80.0).unwrap());
/// let response = EstimateResponse::from_selection(
///     &Selection::NotFound { candidate_count: 0 },
///     &query,
/// );
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["status"], "not-found");
/// assert_eq!(json["search"]["radius_miles"], 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum EstimateResponse {
    /// A reading was selected.
    Found {
        /// Traffic volume of the selected reading. Whole volumes serialise
        /// as JSON integers.
        #[serde(serialize_with = "serialize_volume")]
        aadt: f64,
        /// Measurement year, serialised as `null` when unknown.
        year: Option<i32>,
        /// Distance to the reading in whole metres.
        distance_meters: u64,
        /// Layer that produced the reading.
        source: Source,
        /// Number of candidates considered.
        candidate_count: usize,
    },
    /// No reading was available near the query.
    NotFound {
        /// Human-readable explanation.
        message: String,
        /// Search window that produced no data.
        search: SearchParameters,
        /// Number of candidates considered; always zero.
        candidate_count: usize,
    },
}

impl EstimateResponse {
    /// Render a [`Selection`] for the query that produced it.
    #[must_use]
    pub fn from_selection(selection: &Selection, query: &FeatureQuery) -> Self {
        match selection {
            Selection::Found(best) => Self::Found {
                aadt: best.value,
                year: best.year,
                distance_meters: best.distance_meters,
                source: best.source,
                candidate_count: best.candidate_count,
            },
            Selection::NotFound { candidate_count } => Self::NotFound {
                message: NOT_FOUND_MESSAGE.to_owned(),
                search: SearchParameters::from(query),
                candidate_count: *candidate_count,
            },
        }
    }

    /// Whether a reading was selected.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Number of candidates considered.
    #[must_use]
    pub const fn candidate_count(&self) -> usize {
        match self {
            Self::Found {
                candidate_count, ..
            }
            | Self::NotFound {
                candidate_count, ..
            } => *candidate_count,
        }
    }
}

/// Largest volume an `f64` holds exactly as an integer (2^53).
const MAX_EXACT_VOLUME: f64 = 9_007_199_254_740_992.0;

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde passes fields to serialize_with by reference"
)]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "only integral volumes within the exact f64 range are cast"
)]
fn serialize_volume<S: Serializer>(aadt: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if aadt.fract() == 0.0 && (0.0..=MAX_EXACT_VOLUME).contains(aadt) {
        serializer.serialize_u64(*aadt as u64)
    } else {
        serializer.serialize_f64(*aadt)
    }
}

/// Fetches features from a [`FeatureSource`] and runs the estimation
/// pipeline over them.
///
/// # Examples
///
/// ```
/// use aadt_core::{
///     Estimator, FeatureCollections, FeatureQuery, FeatureSource, FeatureSourceError,
///     QueryCoordinate, RawFeature,
/// };
///
/// struct OneStation;
///
/// impl FeatureSource for OneStation {
///     fn fetch_features(&self, _: &FeatureQuery) -> Result<FeatureCollections, FeatureSourceError> {
///         let station = RawFeature::new()
///             .with_point(-80.001, 35.001)
///             .with_attribute("AADT", 12_000.0);
///         Ok(FeatureCollections::new(vec![station], Vec::new()))
///     }
/// }
///
/// let query = FeatureQuery::with_default_radius(QueryCoordinate::new(35.0, -80.0).unwrap());
/// let response = Estimator::new(OneStation).estimate(&query)?;
/// assert!(response.is_found());
/// # Ok::<(), FeatureSourceError>(())
/// ```
#[derive(Debug)]
pub struct Estimator<S> {
    source: S,
    extractor: CandidateExtractor,
}

impl<S: FeatureSource> Estimator<S> {
    /// Build an estimator using the default [`ExtractionSchema`].
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_schema(source, ExtractionSchema::default())
    }

    /// Build an estimator with a custom attribute schema.
    #[must_use]
    pub const fn with_schema(source: S, schema: ExtractionSchema) -> Self {
        Self {
            source,
            extractor: CandidateExtractor::new(schema),
        }
    }

    /// Fetch features around `query` and select the best reading.
    ///
    /// # Errors
    /// Propagates [`FeatureSourceError`] from the underlying source. An empty
    /// neighbourhood is not an error; it yields
    /// [`EstimateResponse::NotFound`].
    pub fn estimate(&self, query: &FeatureQuery) -> Result<EstimateResponse, FeatureSourceError> {
        let collections = self.source.fetch_features(query).inspect_err(|err| {
            warn!("feature fetch for {} layer failed: {err}", err.layer());
        })?;
        let candidates =
            self.extractor
                .extract(query.coordinate, &collections.points, &collections.lines);
        let selection = select_nearest(&candidates);
        debug!(
            "selected {:?} from {} candidates",
            selection.estimate(),
            selection.candidate_count()
        );
        Ok(EstimateResponse::from_selection(&selection, query))
    }

    /// The wrapped feature source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}
