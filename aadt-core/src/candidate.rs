//! Unified traffic-volume readings extracted from either upstream layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream layer a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Point count stations.
    Station,
    /// Polyline traffic-volume map segments.
    VolumeMap,
}

impl Source {
    /// Stable label used in serialised output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::VolumeMap => "volume-map",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors returned by [`Candidate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CandidateError {
    /// The traffic volume was non-finite, zero or negative.
    #[error("traffic volume {value} must be finite and positive")]
    InvalidValue {
        /// Rejected volume.
        value: f64,
    },
    /// The distance was non-finite or negative.
    #[error("distance {distance_miles} mi must be finite and non-negative")]
    InvalidDistance {
        /// Rejected distance in miles.
        distance_miles: f64,
    },
}

/// A single traffic-volume reading near the query coordinate.
///
/// Candidates are immutable once built. Readings from different layers that
/// describe the same road are kept side by side; nothing deduplicates them.
///
/// # Examples
///
/// ```
/// use aadt_core::{Candidate, Source};
///
/// let candidate = Candidate::new(12_000.0, Some(2022), 0.09, Source::Station)?;
/// assert_eq!(candidate.year(), Some(2022));
/// assert!(Candidate::new(-5.0, None, 0.09, Source::Station).is_err());
/// # Ok::<(), aadt_core::CandidateError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    value: f64,
    year: Option<i32>,
    distance_miles: f64,
    source: Source,
}

impl Candidate {
    /// Validate and construct a candidate.
    ///
    /// # Errors
    /// Returns [`CandidateError::InvalidValue`] unless `value` is finite and
    /// positive, and [`CandidateError::InvalidDistance`] unless
    /// `distance_miles` is finite and non-negative.
    pub fn new(
        value: f64,
        year: Option<i32>,
        distance_miles: f64,
        source: Source,
    ) -> Result<Self, CandidateError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CandidateError::InvalidValue { value });
        }
        if !distance_miles.is_finite() || distance_miles < 0.0 {
            return Err(CandidateError::InvalidDistance { distance_miles });
        }
        Ok(Self {
            value,
            year,
            distance_miles,
            source,
        })
    }

    /// Reported traffic volume.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Measurement year, when the upstream record carried one.
    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        self.year
    }

    /// Great-circle distance from the query coordinate, in statute miles.
    #[must_use]
    pub const fn distance_miles(&self) -> f64 {
        self.distance_miles
    }

    /// Layer that produced the reading.
    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }
}
