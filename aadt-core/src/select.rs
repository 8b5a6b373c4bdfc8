//! Nearest-candidate selection.
//!
//! Candidates are ranked by distance, then by measurement year (newest
//! first), then by volume (largest first). When several sensors report from
//! effectively the same spot, a recent count is preferred over an older but
//! larger one.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::distance::miles_to_meters;
use crate::{Candidate, Source};

/// The winning candidate, with its distance converted to metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Reported traffic volume.
    pub value: f64,
    /// Measurement year, if known.
    pub year: Option<i32>,
    /// Distance from the query coordinate, rounded to whole metres.
    pub distance_meters: u64,
    /// Layer that produced the reading.
    pub source: Source,
    /// Number of candidates considered.
    pub candidate_count: usize,
}

impl Estimate {
    fn from_candidate(best: &Candidate, candidate_count: usize) -> Self {
        Self {
            value: best.value(),
            year: best.year(),
            distance_meters: miles_to_meters(best.distance_miles()),
            source: best.source(),
            candidate_count,
        }
    }
}

/// Outcome of [`select_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// At least one candidate was available.
    Found(Estimate),
    /// No candidates survived extraction.
    NotFound {
        /// Number of candidates considered; always zero.
        candidate_count: usize,
    },
}

impl Selection {
    /// Number of candidates the selection was made from.
    #[must_use]
    pub const fn candidate_count(&self) -> usize {
        match self {
            Self::Found(estimate) => estimate.candidate_count,
            Self::NotFound { candidate_count } => *candidate_count,
        }
    }

    /// The winning estimate, if any.
    #[must_use]
    pub const fn estimate(&self) -> Option<&Estimate> {
        match self {
            Self::Found(estimate) => Some(estimate),
            Self::NotFound { .. } => None,
        }
    }
}

/// Total order placing the preferred candidate first.
///
/// A missing year compares as year `0`, so an explicit year of `0` ties
/// with an undated reading.
#[must_use]
pub fn ranking_order(a: &Candidate, b: &Candidate) -> Ordering {
    a.distance_miles()
        .total_cmp(&b.distance_miles())
        .then_with(|| year_key(b).cmp(&year_key(a)))
        .then_with(|| b.value().total_cmp(&a.value()))
}

fn year_key(candidate: &Candidate) -> i32 {
    candidate.year().unwrap_or(0)
}

/// Sort candidates best-first. Full ties keep their input order.
#[must_use]
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(ranking_order);
    candidates
}

/// Pick the best candidate according to [`ranking_order`].
///
/// # Examples
///
/// ```
/// use aadt_core::{Candidate, Selection, Source, select_nearest};
///
/// let older = Candidate::new(5_000.0, Some(2021), 0.2, Source::Station)?;
/// let newer = Candidate::new(3_000.0, Some(2023), 0.2, Source::VolumeMap)?;
///
/// let Selection::Found(best) = select_nearest(&[older, newer]) else {
///     panic!("expected a winner");
/// };
/// assert_eq!(best.year, Some(2023));
/// assert_eq!(best.candidate_count, 2);
/// assert_eq!(select_nearest(&[]).candidate_count(), 0);
/// # Ok::<(), aadt_core::CandidateError>(())
/// ```
#[must_use]
pub fn select_nearest(candidates: &[Candidate]) -> Selection {
    let candidate_count = candidates.len();
    candidates
        .iter()
        .min_by(|a, b| ranking_order(a, b))
        .map_or(Selection::NotFound { candidate_count }, |best| {
            Selection::Found(Estimate::from_candidate(best, candidate_count))
        })
}
