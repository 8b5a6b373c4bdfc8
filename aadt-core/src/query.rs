//! Validated query inputs: the coordinate being estimated and its search
//! window.

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Search radius used when callers do not supply one.
pub const DEFAULT_SEARCH_RADIUS_MILES: f64 = 0.5;

/// Errors returned when constructing query inputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QueryError {
    /// Latitude was non-finite or outside `[-90, 90]`.
    #[error("latitude {latitude} must be a finite value between -90 and 90")]
    InvalidLatitude {
        /// Rejected latitude in degrees.
        latitude: f64,
    },
    /// Longitude was non-finite or outside `[-180, 180]`.
    #[error("longitude {longitude} must be a finite value between -180 and 180")]
    InvalidLongitude {
        /// Rejected longitude in degrees.
        longitude: f64,
    },
    /// Search radius was non-finite or not positive.
    #[error("search radius {radius_miles} must be a finite, positive number of miles")]
    InvalidRadius {
        /// Rejected radius in statute miles.
        radius_miles: f64,
    },
}

/// A WGS84 position to estimate traffic volume for.
///
/// Internally stored as a [`Coord`] with `x = longitude` and `y = latitude`.
///
/// # Examples
///
/// ```
/// use aadt_core::QueryCoordinate;
///
/// let query = QueryCoordinate::new(35.0, -80.0).expect("valid coordinate");
/// assert_eq!(query.latitude(), 35.0);
/// assert!(QueryCoordinate::new(f64::NAN, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct QueryCoordinate {
    location: Coord<f64>,
}

impl QueryCoordinate {
    /// Validate and construct a coordinate from degrees.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidLatitude`] or
    /// [`QueryError::InvalidLongitude`] when a component is non-finite or out
    /// of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, QueryError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(QueryError::InvalidLatitude { latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(QueryError::InvalidLongitude { longitude });
        }
        Ok(Self {
            location: Coord {
                x: longitude,
                y: latitude,
            },
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Position as a `geo` coordinate (`x = longitude`, `y = latitude`).
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        self.location
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for QueryCoordinate {
    type Error = QueryError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<QueryCoordinate> for RawCoordinate {
    fn from(value: QueryCoordinate) -> Self {
        Self {
            latitude: value.latitude(),
            longitude: value.longitude(),
        }
    }
}

/// A query coordinate together with the search window the upstream layers
/// were (or will be) filtered to.
///
/// The core pipeline never reads the radius; it is carried so feature
/// sources can build their requests and responses can echo it back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureQuery {
    /// Position being estimated.
    pub coordinate: QueryCoordinate,
    /// Search radius in statute miles.
    pub radius_miles: f64,
}

impl FeatureQuery {
    /// Validate and construct a query.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidRadius`] when `radius_miles` is not a
    /// finite, positive number.
    pub fn new(coordinate: QueryCoordinate, radius_miles: f64) -> Result<Self, QueryError> {
        if !radius_miles.is_finite() || radius_miles <= 0.0 {
            return Err(QueryError::InvalidRadius { radius_miles });
        }
        Ok(Self {
            coordinate,
            radius_miles,
        })
    }

    /// Construct a query using [`DEFAULT_SEARCH_RADIUS_MILES`].
    #[must_use]
    pub const fn with_default_radius(coordinate: QueryCoordinate) -> Self {
        Self {
            coordinate,
            radius_miles: DEFAULT_SEARCH_RADIUS_MILES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        let query = QueryCoordinate::new(latitude, longitude).expect("boundary is valid");
        assert_eq!(query.location(), Coord { x: longitude, y: latitude });
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(90.5)]
    #[case(-91.0)]
    fn rejects_invalid_latitude(#[case] latitude: f64) {
        let err = QueryCoordinate::new(latitude, 0.0).expect_err("latitude is invalid");
        assert!(matches!(err, QueryError::InvalidLatitude { .. }));
    }

    #[rstest]
    #[case(f64::NEG_INFINITY)]
    #[case(180.1)]
    fn rejects_invalid_longitude(#[case] longitude: f64) {
        let err = QueryCoordinate::new(0.0, longitude).expect_err("longitude is invalid");
        assert!(matches!(err, QueryError::InvalidLongitude { .. }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn rejects_invalid_radius(#[case] radius: f64) {
        let coordinate = QueryCoordinate::new(35.0, -80.0).expect("valid coordinate");
        let err = FeatureQuery::new(coordinate, radius).expect_err("radius is invalid");
        assert!(matches!(err, QueryError::InvalidRadius { .. }));
    }

    #[rstest]
    fn deserialising_validates_range() {
        let err = serde_json::from_str::<QueryCoordinate>(r#"{"latitude":95.0,"longitude":0.0}"#);
        assert!(err.is_err());

        let ok: QueryCoordinate =
            serde_json::from_str(r#"{"latitude":35.0,"longitude":-80.0}"#).expect("valid json");
        assert_eq!(ok.longitude(), -80.0);
    }
}
