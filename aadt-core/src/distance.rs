//! Great-circle distance helpers.
//!
//! Ranking works in statute miles; metres only appear at the output
//! boundary via [`miles_to_meters`].

use geo::Coord;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3_958.761;

/// Exact length of a statute mile in metres.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Haversine distance in statute miles between two WGS84 coordinates.
///
/// Coordinates use `x = longitude` and `y = latitude`, in degrees. The
/// intermediate term is clamped to `[0, 1]` so rounding near antipodal
/// points cannot push `asin` out of its domain.
///
/// # Examples
///
/// ```
/// use aadt_core::distance::haversine_miles;
/// use geo::Coord;
///
/// let here = Coord { x: -80.0, y: 35.0 };
/// assert_eq!(haversine_miles(here, here), 0.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
#[must_use]
pub fn haversine_miles(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let from_lat = from.y.to_radians();
    let to_lat = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lon = (to.x - from.x).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * half_chord.clamp(0.0, 1.0).sqrt().asin()
}

/// Convert a distance in miles to whole metres, rounding half away from
/// zero.
///
/// Negative and NaN inputs saturate to `0`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "rounded metre distances are reported as unsigned integers"
)]
#[must_use]
pub fn miles_to_meters(miles: f64) -> u64 {
    (miles * METERS_PER_MILE).round() as u64
}
