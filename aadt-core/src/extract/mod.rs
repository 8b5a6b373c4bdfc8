//! Convert raw point and polyline features into [`Candidate`] readings.
//!
//! Extraction follows a parse-or-skip policy: a feature with unusable
//! geometry or attributes is dropped without raising an error. Skips are
//! only visible in debug logs.

mod schema;

use geo::Coord;
use log::debug;

use crate::distance::haversine_miles;
use crate::{Candidate, QueryCoordinate, RawFeature, RawGeometry, Source};

pub use schema::{AttributeProbe, ExtractionSchema, LayerSchema};

/// Maximum number of leading vertices sampled from a polyline's first path.
pub const LINE_SAMPLE_LIMIT: usize = 3;

/// Extracts candidates from both upstream layers using an
/// [`ExtractionSchema`].
///
/// # Examples
///
/// ```
/// use aadt_core::{CandidateExtractor, QueryCoordinate, RawFeature, Source};
///
/// # fn main() -> Result<(), aadt_core::QueryError> {
/// let query = QueryCoordinate::new(35.0, -80.0)?;
/// let lines = vec![
///     RawFeature::new()
///         .with_path([(-80.02, 35.02), (-80.01, 35.01)])
///         .with_attribute("AADT_2022", 18_000.0),
/// ];
///
/// let candidates = CandidateExtractor::default().extract(query, &[], &lines);
/// assert_eq!(candidates.len(), 1);
/// assert!(candidates.iter().all(|c| c.source() == Source::VolumeMap));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateExtractor {
    schema: ExtractionSchema,
}

impl CandidateExtractor {
    /// Create an extractor for a custom schema.
    #[must_use]
    pub const fn new(schema: ExtractionSchema) -> Self {
        Self { schema }
    }

    /// Schema in use.
    #[must_use]
    pub const fn schema(&self) -> &ExtractionSchema {
        &self.schema
    }

    /// Extract candidates from both collections.
    ///
    /// Station candidates come first, followed by volume-map candidates, each
    /// group in input order.
    #[must_use]
    pub fn extract(
        &self,
        query: QueryCoordinate,
        points: &[RawFeature],
        lines: &[RawFeature],
    ) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(points.len() + lines.len());
        candidates.extend(
            points
                .iter()
                .filter_map(|feature| self.station_candidate(query, feature)),
        );
        let stations = candidates.len();
        candidates.extend(
            lines
                .iter()
                .filter_map(|feature| self.volume_map_candidate(query, feature)),
        );
        debug!(
            "extracted {stations}/{} station and {}/{} volume-map candidates",
            points.len(),
            candidates.len() - stations,
            lines.len(),
        );
        candidates
    }

    /// Build a candidate from a point feature, or `None` when it is unusable.
    #[must_use]
    pub fn station_candidate(
        &self,
        query: QueryCoordinate,
        feature: &RawFeature,
    ) -> Option<Candidate> {
        let Some(location) = feature.geometry.as_ref().and_then(RawGeometry::coordinate) else {
            debug!("skipping station feature without usable point geometry");
            return None;
        };
        let distance = haversine_miles(query.location(), location);
        build_candidate(&self.schema.station, feature, distance, Source::Station)
    }

    /// Build a candidate from a polyline feature, or `None` when it is
    /// unusable.
    ///
    /// The distance is the minimum over up to [`LINE_SAMPLE_LIMIT`] leading
    /// vertices of the first path, falling back to a centroid-style `x`/`y`
    /// pair when the geometry has no vertices.
    #[must_use]
    pub fn volume_map_candidate(
        &self,
        query: QueryCoordinate,
        feature: &RawFeature,
    ) -> Option<Candidate> {
        let Some(distance) = feature
            .geometry
            .as_ref()
            .and_then(|geometry| nearest_sample_miles(query.location(), geometry))
        else {
            debug!("skipping volume-map feature without usable line geometry");
            return None;
        };
        build_candidate(&self.schema.volume_map, feature, distance, Source::VolumeMap)
    }
}

/// Extract candidates with the default [`ExtractionSchema`].
#[must_use]
pub fn extract_candidates(
    query: QueryCoordinate,
    points: &[RawFeature],
    lines: &[RawFeature],
) -> Vec<Candidate> {
    CandidateExtractor::default().extract(query, points, lines)
}

fn nearest_sample_miles(query: Coord<f64>, geometry: &RawGeometry) -> Option<f64> {
    match geometry.first_path() {
        Some(path) => path
            .iter()
            .take(LINE_SAMPLE_LIMIT)
            .filter_map(|vertex| RawGeometry::vertex_coordinate(vertex))
            .map(|sample| haversine_miles(query, sample))
            .filter(|distance| distance.is_finite())
            .min_by(f64::total_cmp),
        None => geometry
            .coordinate()
            .map(|centroid| haversine_miles(query, centroid))
            .filter(|distance| distance.is_finite()),
    }
}

fn build_candidate(
    layer: &LayerSchema,
    feature: &RawFeature,
    distance_miles: f64,
    source: Source,
) -> Option<Candidate> {
    let Some(value) = layer.value_keys.first_number(feature) else {
        debug!("skipping {source} feature without a numeric volume");
        return None;
    };
    let year = layer.year_keys.first_year(feature);
    Candidate::new(value, year, distance_miles, source)
        .inspect_err(|err| debug!("skipping {source} feature: {err}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scalar, distance::haversine_miles};
    use rstest::{fixture, rstest};

    #[fixture]
    fn query() -> QueryCoordinate {
        QueryCoordinate::new(35.0, -80.0).expect("valid query")
    }

    fn station(x: f64, y: f64, value: impl Into<Scalar>) -> RawFeature {
        RawFeature::new()
            .with_point(x, y)
            .with_attribute("AADT", value)
    }

    #[rstest]
    fn station_candidate_reads_value_year_and_distance(query: QueryCoordinate) {
        let feature = station(-80.001, 35.001, 12_000.0).with_attribute("AADT_YEAR", 2022);

        let candidate = CandidateExtractor::default()
            .station_candidate(query, &feature)
            .expect("usable station");

        assert_eq!(candidate.value(), 12_000.0);
        assert_eq!(candidate.year(), Some(2022));
        assert_eq!(candidate.source(), Source::Station);
        let expected = haversine_miles(query.location(), Coord { x: -80.001, y: 35.001 });
        assert_eq!(candidate.distance_miles(), expected);
    }

    #[rstest]
    fn station_year_is_absent_when_missing(query: QueryCoordinate) {
        let candidate = CandidateExtractor::default()
            .station_candidate(query, &station(-80.0, 35.0, 500.0))
            .expect("usable station");
        assert_eq!(candidate.year(), None);
    }

    #[rstest]
    #[case(Scalar::Number(0.0))]
    #[case(Scalar::Number(-5.0))]
    #[case(Scalar::Text("unknown".into()))]
    #[case(Scalar::Text(String::new()))]
    #[case(Scalar::Null)]
    #[case(Scalar::Bool(true))]
    fn station_rejects_unusable_volumes(query: QueryCoordinate, #[case] value: Scalar) {
        let feature = station(-80.0, 35.0, value);
        assert!(
            CandidateExtractor::default()
                .station_candidate(query, &feature)
                .is_none()
        );
    }

    #[rstest]
    fn station_rejects_missing_or_non_numeric_geometry(query: QueryCoordinate) {
        let extractor = CandidateExtractor::default();
        let no_geometry = RawFeature::new().with_attribute("AADT", 100.0);
        let text_x = RawFeature::new()
            .with_geometry(RawGeometry {
                x: Some(Scalar::Text("-80".into())),
                y: Some(Scalar::Number(35.0)),
                paths: None,
            })
            .with_attribute("AADT", 100.0);
        let nan_y = station(-80.0, f64::NAN, 100.0);

        assert!(extractor.station_candidate(query, &no_geometry).is_none());
        assert!(extractor.station_candidate(query, &text_x).is_none());
        assert!(extractor.station_candidate(query, &nan_y).is_none());
    }

    #[rstest]
    fn line_distance_is_minimum_over_first_three_vertices(query: QueryCoordinate) {
        let vertices = [(-80.02, 35.02), (-80.001, 35.001), (-80.01, 35.01)];
        let feature = RawFeature::new()
            .with_path(vertices)
            .with_attribute("AADT", 18_000.0);

        let candidate = CandidateExtractor::default()
            .volume_map_candidate(query, &feature)
            .expect("usable line");

        let first_only = haversine_miles(query.location(), Coord { x: -80.02, y: 35.02 });
        let nearest = haversine_miles(query.location(), Coord { x: -80.001, y: 35.001 });
        assert_eq!(candidate.distance_miles(), nearest);
        assert!(candidate.distance_miles() < first_only);
    }

    #[rstest]
    fn line_ignores_vertices_beyond_the_third(query: QueryCoordinate) {
        let feature = RawFeature::new()
            .with_path([
                (-80.03, 35.03),
                (-80.02, 35.02),
                (-80.01, 35.01),
                (-80.0, 35.0),
            ])
            .with_attribute("AADT", 18_000.0);

        let candidate = CandidateExtractor::default()
            .volume_map_candidate(query, &feature)
            .expect("usable line");

        let third = haversine_miles(query.location(), Coord { x: -80.01, y: 35.01 });
        assert_eq!(candidate.distance_miles(), third);
    }

    #[rstest]
    fn line_skips_non_finite_vertices(query: QueryCoordinate) {
        let feature = RawFeature::new()
            .with_path([(f64::NAN, 35.0), (-80.01, 35.01)])
            .with_attribute("AADT", 900.0);

        let candidate = CandidateExtractor::default()
            .volume_map_candidate(query, &feature)
            .expect("one finite vertex is enough");

        let expected = haversine_miles(query.location(), Coord { x: -80.01, y: 35.01 });
        assert_eq!(candidate.distance_miles(), expected);
    }

    #[rstest]
    fn line_falls_back_to_centroid(query: QueryCoordinate) {
        let feature = RawFeature::new()
            .with_geometry(RawGeometry {
                paths: Some(Vec::new()),
                ..RawGeometry::point(-80.003, 35.0)
            })
            .with_attribute("VOLUME", "4200");

        let candidate = CandidateExtractor::default()
            .volume_map_candidate(query, &feature)
            .expect("centroid is usable");

        assert_eq!(candidate.value(), 4_200.0);
        let expected = haversine_miles(query.location(), Coord { x: -80.003, y: 35.0 });
        assert_eq!(candidate.distance_miles(), expected);
    }

    #[rstest]
    fn line_without_usable_geometry_is_skipped(query: QueryCoordinate) {
        let extractor = CandidateExtractor::default();
        let bare = RawFeature::new()
            .with_geometry(RawGeometry::default())
            .with_attribute("AADT", 100.0);
        let all_invalid = RawFeature::new()
            .with_path([(f64::NAN, 35.0), (-80.0, f64::INFINITY)])
            .with_attribute("AADT", 100.0);

        assert!(extractor.volume_map_candidate(query, &bare).is_none());
        assert!(extractor.volume_map_candidate(query, &all_invalid).is_none());
    }

    #[rstest]
    fn line_value_probe_prefers_year_specific_keys(query: QueryCoordinate) {
        let feature = RawFeature::new()
            .with_path([(-80.0, 35.0)])
            .with_attribute("AADT_2023", Scalar::Null)
            .with_attribute("AADT_2022", "16500")
            .with_attribute("AADT", 14_000.0)
            .with_attribute("YEAR", "2022");

        let candidate = CandidateExtractor::default()
            .volume_map_candidate(query, &feature)
            .expect("usable line");

        assert_eq!(candidate.value(), 16_500.0);
        assert_eq!(candidate.year(), Some(2022));
    }

    #[rstest]
    fn line_with_non_positive_first_value_is_skipped(query: QueryCoordinate) {
        let feature = RawFeature::new()
            .with_path([(-80.0, 35.0)])
            .with_attribute("AADT_2023", 0.0)
            .with_attribute("AADT", 14_000.0);

        assert!(
            CandidateExtractor::default()
                .volume_map_candidate(query, &feature)
                .is_none()
        );
    }

    #[rstest]
    fn extract_preserves_layer_and_input_order(query: QueryCoordinate) {
        let points = vec![
            station(-80.01, 35.01, 300.0),
            station(-80.0, 35.0, -1.0),
            station(-80.001, 35.001, 100.0),
        ];
        let lines = vec![
            RawFeature::new()
                .with_path([(-80.0, 35.0)])
                .with_attribute("AADT", 200.0),
        ];

        let candidates = extract_candidates(query, &points, &lines);

        let summary: Vec<(Source, f64)> = candidates
            .iter()
            .map(|c| (c.source(), c.value()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Source::Station, 300.0),
                (Source::Station, 100.0),
                (Source::VolumeMap, 200.0),
            ]
        );
    }

    #[rstest]
    fn custom_schema_reads_renamed_fields(query: QueryCoordinate) {
        let schema = ExtractionSchema {
            station: LayerSchema::new(["COUNT"], ["COUNT_YR"]),
            ..ExtractionSchema::default()
        };
        let feature = RawFeature::new()
            .with_point(-80.0, 35.0)
            .with_attribute("COUNT", 700.0)
            .with_attribute("COUNT_YR", 2018);

        let candidate = CandidateExtractor::new(schema)
            .station_candidate(query, &feature)
            .expect("usable station");

        assert_eq!(candidate.value(), 700.0);
        assert_eq!(candidate.year(), Some(2018));
    }
}
