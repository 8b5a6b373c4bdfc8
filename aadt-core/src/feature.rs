//! Raw upstream features as returned by ArcGIS-style feature services.
//!
//! Upstream data is sparse and inconsistently typed, so attribute values and
//! coordinates are kept as loosely typed [`Scalar`] values. Nothing here
//! validates; coercion happens during extraction.
//!
//! Decoding never fails on a single bad record. A feature whose geometry or
//! attributes have an unexpected shape decodes with that part missing, and
//! the extractor then skips it like any other unusable feature.

use std::collections::HashMap;

use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A loosely typed attribute or coordinate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// A boolean flag. Never coerces to a number.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A textual value, possibly holding a number.
    Text(String),
    /// Any nested structure the schema does not expect.
    Other(serde_json::Value),
}

impl Scalar {
    /// Coerce the value to a number.
    ///
    /// Numbers pass through unchanged and text is trimmed and parsed, with
    /// blank text reading as `0`. Booleans, nulls and nested values yield
    /// `None`. The result may be non-finite.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse().ok()
                }
            }
            Self::Null | Self::Bool(_) | Self::Other(_) => None,
        }
    }

    /// Coerce the value to a finite number.
    #[must_use]
    pub fn as_finite_number(&self) -> Option<f64> {
        self.as_number().filter(|number| number.is_finite())
    }

    /// Coerce the value to a calendar year.
    ///
    /// Accepts integral numbers within `i32` range and integer text.
    #[must_use]
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Self::Number(number) => integral_i32(*number),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Null | Self::Bool(_) | Self::Other(_) => None,
        }
    }

    /// Interpret the value as a coordinate component.
    ///
    /// Only finite JSON numbers qualify; numeric text is rejected.
    #[must_use]
    pub fn as_coordinate(&self) -> Option<f64> {
        match self {
            Self::Number(number) if number.is_finite() => Some(*number),
            _ => None,
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is checked to be integral and within i32 range first"
)]
fn integral_i32(number: f64) -> Option<i32> {
    let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&number);
    (in_range && number.fract() == 0.0).then_some(number as i32)
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => number
                .as_f64()
                .map_or_else(|| Self::Other(Value::Number(number)), Self::Number),
            Value::String(text) => Self::Text(text),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Other(nested),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Geometry payload of a raw feature.
///
/// Point features populate `x`/`y`. Line features populate `paths`, each an
/// ordered list of `[x, y, ...]` vertices, and may also carry a
/// centroid-style `x`/`y` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGeometry {
    /// Longitude of a point or centroid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Scalar>,
    /// Latitude of a point or centroid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Scalar>,
    /// Polyline paths; only the first is ever sampled.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_paths"
    )]
    pub paths: Option<Vec<Vec<Vec<Scalar>>>>,
}

/// Read `paths` without rejecting the feature. A `paths` value that is not
/// an array reads as absent; a path or vertex that is not an array reads as
/// empty.
fn lenient_paths<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<Vec<Scalar>>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(paths) => Some(
            paths
                .into_iter()
                .map(|path| array_items(path, |vertex| array_items(vertex, Scalar::from)))
                .collect(),
        ),
        _ => None,
    })
}

fn array_items<T>(value: Value, read: impl FnMut(Value) -> T) -> Vec<T> {
    match value {
        Value::Array(items) => items.into_iter().map(read).collect(),
        _ => Vec::new(),
    }
}

impl RawGeometry {
    /// Geometry holding a single `x`/`y` pair.
    #[must_use]
    pub const fn point(x: f64, y: f64) -> Self {
        Self {
            x: Some(Scalar::Number(x)),
            y: Some(Scalar::Number(y)),
            paths: None,
        }
    }

    /// Geometry holding a single path of `(x, y)` vertices.
    #[must_use]
    pub fn path<I>(vertices: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let path = vertices
            .into_iter()
            .map(|(x, y)| vec![Scalar::Number(x), Scalar::Number(y)])
            .collect();
        Self {
            x: None,
            y: None,
            paths: Some(vec![path]),
        }
    }

    /// The `x`/`y` pair when both components are finite numbers.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coord<f64>> {
        let x = self.x.as_ref()?.as_coordinate()?;
        let y = self.y.as_ref()?.as_coordinate()?;
        Some(Coord { x, y })
    }

    /// The first path, provided it has at least one vertex.
    #[must_use]
    pub fn first_path(&self) -> Option<&[Vec<Scalar>]> {
        self.paths
            .as_deref()?
            .first()
            .map(Vec::as_slice)
            .filter(|path| !path.is_empty())
    }

    /// Read a `[x, y, ...]` vertex, requiring both components to be finite.
    #[must_use]
    pub fn vertex_coordinate(vertex: &[Scalar]) -> Option<Coord<f64>> {
        let x = vertex.first()?.as_coordinate()?;
        let y = vertex.get(1)?.as_coordinate()?;
        Some(Coord { x, y })
    }
}

/// A feature record from an upstream layer.
///
/// # Examples
///
/// ```
/// use aadt_core::{RawFeature, Scalar};
///
/// let feature = RawFeature::new()
///     .with_point(-80.0, 35.0)
///     .with_attribute("AADT", "12000");
/// assert_eq!(feature.attribute("AADT"), Some(&Scalar::Text("12000".into())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawFeature {
    /// Attribute values keyed by field name.
    pub attributes: HashMap<String, Scalar>,
    /// Geometry payload, absent when the service omitted it or sent
    /// something other than a geometry object.
    pub geometry: Option<RawGeometry>,
}

impl From<Value> for RawFeature {
    fn from(value: Value) -> Self {
        let Value::Object(mut record) = value else {
            return Self::default();
        };
        let attributes = match record.remove("attributes") {
            Some(Value::Object(fields)) => fields
                .into_iter()
                .map(|(key, field)| (key, Scalar::from(field)))
                .collect(),
            _ => HashMap::new(),
        };
        let geometry = record
            .remove("geometry")
            .and_then(|geometry| RawGeometry::deserialize(geometry).ok());
        Self {
            attributes,
            geometry,
        }
    }
}

impl RawFeature {
    /// Create a feature with no attributes and no geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replace the geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: RawGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Replace the geometry with a point at `(x, y)`.
    #[must_use]
    pub fn with_point(self, x: f64, y: f64) -> Self {
        self.with_geometry(RawGeometry::point(x, y))
    }

    /// Replace the geometry with a single polyline path.
    #[must_use]
    pub fn with_path<I>(self, vertices: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.with_geometry(RawGeometry::path(vertices))
    }

    /// Look up an attribute by exact key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Scalar> {
        self.attributes.get(key)
    }
}

/// The `features` envelope of an ArcGIS query response or an exported
/// feature file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Features in service order.
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

/// Both raw collections needed for an estimate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollections {
    /// Point features from the count-station layer.
    pub points: Vec<RawFeature>,
    /// Polyline features from the volume-map layer.
    pub lines: Vec<RawFeature>,
}

impl FeatureCollections {
    /// Bundle the two collections.
    #[must_use]
    pub const fn new(points: Vec<RawFeature>, lines: Vec<RawFeature>) -> Self {
        Self { points, lines }
    }
}
