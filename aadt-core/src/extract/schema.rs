//! Attribute-key schemas used to read volumes and years from raw features.

use serde::{Deserialize, Serialize};

use crate::{RawFeature, Scalar};

/// An ordered list of attribute keys tried in turn.
///
/// Each key acts as an extractor returning `Option<T>`; the first key that
/// yields a value wins. Later keys are never consulted once one succeeds,
/// even if the winning value is later rejected.
///
/// # Examples
///
/// ```
/// use aadt_core::{AttributeProbe, RawFeature};
///
/// let probe = AttributeProbe::new(["AADT_2023", "AADT"]);
/// let feature = RawFeature::new()
///     .with_attribute("AADT_2023", "not counted")
///     .with_attribute("AADT", 9_100.0);
/// assert_eq!(probe.first_number(&feature), Some(9_100.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeProbe {
    keys: Vec<String>,
}

impl AttributeProbe {
    /// Build a probe from keys in priority order.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Keys in priority order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// First attribute that coerces to a finite number.
    #[must_use]
    pub fn first_number(&self, feature: &RawFeature) -> Option<f64> {
        self.first_with(feature, Scalar::as_finite_number)
    }

    /// First attribute that coerces to a year.
    #[must_use]
    pub fn first_year(&self, feature: &RawFeature) -> Option<i32> {
        self.first_with(feature, Scalar::as_year)
    }

    fn first_with<T>(&self, feature: &RawFeature, read: impl Fn(&Scalar) -> Option<T>) -> Option<T> {
        self.keys
            .iter()
            .find_map(|key| feature.attribute(key).and_then(&read))
    }
}

/// Volume and year probes for one upstream layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSchema {
    /// Keys holding the traffic volume.
    pub value_keys: AttributeProbe,
    /// Keys holding the measurement year.
    pub year_keys: AttributeProbe,
}

impl LayerSchema {
    /// Build a layer schema from two key lists.
    #[must_use]
    pub fn new<V, Y, S, T>(value_keys: V, year_keys: Y) -> Self
    where
        V: IntoIterator<Item = S>,
        S: Into<String>,
        Y: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            value_keys: AttributeProbe::new(value_keys),
            year_keys: AttributeProbe::new(year_keys),
        }
    }
}

/// Attribute schemas for both upstream layers.
///
/// The defaults match the published station and volume-map services;
/// deployments pointing at differently named fields can deserialise their
/// own schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSchema {
    /// Schema of the point count-station layer.
    pub station: LayerSchema,
    /// Schema of the polyline volume-map layer.
    pub volume_map: LayerSchema,
}

impl Default for ExtractionSchema {
    fn default() -> Self {
        Self {
            station: LayerSchema::new(["AADT"], ["AADT_YEAR"]),
            volume_map: LayerSchema::new(
                ["AADT_2023", "AADT_2022", "AADT_2021", "AADT", "VOLUME"],
                ["AADT_YEAR", "YEAR", "DATA_YEAR"],
            ),
        }
    }
}
