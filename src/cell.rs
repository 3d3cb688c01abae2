//! Soil cell state and action application

use crate::actions::{ActionCatalog, AttributeKey};
use crate::attributes::{AttributeVector, BoundsPolicy, SoilAttribute, ATTRIBUTE_COUNT};
use crate::error::{FarmError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// One grid cell's soil and climate readings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilCell {
    pub n: i64,
    pub p: i64,
    pub k: i64,
    pub rainfall: f64,
    pub ph: f64,
    pub humidity: f64,
    pub temperature: f64,

    /// Attributes introduced by actions outside the seven soil attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, f64>,
}

impl SoilCell {
    /// Build a cell from a vector in canonical query order
    ///
    /// Nutrient slots are rounded to whole numbers, saturating at the `i64`
    /// range.
    pub fn from_query_vector(v: &AttributeVector) -> Self {
        let mut cell = Self::default();
        for attribute in SoilAttribute::QUERY_ORDER {
            cell.store(attribute, v[attribute.query_index()]);
        }
        cell
    }

    pub fn get(&self, attribute: SoilAttribute) -> f64 {
        match attribute {
            SoilAttribute::N => self.n as f64,
            SoilAttribute::P => self.p as f64,
            SoilAttribute::K => self.k as f64,
            SoilAttribute::Temperature => self.temperature,
            SoilAttribute::Humidity => self.humidity,
            SoilAttribute::Ph => self.ph,
            SoilAttribute::Rainfall => self.rainfall,
        }
    }

    /// Extra attribute value, if the cell has it
    pub fn extra(&self, name: &str) -> Option<f64> {
        self.extras.get(name).copied()
    }

    fn store(&mut self, attribute: SoilAttribute, value: f64) {
        match attribute {
            SoilAttribute::N => self.n = value.round() as i64,
            SoilAttribute::P => self.p = value.round() as i64,
            SoilAttribute::K => self.k = value.round() as i64,
            SoilAttribute::Temperature => self.temperature = value,
            SoilAttribute::Humidity => self.humidity = value,
            SoilAttribute::Ph => self.ph = value,
            SoilAttribute::Rainfall => self.rainfall = value,
        }
    }

    /// Cell readings in canonical query order (N, P, K, temperature, humidity, pH, rainfall)
    pub fn to_query_vector(&self) -> AttributeVector {
        let mut v = [0.0; ATTRIBUTE_COUNT];
        for attribute in SoilAttribute::QUERY_ORDER {
            v[attribute.query_index()] = self.get(attribute);
        }
        v
    }

    /// Apply a named action and return its display name
    ///
    /// All new values are computed and passed through `bounds` before any is
    /// written, so a failed call leaves the cell untouched.
    pub fn apply_action<'c>(
        &mut self,
        action: &str,
        catalog: &'c ActionCatalog,
        bounds: &impl BoundsPolicy,
    ) -> Result<&'c str> {
        let effect = catalog.lookup(action)?;

        let mut soil_updates: SmallVec<[(SoilAttribute, f64); 4]> = SmallVec::new();
        let mut extra_updates: SmallVec<[(&str, f64); 2]> = SmallVec::new();

        for d in &effect.deltas {
            match &d.key {
                AttributeKey::Soil(attribute) => {
                    // Same attribute may appear in an earlier pending update
                    let current = soil_updates
                        .iter()
                        .rev()
                        .find(|(a, _)| a == attribute)
                        .map(|(_, v)| *v)
                        .unwrap_or_else(|| self.get(*attribute));
                    let mut admitted = bounds.admit(*attribute, current + d.delta)?;
                    if attribute.is_integral() {
                        admitted = whole_nutrient(*attribute, admitted)?;
                    }
                    soil_updates.push((*attribute, admitted));
                }
                AttributeKey::Extra(name) => {
                    let current = extra_updates
                        .iter()
                        .rev()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| *v)
                        .unwrap_or_else(|| self.extra(name).unwrap_or(0.0));
                    let value = current + d.delta;
                    if !value.is_finite() {
                        return Err(FarmError::OutOfBounds {
                            attribute: name.clone(),
                            value,
                            min: f64::MIN,
                            max: f64::MAX,
                        });
                    }
                    extra_updates.push((name.as_str(), value));
                }
            }
        }

        for (attribute, value) in soil_updates {
            self.store(attribute, value);
        }
        for (name, value) in extra_updates {
            self.extras.insert(name.to_string(), value);
        }

        tracing::debug!("Applied action '{}' ({})", action, effect.name);

        Ok(&effect.name)
    }
}

/// Round a nutrient reading, rejecting values the integer fields cannot hold
fn whole_nutrient(attribute: SoilAttribute, value: f64) -> Result<f64> {
    let (min, max) = (i64::MIN as f64, i64::MAX as f64);
    let rounded = value.round();
    // i64::MAX as f64 is 2^63, one past the largest i64
    if rounded < min || rounded >= max {
        return Err(FarmError::OutOfBounds {
            attribute: attribute.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(rounded)
}
