//! Action catalog
//!
//! Static registry of player actions. Each action has a display name and a
//! list of additive attribute deltas. The table is loaded once (from JSON or the
//! built-in defaults), validated eagerly, and read-only afterwards.

use crate::attributes::SoilAttribute;
use crate::error::{FarmError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Action table as written in configuration: action key → spec
pub type ActionTable = BTreeMap<String, ActionSpec>;

/// Unvalidated action entry
///
/// Effect values stay loosely typed until [`ActionCatalog::from_table`]
/// checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default)]
    pub effect: BTreeMap<String, Value>,
}

impl ActionSpec {
    pub fn new(name: &str, effect: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            effect: effect
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        }
    }
}

/// Attribute targeted by a delta
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeKey {
    Soil(SoilAttribute),
    /// Not one of the seven soil attributes; created on the cell at 0
    Extra(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDelta {
    pub key: AttributeKey,
    pub delta: f64,
}

/// Validated action: display name plus typed deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEffect {
    pub name: String,
    pub deltas: SmallVec<[AttributeDelta; 4]>,
}

impl ActionEffect {
    /// Delta for a soil attribute, if this action touches it
    pub fn delta_for(&self, attribute: SoilAttribute) -> Option<f64> {
        self.deltas.iter().find_map(|d| match d.key {
            AttributeKey::Soil(a) if a == attribute => Some(d.delta),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCatalog {
    actions: BTreeMap<String, ActionEffect>,
    allow_implicit_attributes: bool,
}

impl ActionCatalog {
    /// Validate an action table
    ///
    /// Rejects non-numeric or non-finite deltas, fractional deltas on N/P/K,
    /// and (unless `allow_implicit_attributes`) attribute names outside the
    /// seven soil attributes.
    pub fn from_table(table: &ActionTable, allow_implicit_attributes: bool) -> Result<Self> {
        let mut actions = BTreeMap::new();

        for (key, spec) in table {
            if spec.name.trim().is_empty() {
                return Err(FarmError::MalformedAction {
                    action: key.clone(),
                    reason: "empty display name".to_string(),
                });
            }

            let mut deltas = SmallVec::new();
            for (attr_name, raw) in &spec.effect {
                let delta = raw
                    .as_f64()
                    .filter(|d| d.is_finite())
                    .ok_or_else(|| FarmError::MalformedAction {
                        action: key.clone(),
                        reason: format!(
                            "delta for '{}' is not a finite number: {}",
                            attr_name, raw
                        ),
                    })?;

                let attr_key = match attr_name.parse::<SoilAttribute>() {
                    Ok(attribute) => {
                        if attribute.is_integral() && delta.fract() != 0.0 {
                            return Err(FarmError::MalformedAction {
                                action: key.clone(),
                                reason: format!(
                                    "{} delta must be a whole number, got {}",
                                    attribute, delta
                                ),
                            });
                        }
                        AttributeKey::Soil(attribute)
                    }
                    Err(_) if allow_implicit_attributes => AttributeKey::Extra(attr_name.clone()),
                    Err(_) => {
                        return Err(FarmError::UnknownAttribute {
                            action: key.clone(),
                            attribute: attr_name.clone(),
                        })
                    }
                };

                deltas.push(AttributeDelta { key: attr_key, delta });
            }

            actions.insert(
                key.clone(),
                ActionEffect {
                    name: spec.name.clone(),
                    deltas,
                },
            );
        }

        tracing::debug!(
            "Validated {} actions (implicit attributes: {})",
            actions.len(),
            allow_implicit_attributes
        );

        Ok(Self {
            actions,
            allow_implicit_attributes,
        })
    }

    /// Load and validate an action table from a JSON file
    pub fn load(path: &Path, allow_implicit_attributes: bool) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read action table: {:?}", path))?;

        let table: ActionTable = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse action table JSON")?;

        Ok(Self::from_table(&table, allow_implicit_attributes)?)
    }

    pub fn lookup(&self, name: &str) -> Result<&ActionEffect> {
        self.actions.get(name).ok_or_else(|| FarmError::UnknownAction {
            action: name.to_string(),
        })
    }

    /// Action keys in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn allows_implicit_attributes(&self) -> bool {
        self.allow_implicit_attributes
    }
}

/// Built-in action table
pub fn default_action_table() -> ActionTable {
    let mut table = ActionTable::new();
    let mut add = |key: &str, name: &str, effect: &[(&str, f64)]| {
        table.insert(key.to_string(), ActionSpec::new(name, effect));
    };

    add("irrigate", "Irrigate Field", &[("humidity", 10.0)]);
    add("water", "Water Crops", &[("humidity", 5.0), ("rainfall", 15.0)]);
    add("fertilize_n", "Apply Nitrogen Fertilizer", &[("N", 20.0)]);
    add("fertilize_p", "Apply Phosphate Fertilizer", &[("P", 15.0)]);
    add("fertilize_k", "Apply Potash", &[("K", 15.0)]);
    add("compost", "Spread Compost", &[("N", 5.0), ("P", 5.0), ("K", 5.0), ("ph", -0.1)]);
    add("lime", "Lime Soil", &[("ph", 0.5)]);
    add("acidify", "Apply Sulfur", &[("ph", -0.5)]);
    add("insecticide", "Spray Insecticide", &[("pest_pressure", -10.0)]);
    add("pesticide", "Spray Pesticide", &[("pest_pressure", -15.0), ("N", -2.0)]);

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_table_validates() {
        let catalog = ActionCatalog::from_table(&default_action_table(), true).unwrap();
        assert_eq!(catalog.len(), 10);

        let irrigate = catalog.lookup("irrigate").unwrap();
        assert_eq!(irrigate.name, "Irrigate Field");
        assert_eq!(irrigate.delta_for(SoilAttribute::Humidity), Some(10.0));
        assert_eq!(irrigate.delta_for(SoilAttribute::N), None);
    }

    #[test]
    fn test_unknown_action() {
        let catalog = ActionCatalog::from_table(&default_action_table(), true).unwrap();
        let err = catalog.lookup("harvest").unwrap_err();
        assert_eq!(err, FarmError::UnknownAction { action: "harvest".to_string() });
    }

    #[test]
    fn test_implicit_attribute_policy() {
        let table = default_action_table();

        let lenient = ActionCatalog::from_table(&table, true).unwrap();
        let spray = lenient.lookup("insecticide").unwrap();
        assert_eq!(spray.deltas[0].key, AttributeKey::Extra("pest_pressure".to_string()));

        let strict = ActionCatalog::from_table(&table, false).unwrap_err();
        assert!(matches!(
            strict,
            FarmError::UnknownAttribute { attribute, .. } if attribute == "pest_pressure"
        ));
    }

    #[test]
    fn test_rejects_malformed_deltas() {
        let mut table = ActionTable::new();
        table.insert(
            "flood".to_string(),
            ActionSpec {
                name: "Flood".to_string(),
                effect: [("humidity".to_string(), json!("lots"))].into_iter().collect(),
            },
        );
        assert!(matches!(
            ActionCatalog::from_table(&table, true),
            Err(FarmError::MalformedAction { .. })
        ));

        let mut table = ActionTable::new();
        table.insert("dust".to_string(), ActionSpec::new("Dust", &[("N", 2.5)]));
        assert!(matches!(
            ActionCatalog::from_table(&table, true),
            Err(FarmError::MalformedAction { .. })
        ));
    }

    #[test]
    fn test_parse_json_table() {
        let table: ActionTable = serde_json::from_value(json!({
            "irrigate": { "name": "Irrigate Field", "effect": { "humidity": 10.0 } },
            "fallow": { "name": "Leave Fallow" }
        }))
        .unwrap();

        let catalog = ActionCatalog::from_table(&table, false).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["fallow", "irrigate"]);
        assert!(catalog.lookup("fallow").unwrap().deltas.is_empty());
    }
}
