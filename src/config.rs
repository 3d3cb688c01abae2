//! Game configuration
//!
//! Loaded once at startup from a JSON file. Every field has a default, so a
//! config file only needs the values it changes.
//!
//! ## Example
//!
//! ```json
//! {
//!   "alpha": 1000.0,
//!   "goldunit": 1.0,
//!   "crops_used": ["rice", "maize", "lentil"],
//!   "grid_width": 8,
//!   "grid_height": 8,
//!   "bounds": "clamp",
//!   "dataset_path": "data/crop_recommendation_sample.csv",
//!   "actions": {
//!     "irrigate": { "name": "Irrigate Field", "effect": { "humidity": 10.0 } }
//!   }
//! }
//! ```

use crate::actions::{default_action_table, ActionCatalog, ActionTable};
use crate::attributes::AttributeBounds;
use crate::cell::SoilCell;
use crate::data::HistoricalDataset;
use crate::error::{FarmError, Result};
use crate::grid::GameGrid;
use crate::profiles::CropProfileStore;
use crate::state::GameState;
use crate::suitability::GoldScale;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ALPHA: f64 = 1000.0;
pub const DEFAULT_GOLDUNIT: f64 = 1.0;
pub const DEFAULT_GRID_WIDTH: usize = 8;

/// Crops profiled by default, in canonical order
pub const DEFAULT_CROPS: &[&str] = &[
    "rice",
    "maize",
    "chickpea",
    "kidneybeans",
    "lentil",
    "cotton",
    "jute",
    "coffee",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub alpha: f64,
    pub goldunit: f64,
    /// Allow-list of crops; order breaks ranking ties
    pub crops_used: Vec<String>,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Actions may introduce attributes beyond the seven soil attributes
    pub allow_implicit_attributes: bool,
    pub bounds: AttributeBounds,
    /// Relative paths resolve against the config file's directory
    pub dataset_path: PathBuf,
    pub location: String,
    pub starting_gold: u64,
    pub actions: ActionTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            goldunit: DEFAULT_GOLDUNIT,
            crops_used: DEFAULT_CROPS.iter().map(|s| s.to_string()).collect(),
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_WIDTH,
            allow_implicit_attributes: true,
            bounds: AttributeBounds::Unbounded,
            dataset_path: PathBuf::from("data/crop_recommendation_sample.csv"),
            location: "Farm".to_string(),
            starting_gold: 0,
            actions: default_action_table(),
        }
    }
}

impl GameConfig {
    /// Load, resolve relative paths and validate
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: GameConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        if config.dataset_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.dataset_path = dir.join(&config.dataset_path);
            }
        }

        config
            .validate()
            .with_context(|| format!("Invalid config: {:?}", path))?;

        tracing::info!(
            "Loaded config: {} crops, {}x{} grid, {} actions",
            config.crops_used.len(),
            config.grid_width,
            config.grid_height,
            config.actions.len()
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.gold_scale()?;

        if self.crops_used.is_empty() {
            return Err(FarmError::InvalidArgument("crops_used is empty".to_string()));
        }
        if let Some(dup) = self
            .crops_used
            .iter()
            .enumerate()
            .find(|(i, c)| self.crops_used[..*i].contains(*c))
            .map(|(_, c)| c)
        {
            return Err(FarmError::InvalidArgument(format!(
                "crops_used lists '{}' twice",
                dup
            )));
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(FarmError::InvalidArgument(format!(
                "grid dimensions must be positive, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        self.action_catalog()?;
        Ok(())
    }

    pub fn gold_scale(&self) -> Result<GoldScale> {
        GoldScale::new(self.alpha, self.goldunit)
    }

    pub fn action_catalog(&self) -> Result<ActionCatalog> {
        ActionCatalog::from_table(&self.actions, self.allow_implicit_attributes)
    }

    /// Load the historical dataset and build the allow-listed profiles
    pub fn build_profiles(&self) -> anyhow::Result<CropProfileStore> {
        let dataset = HistoricalDataset::load_csv(&self.dataset_path)?;
        let store = CropProfileStore::build(dataset.records(), &self.crops_used).with_context(
            || format!("Failed to build crop profiles from {:?}", self.dataset_path),
        )?;
        Ok(store)
    }

    /// Fresh state with every cell set to `initial`
    pub fn new_state(&self, initial: SoilCell) -> Result<GameState> {
        let grid = GameGrid::new(self.grid_width, self.grid_height, initial)?;
        Ok(GameState::new(&self.location, grid, self.starting_gold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.action_catalog().unwrap().len(), 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_value(json!({
            "alpha": 50.0,
            "crops_used": ["rice", "maize"],
            "bounds": "reject"
        }))
        .unwrap();

        assert_eq!(config.alpha, 50.0);
        assert_eq!(config.goldunit, DEFAULT_GOLDUNIT);
        assert_eq!(config.bounds, AttributeBounds::Reject);
        assert_eq!(config.grid_width, DEFAULT_GRID_WIDTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = GameConfig::default();
        config.alpha = 0.0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.crops_used = vec!["rice".to_string(), "rice".to_string()];
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.grid_height = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.allow_implicit_attributes = false;
        assert!(matches!(config.validate(), Err(FarmError::UnknownAttribute { .. })));
    }

    #[test]
    fn test_new_state() {
        let config = GameConfig::default();
        let state = config.new_state(SoilCell::default()).unwrap();
        assert_eq!(state.grid.len(), 64);
        assert_eq!(state.location, "Farm");
    }
}
