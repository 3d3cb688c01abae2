//! Crop Advisor
//!
//! Core of a soil-farming game:
//! - `cell` / `actions`: soil cells mutated by catalogued player actions
//! - `grid` / `state`: coordinate-addressable cells and the explicit game state
//! - `data` / `profiles`: historical dataset loading (Polars) and crop centroids
//! - `suitability`: nearest-centroid crop ranking and gold valuation
//! - `report`: classification quality of the centroid model on its own data
//!
//! The core does no I/O beyond startup loading and holds no global state.

pub mod actions;
pub mod attributes;
pub mod cell;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod profiles;
pub mod report;
pub mod state;
pub mod suitability;
pub mod utils;

// Re-export commonly used types
pub use actions::{default_action_table, ActionCatalog, ActionEffect, ActionSpec, ActionTable};
pub use attributes::{AttributeBounds, AttributeVector, BoundsPolicy, SoilAttribute};
pub use cell::SoilCell;
pub use config::GameConfig;
pub use data::{CropRecord, HistoricalDataset};
pub use error::{FarmError, Result};
pub use grid::GameGrid;
pub use profiles::{CropProfile, CropProfileStore};
pub use report::ClassificationReport;
pub use state::{GameClock, GameState};
pub use suitability::{CropScore, GoldScale, SuitabilityEngine, TopN};
