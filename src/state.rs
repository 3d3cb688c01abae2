//! Game state holder
//!
//! One explicit value owning the clock, the gold balance and the grid. The
//! hosting service owns it and passes it by reference into each request; any
//! locking for concurrent requests is the host's job.

use crate::actions::ActionCatalog;
use crate::attributes::BoundsPolicy;
use crate::error::{FarmError, Result};
use crate::grid::GameGrid;
use serde::{Deserialize, Serialize};

/// Ticks per in-game day
pub const TICKS_PER_DAY: u64 = 24;

/// Monotonic in-game clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameClock {
    tick: u64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.tick
    }

    /// Day number, starting at 0
    pub fn day(&self) -> u64 {
        self.tick / TICKS_PER_DAY
    }

    /// Saturates instead of wrapping
    pub fn advance(&mut self, ticks: u64) -> u64 {
        self.tick = self.tick.saturating_add(ticks);
        self.tick
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub location: String,
    pub clock: GameClock,
    pub gold: u64,
    pub grid: GameGrid,
}

impl GameState {
    pub fn new(location: &str, grid: GameGrid, gold: u64) -> Self {
        Self {
            location: location.to_string(),
            clock: GameClock::new(),
            gold,
            grid,
        }
    }

    /// Apply an action to one cell and return its display name
    pub fn apply_action<'c>(
        &mut self,
        row: usize,
        col: usize,
        action: &str,
        catalog: &'c ActionCatalog,
        bounds: &impl BoundsPolicy,
    ) -> Result<&'c str> {
        let label = self.grid.apply_action_at(row, col, action, catalog, bounds)?;
        tracing::info!(
            "[{} tick {}] {} at ({}, {})",
            self.location,
            self.clock.now(),
            label,
            row,
            col
        );
        Ok(label)
    }

    /// Swap in a whole new state, returning the previous one
    pub fn replace(&mut self, new_state: GameState) -> GameState {
        std::mem::replace(self, new_state)
    }

    pub fn add_gold(&mut self, amount: u64) -> u64 {
        self.gold = self.gold.saturating_add(amount);
        self.gold
    }

    /// Deduct gold; the balance is untouched on failure
    pub fn spend_gold(&mut self, amount: u64) -> Result<u64> {
        self.gold = self
            .gold
            .checked_sub(amount)
            .ok_or(FarmError::InsufficientGold {
                needed: amount,
                available: self.gold,
            })?;
        Ok(self.gold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::default_action_table;
    use crate::attributes::AttributeBounds;
    use crate::cell::SoilCell;

    fn state() -> GameState {
        let grid = GameGrid::new(3, 3, SoilCell::default()).unwrap();
        GameState::new("Punjab", grid, 100)
    }

    #[test]
    fn test_clock_days() {
        let mut clock = GameClock::new();
        assert_eq!(clock.day(), 0);
        clock.advance(23);
        assert_eq!(clock.day(), 0);
        clock.advance(1);
        assert_eq!(clock.day(), 1);
        clock.advance(u64::MAX);
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn test_gold_balance() {
        let mut state = state();
        assert_eq!(state.add_gold(50), 150);
        assert_eq!(state.spend_gold(120).unwrap(), 30);

        let err = state.spend_gold(31).unwrap_err();
        assert_eq!(err, FarmError::InsufficientGold { needed: 31, available: 30 });
        assert_eq!(state.gold, 30);
    }

    #[test]
    fn test_apply_action_through_state() {
        let catalog = ActionCatalog::from_table(&default_action_table(), true).unwrap();
        let mut state = state();

        let label = state
            .apply_action(2, 2, "fertilize_n", &catalog, &AttributeBounds::Unbounded)
            .unwrap();
        assert_eq!(label, "Apply Nitrogen Fertilizer");
        assert_eq!(state.grid.cell_at(2, 2).unwrap().n, 20);

        assert!(matches!(
            state.apply_action(3, 0, "fertilize_n", &catalog, &AttributeBounds::Unbounded),
            Err(FarmError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_replace_and_serde() {
        let mut state = state();
        let mut other = state.clone();
        other.location = "Kerala".to_string();
        other.clock.advance(48);

        let previous = state.replace(other);
        assert_eq!(previous.location, "Punjab");
        assert_eq!(state.clock.day(), 2);

        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_saved_state_with_broken_grid_rejected() {
        let mut json = serde_json::to_value(state()).unwrap();
        json["grid"]["width"] = serde_json::json!(0);
        assert!(serde_json::from_value::<GameState>(json.clone()).is_err());

        json["grid"]["width"] = serde_json::json!(4);
        assert!(serde_json::from_value::<GameState>(json).is_err());
    }
}
