//! Game Grid - coordinate-addressable soil cells
//!
//! Row-major storage: cell (row, col) lives at `row * width + col`.

use crate::actions::ActionCatalog;
use crate::attributes::BoundsPolicy;
use crate::cell::SoilCell;
use crate::error::{FarmError, Result};
use crate::suitability::{SuitabilityEngine, TopN};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Deserialization goes through `from_cells`, so a saved grid is held to the
/// same shape checks as one built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct GameGrid {
    width: usize,
    height: usize,
    cells: Vec<SoilCell>,
}

#[derive(Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    cells: Vec<SoilCell>,
}

impl TryFrom<RawGrid> for GameGrid {
    type Error = FarmError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        GameGrid::from_cells(raw.width, raw.height, raw.cells)
    }
}

/// Recommendation for one cell of a grid-wide pass
#[derive(Debug, Clone)]
pub struct CellRecommendation {
    pub row: usize,
    pub col: usize,
    pub result: Result<TopN>,
}

impl GameGrid {
    /// Grid of `width * height` copies of `initial`
    pub fn new(width: usize, height: usize, initial: SoilCell) -> Result<Self> {
        let len = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![initial; len],
        })
    }

    /// Wrap existing cells laid out row-major
    pub fn from_cells(width: usize, height: usize, cells: Vec<SoilCell>) -> Result<Self> {
        let len = checked_area(width, height)?;
        if cells.len() != len {
            return Err(FarmError::InvalidArgument(format!(
                "{}x{} grid needs {} cells, got {}",
                width,
                height,
                len,
                cells.len()
            )));
        }
        Ok(Self { width, height, cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[SoilCell] {
        &self.cells
    }

    /// Linear index of (row, col)
    ///
    /// A column past the row width is rejected even when the linear index
    /// would land inside storage, so no coordinate aliases another row.
    pub fn index_of(&self, row: usize, col: usize) -> Result<usize> {
        let index = row
            .checked_mul(self.width)
            .and_then(|base| base.checked_add(col))
            .unwrap_or(usize::MAX);

        if col >= self.width || index >= self.cells.len() {
            return Err(FarmError::IndexOutOfRange {
                row,
                col,
                index,
                len: self.cells.len(),
            });
        }
        Ok(index)
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<&SoilCell> {
        let index = self.index_of(row, col)?;
        Ok(&self.cells[index])
    }

    pub fn cell_at_mut(&mut self, row: usize, col: usize) -> Result<&mut SoilCell> {
        let index = self.index_of(row, col)?;
        Ok(&mut self.cells[index])
    }

    /// Replace a cell wholesale
    pub fn set_cell_at(&mut self, row: usize, col: usize, cell: SoilCell) -> Result<()> {
        *self.cell_at_mut(row, col)? = cell;
        Ok(())
    }

    /// Apply a catalog action to one cell, returning the action's display name
    pub fn apply_action_at<'c>(
        &mut self,
        row: usize,
        col: usize,
        action: &str,
        catalog: &'c ActionCatalog,
        bounds: &impl BoundsPolicy,
    ) -> Result<&'c str> {
        self.cell_at_mut(row, col)?.apply_action(action, catalog, bounds)
    }

    /// (row, col) of every cell in storage order
    pub fn iter_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.cells.len()).map(move |i| (i / self.width, i % self.width))
    }

    /// Rank crops for every cell in parallel
    ///
    /// Results come back in storage order. Per-cell failures (for example an
    /// exact match under gold pricing) do not stop the pass.
    pub fn recommend_all(
        &self,
        engine: &SuitabilityEngine<'_>,
        n: usize,
        predict_gold: bool,
    ) -> Vec<CellRecommendation> {
        self.cells
            .par_iter()
            .enumerate()
            .map(|(i, cell)| CellRecommendation {
                row: i / self.width,
                col: i % self.width,
                result: engine.recommend(cell, n, predict_gold),
            })
            .collect()
    }
}

fn checked_area(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(FarmError::InvalidArgument(format!(
            "grid dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    width.checked_mul(height).ok_or_else(|| {
        FarmError::InvalidArgument(format!("grid {}x{} is too large", width, height))
    })
}
