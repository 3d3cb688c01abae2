//! Historical Dataset Loading
//!
//! Loads labelled soil/climate records with Polars. One row per observation:
//! the seven attribute columns (any case, any order) plus a `label` column
//! naming the crop. Values are reordered into the canonical query order at load
//! time, so downstream code never sees the file's column order.

use crate::attributes::{AttributeVector, SoilAttribute, ATTRIBUTE_COUNT};
use crate::utils::{f64_column, resolve_columns, str_column};
use anyhow::{anyhow, bail, Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the crop label column
pub const LABEL_COLUMN: &str = "label";

/// One labelled historical observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub label: String,
    /// Canonical query order: N, P, K, temperature, humidity, pH, rainfall
    pub values: AttributeVector,
}

impl CropRecord {
    pub fn new(label: &str, values: AttributeVector) -> Self {
        Self {
            label: label.to_string(),
            values,
        }
    }
}

/// All historical records, in file order
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    records: Vec<CropRecord>,
}

impl HistoricalDataset {
    pub fn from_records(records: Vec<CropRecord>) -> Self {
        Self { records }
    }

    /// Load from a CSV file with a header row
    pub fn load_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load historical dataset: {:?}", path))?;

        let dataset = Self::from_dataframe(&df)
            .with_context(|| format!("Invalid historical dataset: {:?}", path))?;

        tracing::info!("Loaded {} historical records from {:?}", dataset.len(), path);

        Ok(dataset)
    }

    /// Extract records from an in-memory frame
    ///
    /// Fails on a missing column (typed `FarmError::MissingColumn` inside the
    /// anyhow chain), on any null cell, and on NaN or infinite readings.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut expected: Vec<&str> = SoilAttribute::QUERY_ORDER
            .iter()
            .map(|a| a.column_name())
            .collect();
        expected.push(LABEL_COLUMN);

        let columns = resolve_columns(df, &expected)?;

        let label_column = &columns[ATTRIBUTE_COUNT];
        let labels = str_column(df, label_column)
            .with_context(|| format!("Column '{}' cannot be read as text", label_column))?;

        let attribute_columns = columns[..ATTRIBUTE_COUNT]
            .iter()
            .map(|name| {
                f64_column(df, name).with_context(|| format!("Column '{}' is not numeric", name))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let label = labels
                .get(idx)
                .ok_or_else(|| anyhow!("Row {}: missing label", idx))?;

            let mut values = [0.0; ATTRIBUTE_COUNT];
            for (slot, series) in attribute_columns.iter().enumerate() {
                let value = series.get(idx).ok_or_else(|| {
                    anyhow!("Row {}: missing value for '{}'", idx, columns[slot])
                })?;
                if !value.is_finite() {
                    bail!("Row {}: non-finite value {} for '{}'", idx, value, columns[slot]);
                }
                values[slot] = value;
            }

            records.push(CropRecord::new(label, values));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CropRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
