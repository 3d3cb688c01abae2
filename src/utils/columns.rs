//! DataFrame column resolution with validation
//!
//! Dataset headers vary in case ("N" vs "n", "pH" vs "ph"). These helpers map
//! the expected names onto the actual columns and fail fast, naming the missing
//! column, before any row is read.

use crate::error::FarmError;
use polars::prelude::*;

/// Resolve each expected column name to the frame's actual column name
///
/// Matching is ASCII case-insensitive. An exact match wins over a
/// case-insensitive one.
///
/// # Errors
/// `FarmError::MissingColumn` for the first expected column with no match,
/// listing the available columns.
///
/// # Example
/// ```rust,ignore
/// let cols = resolve_columns(&df, &["N", "label"])?;
/// let label_col = df.column(&cols[1])?;
/// ```
pub fn resolve_columns(
    df: &DataFrame,
    expected: &[&str],
) -> std::result::Result<Vec<String>, FarmError> {
    let available: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    expected
        .iter()
        .map(|&name| {
            available
                .iter()
                .find(|actual| actual.as_str() == name)
                .or_else(|| available.iter().find(|actual| actual.eq_ignore_ascii_case(name)))
                .cloned()
                .ok_or_else(|| FarmError::MissingColumn {
                    column: name.to_string(),
                    available: available.clone(),
                })
        })
        .collect()
}

/// Column cast to Float64
pub fn f64_column(df: &DataFrame, name: &str) -> PolarsResult<Float64Chunked> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.clone())
}

/// Column cast to String
pub fn str_column(df: &DataFrame, name: &str) -> PolarsResult<StringChunked> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}
