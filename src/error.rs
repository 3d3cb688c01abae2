//! Error types for the crop advisor core
//!
//! Every fallible core operation returns [`FarmError`] through the [`Result`]
//! alias. File and CSV boundaries wrap these into `anyhow::Error` with context,
//! so callers there can still `downcast_ref::<FarmError>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FarmError {
    /// Action name not present in the catalog
    #[error("unknown action: '{action}'")]
    UnknownAction { action: String },

    /// Action effect names an attribute the cell does not have
    /// (only raised when implicit attributes are disabled)
    #[error("action '{action}' references unknown attribute '{attribute}'")]
    UnknownAttribute { action: String, attribute: String },

    /// Action table entry failed validation at load time
    #[error("malformed action '{action}': {reason}")]
    MalformedAction { action: String, reason: String },

    /// Query vector does not have one slot per canonical attribute
    #[error("query vector has {actual} values, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Allow-listed crop has no rows in the historical dataset
    #[error("no historical records for crop '{label}'")]
    EmptyDataset { label: String },

    /// Gold conversion on an exact profile match (distance 0)
    #[error("perfect match for '{label}': gold value undefined at distance 0")]
    DivisionByZero { label: String },

    #[error("cell ({row}, {col}) -> index {index} out of range for grid of {len} cells")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        index: usize,
        len: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Bounds policy rejected an attribute update
    #[error("{attribute} = {value} outside [{min}, {max}]")]
    OutOfBounds {
        attribute: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("missing column '{column}' (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("insufficient gold: need {needed}, have {available}")]
    InsufficientGold { needed: u64, available: u64 },
}

pub type Result<T> = std::result::Result<T, FarmError>;
