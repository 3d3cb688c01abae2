//! Utility modules
//!
//! - Columns: case-insensitive DataFrame column resolution and typed access

pub mod columns;

pub use columns::{f64_column, resolve_columns, str_column};
