//! Soil attribute model
//!
//! Names the seven soil/climate attributes, fixes the canonical query order used
//! by every distance computation, and provides the pluggable bounds policy
//! applied when actions mutate a cell.
//!
//! Cell field order (N, P, K, rainfall, pH, humidity, temperature) differs from
//! the query order (N, P, K, temperature, humidity, pH, rainfall). Only
//! [`SoilAttribute::QUERY_ORDER`] is used to build query vectors.

use crate::error::{FarmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of attributes in a query vector
pub const ATTRIBUTE_COUNT: usize = 7;

/// Attribute vector in canonical query order
pub type AttributeVector = [f64; ATTRIBUTE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilAttribute {
    N,
    P,
    K,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl SoilAttribute {
    /// Canonical query order: N, P, K, temperature, humidity, pH, rainfall
    pub const QUERY_ORDER: [SoilAttribute; ATTRIBUTE_COUNT] = [
        SoilAttribute::N,
        SoilAttribute::P,
        SoilAttribute::K,
        SoilAttribute::Temperature,
        SoilAttribute::Humidity,
        SoilAttribute::Ph,
        SoilAttribute::Rainfall,
    ];

    /// Slot of this attribute in a query vector
    pub fn query_index(self) -> usize {
        match self {
            SoilAttribute::N => 0,
            SoilAttribute::P => 1,
            SoilAttribute::K => 2,
            SoilAttribute::Temperature => 3,
            SoilAttribute::Humidity => 4,
            SoilAttribute::Ph => 5,
            SoilAttribute::Rainfall => 6,
        }
    }

    /// Column name as it appears in the historical dataset
    pub fn column_name(self) -> &'static str {
        match self {
            SoilAttribute::N => "N",
            SoilAttribute::P => "P",
            SoilAttribute::K => "K",
            SoilAttribute::Temperature => "temperature",
            SoilAttribute::Humidity => "humidity",
            SoilAttribute::Ph => "ph",
            SoilAttribute::Rainfall => "rainfall",
        }
    }

    /// Nutrient levels are whole numbers; climate readings are real-valued
    pub fn is_integral(self) -> bool {
        matches!(self, SoilAttribute::N | SoilAttribute::P | SoilAttribute::K)
    }

    /// Physically meaningful range (min, max)
    pub fn physical_range(self) -> (f64, f64) {
        match self {
            SoilAttribute::N | SoilAttribute::P | SoilAttribute::K => (0.0, f64::INFINITY),
            SoilAttribute::Temperature => (-50.0, 60.0),
            SoilAttribute::Humidity => (0.0, 100.0),
            SoilAttribute::Ph => (0.0, 14.0),
            SoilAttribute::Rainfall => (0.0, f64::INFINITY),
        }
    }
}

impl fmt::Display for SoilAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for SoilAttribute {
    type Err = FarmError;

    /// Case-insensitive: "N", "n", "pH", "ph", "Rainfall" all parse
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "nitrogen" => Ok(SoilAttribute::N),
            "p" | "phosphorus" => Ok(SoilAttribute::P),
            "k" | "potassium" => Ok(SoilAttribute::K),
            "temperature" => Ok(SoilAttribute::Temperature),
            "humidity" => Ok(SoilAttribute::Humidity),
            "ph" => Ok(SoilAttribute::Ph),
            "rainfall" => Ok(SoilAttribute::Rainfall),
            other => Err(FarmError::InvalidArgument(format!(
                "unknown soil attribute '{}'",
                other
            ))),
        }
    }
}

/// Check applied to every attribute value an action produces
///
/// Returns the value to store, or an error to abort the whole action.
pub trait BoundsPolicy {
    fn admit(&self, attribute: SoilAttribute, value: f64) -> Result<f64>;
}

/// Built-in bounds policies, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeBounds {
    /// No checking: values may drift negative or unbounded
    #[default]
    Unbounded,
    /// Clamp into the physical range
    Clamp,
    /// Reject the action with `OutOfBounds`
    Reject,
}

impl BoundsPolicy for AttributeBounds {
    fn admit(&self, attribute: SoilAttribute, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(FarmError::OutOfBounds {
                attribute: attribute.to_string(),
                value,
                min: f64::MIN,
                max: f64::MAX,
            });
        }

        let (min, max) = attribute.physical_range();
        match self {
            AttributeBounds::Unbounded => Ok(value),
            AttributeBounds::Clamp => Ok(value.clamp(min, max)),
            AttributeBounds::Reject if value < min || value > max => Err(FarmError::OutOfBounds {
                attribute: attribute.to_string(),
                value,
                min,
                max,
            }),
            AttributeBounds::Reject => Ok(value),
        }
    }
}
