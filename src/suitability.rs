//! Suitability Engine
//!
//! Nearest-centroid crop recommendation. For a query vector (canonical order
//! N, P, K, temperature, humidity, pH, rainfall) computes the Euclidean
//! distance to every crop centroid, ranks crops by ascending distance, and can
//! convert the best three distances into gold.
//!
//! Gold value: `alpha / distance * goldunit`. Closer crops are worth more; an
//! exact match (distance 0) has no defined value and is reported as
//! `FarmError::DivisionByZero`.

use crate::attributes::ATTRIBUTE_COUNT;
use crate::cell::SoilCell;
use crate::error::{FarmError, Result};
use crate::profiles::CropProfileStore;
use serde::{Deserialize, Serialize};

/// Number of crops priced by a gold prediction
pub const GOLD_TOP_N: usize = 3;

/// Crop label paired with a distance or gold value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropScore {
    pub label: String,
    pub value: f64,
}

/// Result of a ranking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopN {
    /// Selected crops, best first
    pub labels: Vec<String>,
    /// Ordered label → value mapping
    ///
    /// Plain ranking: every profiled crop with its distance, ascending.
    /// Gold ranking: only the selected crops with their gold values.
    pub scores: Vec<CropScore>,
}

impl TopN {
    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.label == label).map(|s| s.value)
    }
}

/// Gold conversion constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldScale {
    pub alpha: f64,
    pub goldunit: f64,
}

impl GoldScale {
    /// Both constants must be finite and strictly positive
    pub fn new(alpha: f64, goldunit: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("goldunit", goldunit)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FarmError::InvalidArgument(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(Self { alpha, goldunit })
    }

    /// Gold for one crop at the given distance
    ///
    /// A tiny distance or large constants can overflow; a result that is not
    /// finite is `InvalidArgument` rather than an infinite price.
    pub fn gold_value(&self, label: &str, distance: f64) -> Result<f64> {
        if distance == 0.0 {
            return Err(FarmError::DivisionByZero {
                label: label.to_string(),
            });
        }
        let value = self.alpha / distance * self.goldunit;
        if !value.is_finite() {
            return Err(FarmError::InvalidArgument(format!(
                "gold for '{}' overflows: alpha {} / distance {} * goldunit {}",
                label, self.alpha, distance, self.goldunit
            )));
        }
        Ok(value)
    }
}

/// Stateless ranking over a shared profile store
#[derive(Debug, Clone, Copy)]
pub struct SuitabilityEngine<'a> {
    store: &'a CropProfileStore,
    gold: GoldScale,
}

impl<'a> SuitabilityEngine<'a> {
    pub fn new(store: &'a CropProfileStore, gold: GoldScale) -> Self {
        Self { store, gold }
    }

    pub fn store(&self) -> &'a CropProfileStore {
        self.store
    }

    pub fn gold_scale(&self) -> GoldScale {
        self.gold
    }

    /// Distance from `query` to every crop centroid, in canonical crop order
    ///
    /// # Errors
    /// - `DimensionMismatch` unless `query` has exactly 7 values
    /// - `InvalidArgument` if any value is NaN or infinite
    pub fn predict(&self, query: &[f64]) -> Result<Vec<CropScore>> {
        if query.len() != ATTRIBUTE_COUNT {
            return Err(FarmError::DimensionMismatch {
                expected: ATTRIBUTE_COUNT,
                actual: query.len(),
            });
        }
        if let Some(bad) = query.iter().find(|v| !v.is_finite()) {
            return Err(FarmError::InvalidArgument(format!(
                "query vector contains non-finite value {}",
                bad
            )));
        }

        Ok(self
            .store
            .profiles()
            .iter()
            .map(|profile| CropScore {
                label: profile.label.clone(),
                value: euclidean_distance(&profile.centroid, query),
            })
            .collect())
    }

    /// Full ranking, ascending distance
    ///
    /// Ties keep canonical crop order, so identical inputs always rank identically.
    pub fn rank(&self, query: &[f64]) -> Result<Vec<CropScore>> {
        let mut scores = self.predict(query)?;
        // predict() yields canonical order; a stable sort keeps it among ties
        scores.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(scores)
    }

    /// Best `n` crops for `query`
    ///
    /// With `predict_gold == false`: the first `n` labels plus the complete
    /// ascending distance ranking.
    ///
    /// With `predict_gold == true`: `n` is ignored; the best three labels and
    /// only their gold values.
    ///
    /// # Errors
    /// - `InvalidArgument` if `n` is 0 or exceeds the number of profiles
    ///   (plain), or fewer than three profiles exist (gold)
    /// - `DivisionByZero` if a gold-priced crop matches exactly
    /// - anything [`predict`](Self::predict) raises
    pub fn top_n(&self, n: usize, query: &[f64], predict_gold: bool) -> Result<TopN> {
        let available = self.store.len();
        let take = if predict_gold { GOLD_TOP_N } else { n };

        if take == 0 || take > available {
            return Err(FarmError::InvalidArgument(format!(
                "cannot select top {} of {} crop profiles",
                take, available
            )));
        }

        let ranking = self.rank(query)?;
        let labels: Vec<String> = ranking[..take].iter().map(|s| s.label.clone()).collect();

        if !predict_gold {
            return Ok(TopN {
                labels,
                scores: ranking,
            });
        }

        let scores = ranking
            .into_iter()
            .take(take)
            .map(|s| -> Result<CropScore> {
                let value = self.gold.gold_value(&s.label, s.value)?;
                Ok(CropScore { label: s.label, value })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TopN { labels, scores })
    }

    /// Rank crops for a cell's current readings
    pub fn recommend(&self, cell: &SoilCell, n: usize, predict_gold: bool) -> Result<TopN> {
        self.top_n(n, &cell.to_query_vector(), predict_gold)
    }
}

/// L2 norm of `a - b`
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
