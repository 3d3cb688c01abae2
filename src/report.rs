//! Model evaluation report
//!
//! Classifies every historical record by its nearest centroid and compares the
//! prediction to the record's own label: per-crop precision, recall and F1,
//! plus overall accuracy. Records labelled with a crop that has no profile are
//! skipped.

use crate::data::CropRecord;
use crate::error::Result;
use crate::suitability::SuitabilityEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Records carrying this label
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Canonical crop order
    pub labels: Vec<LabelMetrics>,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    /// Records evaluated
    pub total: usize,
}

impl ClassificationReport {
    pub fn evaluate(engine: &SuitabilityEngine<'_>, records: &[CropRecord]) -> Result<Self> {
        let store = engine.store();
        let n_labels = store.len();

        // (actual, predicted) positions in canonical order
        let pairs = records
            .par_iter()
            .filter_map(|record| store.position(&record.label).map(|actual| (record, actual)))
            .map(|(record, actual)| {
                let ranking = engine.rank(&record.values)?;
                let predicted = store
                    .position(&ranking[0].label)
                    .unwrap_or(actual);
                Ok((actual, predicted))
            })
            .collect::<Result<Vec<(usize, usize)>>>()?;

        let mut true_pos = vec![0usize; n_labels];
        let mut predicted_count = vec![0usize; n_labels];
        let mut support = vec![0usize; n_labels];

        for &(actual, predicted) in &pairs {
            support[actual] += 1;
            predicted_count[predicted] += 1;
            if actual == predicted {
                true_pos[actual] += 1;
            }
        }

        let labels: Vec<LabelMetrics> = store
            .labels()
            .enumerate()
            .map(|(i, label)| {
                let precision = ratio(true_pos[i], predicted_count[i]);
                let recall = ratio(true_pos[i], support[i]);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                LabelMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: support[i],
                }
            })
            .collect();

        let correct: usize = true_pos.iter().sum();
        let mean = |f: fn(&LabelMetrics) -> f64| {
            if labels.is_empty() {
                0.0
            } else {
                labels.iter().map(f).sum::<f64>() / labels.len() as f64
            }
        };

        let report = Self {
            accuracy: ratio(correct, pairs.len()),
            macro_precision: mean(|m| m.precision),
            macro_recall: mean(|m| m.recall),
            macro_f1: mean(|m| m.f1),
            total: pairs.len(),
            labels,
        };

        tracing::info!("Evaluated {} records: accuracy {:.3}", report.total, report.accuracy);

        Ok(report)
    }

    pub fn metrics_for(&self, label: &str) -> Option<&LabelMetrics> {
        self.labels.iter().find(|m| m.label == label)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.labels {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        write!(
            f,
            "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", self.macro_precision, self.macro_recall, self.macro_f1, self.total
        )
    }
}
