//! Crop Profile Store
//!
//! Per-crop centroid vectors (mean attribute profile), built once at startup
//! from the historical dataset and restricted to the configured crop list.
//!
//! Profiles are kept in allow-list order. That order is the canonical crop
//! order: ranking ties are broken by it.

use crate::attributes::{AttributeVector, ATTRIBUTE_COUNT};
use crate::data::CropRecord;
use crate::error::{FarmError, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub label: String,
    /// Mean of all records with this label, canonical query order
    pub centroid: AttributeVector,
}

/// Immutable set of crop centroids
#[derive(Debug, Clone)]
pub struct CropProfileStore {
    profiles: Vec<CropProfile>,
    index: FxHashMap<String, usize>,
}

impl CropProfileStore {
    /// Group records by label and average each allow-listed group
    ///
    /// Records with labels outside `allowed_labels` are ignored.
    ///
    /// # Errors
    /// - `InvalidArgument` if `allowed_labels` is empty or has duplicates
    /// - `EmptyDataset` naming the first allow-listed crop with no records
    /// - `InvalidArgument` for a non-finite allow-listed record or centroid
    pub fn build(records: &[CropRecord], allowed_labels: &[String]) -> Result<Self> {
        validate_labels(allowed_labels.iter().map(|s| s.as_str()))?;

        let slots: FxHashMap<&str, usize> = allowed_labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();

        let mut sums = vec![[0.0; ATTRIBUTE_COUNT]; allowed_labels.len()];
        let mut counts = vec![0usize; allowed_labels.len()];

        for record in records {
            if let Some(&slot) = slots.get(record.label.as_str()) {
                if record.values.iter().any(|v| !v.is_finite()) {
                    return Err(FarmError::InvalidArgument(format!(
                        "record for '{}' has non-finite values: {:?}",
                        record.label, record.values
                    )));
                }
                for (acc, value) in sums[slot].iter_mut().zip(record.values.iter()) {
                    *acc += value;
                }
                counts[slot] += 1;
            }
        }

        let mut profiles = Vec::with_capacity(allowed_labels.len());
        for ((label, sum), count) in allowed_labels.iter().zip(sums).zip(counts) {
            if count == 0 {
                return Err(FarmError::EmptyDataset { label: label.clone() });
            }

            let mut centroid = sum;
            for value in centroid.iter_mut() {
                *value /= count as f64;
            }
            // finite records can still sum past f64::MAX
            if centroid.iter().any(|v| !v.is_finite()) {
                return Err(FarmError::InvalidArgument(format!(
                    "centroid for '{}' has non-finite values",
                    label
                )));
            }

            tracing::debug!("Profile '{}': {} records", label, count);
            profiles.push(CropProfile {
                label: label.clone(),
                centroid,
            });
        }

        tracing::info!(
            "Built {} crop profiles from {} records",
            profiles.len(),
            records.len()
        );

        Ok(Self::from_ordered(profiles))
    }

    /// Use precomputed centroids directly, keeping the given order
    pub fn from_profiles<I, S>(profiles: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, AttributeVector)>,
        S: Into<String>,
    {
        let profiles: Vec<CropProfile> = profiles
            .into_iter()
            .map(|(label, centroid)| CropProfile {
                label: label.into(),
                centroid,
            })
            .collect();

        validate_labels(profiles.iter().map(|p| p.label.as_str()))?;

        if let Some(bad) = profiles
            .iter()
            .find(|p| p.centroid.iter().any(|v| !v.is_finite()))
        {
            return Err(FarmError::InvalidArgument(format!(
                "centroid for '{}' has non-finite values",
                bad.label
            )));
        }

        Ok(Self::from_ordered(profiles))
    }

    fn from_ordered(profiles: Vec<CropProfile>) -> Self {
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.label.clone(), i))
            .collect();
        Self { profiles, index }
    }

    /// Profiles in canonical crop order
    pub fn profiles(&self) -> &[CropProfile] {
        &self.profiles
    }

    pub fn get(&self, label: &str) -> Option<&AttributeVector> {
        self.index.get(label).map(|&i| &self.profiles[i].centroid)
    }

    /// Position of a crop in canonical order
    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = FxHashSet::default();
    for label in labels {
        if !seen.insert(label) {
            return Err(FarmError::InvalidArgument(format!("duplicate crop label '{}'", label)));
        }
    }
    if seen.is_empty() {
        return Err(FarmError::InvalidArgument("crop list is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn records() -> Vec<CropRecord> {
        vec![
            CropRecord::new("rice", [80.0, 40.0, 40.0, 24.0, 80.0, 6.4, 200.0]),
            CropRecord::new("maize", [70.0, 50.0, 20.0, 22.0, 60.0, 6.0, 80.0]),
            CropRecord::new("rice", [100.0, 40.0, 40.0, 26.0, 80.0, 6.6, 200.0]),
            CropRecord::new("coffee", [100.0, 30.0, 30.0, 25.0, 60.0, 6.8, 160.0]),
        ]
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_centroids_are_group_means() {
        let store = CropProfileStore::build(&records(), &labels(&["rice", "maize"])).unwrap();

        assert_eq!(store.len(), 2);
        let rice = store.get("rice").unwrap();
        assert_relative_eq!(rice[0], 90.0, epsilon = 1e-9);
        assert_relative_eq!(rice[3], 25.0, epsilon = 1e-9);
        assert_relative_eq!(rice[5], 6.5, epsilon = 1e-9);
        assert_eq!(store.get("maize").unwrap(), &[70.0, 50.0, 20.0, 22.0, 60.0, 6.0, 80.0]);
    }

    #[test]
    fn test_restricted_to_allow_list_in_order() {
        let store = CropProfileStore::build(&records(), &labels(&["maize", "rice"])).unwrap();

        assert!(store.get("coffee").is_none());
        assert_eq!(store.labels().collect::<Vec<_>>(), vec!["maize", "rice"]);
        assert_eq!(store.position("rice"), Some(1));
    }

    #[test]
    fn test_allow_listed_crop_without_rows() {
        let err = CropProfileStore::build(&records(), &labels(&["rice", "mango"])).unwrap_err();
        assert_eq!(err, FarmError::EmptyDataset { label: "mango".to_string() });
    }

    #[test]
    fn test_duplicate_or_empty_allow_list() {
        assert!(matches!(
            CropProfileStore::build(&records(), &labels(&["rice", "rice"])),
            Err(FarmError::InvalidArgument(_))
        ));
        assert!(matches!(
            CropProfileStore::build(&records(), &[]),
            Err(FarmError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_profiles() {
        let store = CropProfileStore::from_profiles([
            ("rice", [90.0, 40.0, 40.0, 25.0, 80.0, 6.5, 200.0]),
            ("wheat", [50.0, 30.0, 20.0, 18.0, 50.0, 6.0, 60.0]),
        ])
        .unwrap();

        assert_eq!(store.labels().collect::<Vec<_>>(), vec!["rice", "wheat"]);
        assert!(CropProfileStore::from_profiles([("bad", [f64::NAN; ATTRIBUTE_COUNT])]).is_err());
    }

    #[test]
    fn test_non_finite_records_rejected() {
        let mut bad = records();
        bad.push(CropRecord::new("maize", [f64::NAN, 50.0, 20.0, 22.0, 60.0, 6.0, 80.0]));

        let err = CropProfileStore::build(&bad, &labels(&["rice", "maize"])).unwrap_err();
        assert!(matches!(&err, FarmError::InvalidArgument(msg) if msg.contains("'maize'")));

        // outside the allow-list the bad row is never read
        assert!(CropProfileStore::build(&bad, &labels(&["rice"])).is_ok());

        let huge = vec![
            CropRecord::new("rice", [f64::MAX, 40.0, 40.0, 24.0, 80.0, 6.4, 200.0]),
            CropRecord::new("rice", [f64::MAX, 40.0, 40.0, 26.0, 80.0, 6.6, 200.0]),
        ];
        let err = CropProfileStore::build(&huge, &labels(&["rice"])).unwrap_err();
        assert!(matches!(&err, FarmError::InvalidArgument(msg) if msg.contains("centroid")));
    }
}
