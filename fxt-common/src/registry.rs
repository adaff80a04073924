//! Per-session upload slot registry
//!
//! The registry maps each [`SlotKey`] to at most one [`UploadRecord`].
//! A later upload to the same slot replaces the earlier one; the only
//! deletion is [`SlotRegistry::clear`].
//!
//! Completeness denominators are not stored. [`SlotRegistry::summary`] takes
//! the current [`SlotLayout`] each time, so editing the song structure or a
//! version count changes the report without touching stored records.
//! Records whose slot no longer exists under the layout ("orphaned") stay
//! retrievable through [`SlotRegistry::get`] but are left out of the
//! per-feature occupied counts.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::features::FeatureKey;
use crate::slots::{SlotKey, SlotLayout};
use crate::{Error, Result};

/// Opaque handle to the raw file payload held by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadRef(pub Uuid);

impl PayloadRef {
    /// Fresh random handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Metadata for the file currently held by a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub filename: String,
    pub size_bytes: u64,
    pub payload: Option<PayloadRef>,
    pub uploaded_at: DateTime<Utc>,
}

/// Occupancy of one feature under the current layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCompleteness {
    pub occupied: usize,
    pub addressable: usize,
}

impl FeatureCompleteness {
    /// Fraction of addressable slots holding a file, in [0.0, 1.0]
    pub fn ratio(&self) -> f64 {
        if self.addressable == 0 {
            0.0
        } else {
            self.occupied as f64 / self.addressable as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.addressable > 0 && self.occupied == self.addressable
    }
}

/// Aggregate view over every slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// All stored records, orphaned ones included
    pub total_count: usize,
    /// One entry per feature, including features with nothing uploaded
    pub per_feature: BTreeMap<FeatureKey, FeatureCompleteness>,
    pub has_uploads: bool,
    /// Records whose slot is outside the current layout
    pub orphaned_count: usize,
    pub total_bytes: u64,
}

/// Slot-to-record store for one editing session
#[derive(Debug, Clone, Default)]
pub struct SlotRegistry {
    records: HashMap<SlotKey, UploadRecord>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store upload metadata at `key`, replacing any previous record
    ///
    /// Returns `true` when an earlier record was replaced. An empty (or
    /// whitespace-only) filename is rejected and leaves the registry unchanged.
    pub fn record(&mut self, key: SlotKey, name: &str, size_bytes: u64) -> Result<bool> {
        self.insert(key, name, size_bytes, None)
    }

    /// Like [`record`](Self::record), also keeping a payload handle
    pub fn record_with_payload(
        &mut self,
        key: SlotKey,
        name: &str,
        size_bytes: u64,
        payload: PayloadRef,
    ) -> Result<bool> {
        self.insert(key, name, size_bytes, Some(payload))
    }

    fn insert(
        &mut self,
        key: SlotKey,
        name: &str,
        size_bytes: u64,
        payload: Option<PayloadRef>,
    ) -> Result<bool> {
        if name.trim().is_empty() {
            warn!("Rejected record for slot {}: empty filename", key);
            return Err(Error::InvalidInput(format!(
                "Filename for slot {} must not be empty",
                key
            )));
        }

        let record = UploadRecord {
            filename: name.to_string(),
            size_bytes,
            payload,
            uploaded_at: Utc::now(),
        };
        let replaced = self.records.insert(key, record).is_some();

        debug!(
            slot = %key,
            filename = name,
            size_bytes,
            replaced,
            "Recorded upload"
        );
        Ok(replaced)
    }

    /// Record currently held by `key`, if any
    pub fn get(&self, key: &SlotKey) -> Option<&UploadRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All stored records, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &UploadRecord)> {
        self.records.iter()
    }

    /// Keys of records outside `layout`, sorted
    pub fn orphaned(&self, layout: &SlotLayout) -> Vec<SlotKey> {
        let mut keys: Vec<SlotKey> = self
            .records
            .keys()
            .filter(|k| !layout.contains(k))
            .copied()
            .collect();
        keys.sort();
        keys
    }

    /// Aggregate report against the current layout
    ///
    /// Cost is linear in the number of stored records plus the (fixed)
    /// number of features.
    pub fn summary(&self, layout: &SlotLayout) -> AggregateReport {
        let mut per_feature: BTreeMap<FeatureKey, FeatureCompleteness> = FeatureKey::all_variants()
            .iter()
            .map(|&feature| {
                (
                    feature,
                    FeatureCompleteness {
                        occupied: 0,
                        addressable: layout.addressable(feature),
                    },
                )
            })
            .collect();

        let mut orphaned_count = 0;
        let mut total_bytes: u64 = 0;
        for (key, record) in &self.records {
            total_bytes = total_bytes.saturating_add(record.size_bytes);
            if !layout.contains(key) {
                orphaned_count += 1;
                continue;
            }
            if let Some(entry) = per_feature.get_mut(&key.feature) {
                entry.occupied += 1;
            }
        }

        AggregateReport {
            total_count: self.records.len(),
            per_feature,
            has_uploads: !self.records.is_empty(),
            orphaned_count,
            total_bytes,
        }
    }

    /// Remove every record; returns how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        info!("Cleared slot registry ({} records removed)", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{VersionLabel, VersionPlan};
    use crate::song::{SectionName, SongSpec};

    fn verse_key(feature: FeatureKey) -> SlotKey {
        SlotKey::derive(feature, VersionLabel::Main, SectionName::Verse, 0)
    }

    #[test]
    fn test_get_on_empty_registry_is_absent() {
        let registry = SlotRegistry::new();
        assert!(registry.get(&verse_key(FeatureKey::Vocals)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_reports_replacement() {
        let mut registry = SlotRegistry::new();
        let key = verse_key(FeatureKey::Groove);
        assert!(!registry.record(key, "a.wav", 100).unwrap());
        assert!(registry.record(key, "b.wav", 50).unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_filename_leaves_state_unchanged() {
        let mut registry = SlotRegistry::new();
        let key = verse_key(FeatureKey::Solo);
        registry.record(key, "keep.wav", 10).unwrap();

        assert!(matches!(registry.record(key, "", 99), Err(Error::InvalidInput(_))));
        assert!(matches!(registry.record(key, "   ", 99), Err(Error::InvalidInput(_))));

        let record = registry.get(&key).unwrap();
        assert_eq!(record.filename, "keep.wav");
        assert_eq!(record.size_bytes, 10);
    }

    #[test]
    fn test_zero_size_is_accepted() {
        let mut registry = SlotRegistry::new();
        let key = verse_key(FeatureKey::Vocals);
        registry.record(key, "silence.wav", 0).unwrap();
        assert_eq!(registry.get(&key).unwrap().size_bytes, 0);
    }

    #[test]
    fn test_payload_handle_is_kept() {
        let mut registry = SlotRegistry::new();
        let payload = PayloadRef::generate();
        registry
            .record_with_payload(SlotKey::reference(), "ref.mp3", 7, payload)
            .unwrap();
        assert_eq!(registry.get(&SlotKey::reference()).unwrap().payload, Some(payload));
    }

    #[test]
    fn test_summary_counts_bytes_and_orphans() {
        let mut registry = SlotRegistry::new();
        let song = SongSpec::default();
        let plan = VersionPlan::default();
        let layout = SlotLayout::new(&song, &plan);

        registry.record(verse_key(FeatureKey::Vocals), "v.wav", 100).unwrap();
        // Bridge is not part of the default song
        registry
            .record(
                SlotKey::derive(FeatureKey::Vocals, VersionLabel::Main, SectionName::Bridge, 0),
                "b.wav",
                50,
            )
            .unwrap();

        let report = registry.summary(&layout);
        assert_eq!(report.total_count, 2);
        assert_eq!(report.orphaned_count, 1);
        assert_eq!(report.total_bytes, 150);
        assert_eq!(report.per_feature[&FeatureKey::Vocals].occupied, 1);
        assert_eq!(registry.orphaned(&layout).len(), 1);
    }

    #[test]
    fn test_completeness_ratio() {
        let half = FeatureCompleteness { occupied: 2, addressable: 4 };
        assert_eq!(half.ratio(), 0.5);
        assert!(!half.is_complete());

        let full = FeatureCompleteness { occupied: 1, addressable: 1 };
        assert!(full.is_complete());

        let none = FeatureCompleteness { occupied: 0, addressable: 0 };
        assert_eq!(none.ratio(), 0.0);
        assert!(!none.is_complete());
    }

    #[test]
    fn test_clear_returns_removed_count() {
        let mut registry = SlotRegistry::new();
        registry.record(verse_key(FeatureKey::Vocals), "v.wav", 1).unwrap();
        registry.record(verse_key(FeatureKey::Groove), "g.wav", 1).unwrap();
        assert_eq!(registry.clear(), 2);
        assert_eq!(registry.clear(), 0);
    }
}
