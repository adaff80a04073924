//! Upload slot addressing
//!
//! A slot is the unit that holds at most one uploaded file. It is identified
//! by (feature, version, section, occurrence) where occurrence tells apart
//! repeated section names ("Verse" twice in one song). The reference mix is
//! the only slot without a section.
//!
//! [`SlotKey`] is a structured value: equality and hashing compare the
//! components field by field, so no choice of names can make two different
//! slots collide.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::features::{FeatureKey, VersionCount, VersionLabel, VersionPlan};
use crate::song::{SectionName, SongSpec};
use crate::upload_policy::AudioFormat;
use crate::{Error, Result};

/// Position of a section within a song: its name plus which repeat it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionSlot {
    pub name: SectionName,
    /// 0 for the first position with this name, 1 for the second, ...
    pub occurrence: usize,
}

/// Canonical identifier of one upload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub feature: FeatureKey,
    pub version: VersionLabel,
    /// `None` only for the reference mix
    pub section: Option<SectionSlot>,
}

impl SlotKey {
    /// Combine the four slot components into a key
    ///
    /// Total and deterministic. Whether the slot is addressable under the
    /// current song is a separate question answered by [`SlotLayout`].
    pub fn derive(
        feature: FeatureKey,
        version: VersionLabel,
        section: SectionName,
        occurrence: usize,
    ) -> Self {
        Self {
            feature,
            version,
            section: Some(SectionSlot {
                name: section,
                occurrence,
            }),
        }
    }

    /// The single reference-mix slot
    pub fn reference() -> Self {
        Self {
            feature: FeatureKey::Reference,
            version: VersionLabel::Main,
            section: None,
        }
    }

    /// Spatialization sub-mix slot for one section
    pub fn spatial(feature: FeatureKey, section: SectionName, occurrence: usize) -> Result<Self> {
        match feature {
            FeatureKey::SpatialNarrow | FeatureKey::SpatialWide => {
                Ok(Self::derive(feature, VersionLabel::Main, section, occurrence))
            }
            other => Err(Error::InvalidInput(format!(
                "{} is not a spatialization mix",
                other
            ))),
        }
    }

    /// Opaque, stable identifier for use outside the process
    ///
    /// SHA-256 over a length-prefixed encoding of the components, as 64 hex
    /// characters.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let mut push = |part: &str| {
            hasher.update((part.len() as u64).to_be_bytes());
            hasher.update(part.as_bytes());
        };

        push(self.feature.as_str());
        push(&self.version.to_string());
        match &self.section {
            Some(slot) => {
                push(slot.name.display_name());
                push(&slot.occurrence.to_string());
            }
            None => push(""),
        }

        format!("{:x}", hasher.finalize())
    }

    /// File name following the upload guideline `[Feature]_[Section][n]_[Version].ext`
    ///
    /// `n` is the 1-based occurrence, so the second verse of the vocals "A"
    /// take becomes `Vocals_Verse2_A.wav`.
    pub fn suggested_filename(&self, format: AudioFormat) -> String {
        let feature = self.feature.definition().file_stem;
        match &self.section {
            Some(slot) => format!(
                "{}_{}{}_{}.{}",
                feature,
                slot.name.display_name().replace('-', ""),
                slot.occurrence + 1,
                self.version,
                format.extension()
            ),
            None => format!("{}_{}.{}", feature, self.version, format.extension()),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(slot) => write!(
                f,
                "{}/{}/{}#{}",
                self.feature, self.version, slot.name, slot.occurrence
            ),
            None => write!(f, "{}/{}", self.feature, self.version),
        }
    }
}

/// Build a sectioned slot key from text components
///
/// For collaborators that carry form values as strings. Unknown feature,
/// version or section names are reported as `Error::InvalidInput`, as are
/// combinations no layout can ever hold: a version other than "Main" on a
/// spatialization mix, or a section on the reference mix (see
/// [`derive_reference_key`]).
pub fn derive_key(
    feature_key: &str,
    version_label: &str,
    section_name: &str,
    occurrence_index: usize,
) -> Result<SlotKey> {
    let feature: FeatureKey = feature_key.parse()?;
    let version: VersionLabel = version_label.parse()?;
    let section: SectionName = section_name.parse()?;
    if !feature.is_sectioned() {
        return Err(Error::InvalidInput(format!(
            "{} is a whole-song slot and takes no section",
            feature
        )));
    }
    check_fixed_version(feature, version)?;
    Ok(SlotKey::derive(feature, version, section, occurrence_index))
}

/// Build the reference-mix key from text components
pub fn derive_reference_key(feature_key: &str, version_label: &str) -> Result<SlotKey> {
    let feature: FeatureKey = feature_key.parse()?;
    let version: VersionLabel = version_label.parse()?;
    if feature.is_sectioned() {
        return Err(Error::InvalidInput(format!(
            "{} takes one file per section",
            feature
        )));
    }
    check_fixed_version(feature, version)?;
    Ok(SlotKey::reference())
}

fn check_fixed_version(feature: FeatureKey, version: VersionLabel) -> Result<()> {
    if !feature.is_versioned() && version != VersionLabel::Main {
        return Err(Error::InvalidInput(format!(
            "{} has a single Main version, got {}",
            feature, version
        )));
    }
    Ok(())
}

/// Addressable slot space for one song and version plan
///
/// Built from the *current* song structure and version counts. Membership
/// checks and per-feature denominators are O(1) after construction, which
/// keeps registry summaries proportional to the number of stored records.
#[derive(Debug, Clone)]
pub struct SlotLayout {
    section_slots: Vec<SectionSlot>,
    occurrences: HashMap<SectionName, usize>,
    versions: HashMap<FeatureKey, VersionCount>,
}

impl SlotLayout {
    pub fn new(song: &SongSpec, plan: &VersionPlan) -> Self {
        let section_slots = song
            .section_slots()
            .into_iter()
            .map(|(name, occurrence)| SectionSlot { name, occurrence })
            .collect();
        let versions = FeatureKey::all_variants()
            .iter()
            .map(|&feature| (feature, plan.count(feature)))
            .collect();

        Self {
            section_slots,
            occurrences: song.occurrence_counts(),
            versions,
        }
    }

    /// Section positions in song order
    pub fn section_slots(&self) -> &[SectionSlot] {
        &self.section_slots
    }

    /// Current version count for `feature`
    pub fn version_count(&self, feature: FeatureKey) -> VersionCount {
        self.versions.get(&feature).copied().unwrap_or_default()
    }

    /// Number of slots `feature` can address right now
    pub fn addressable(&self, feature: FeatureKey) -> usize {
        if !feature.is_sectioned() {
            return 1;
        }
        usize::from(self.version_count(feature).get()) * self.section_slots.len()
    }

    /// Total addressable slots across all features
    pub fn total_addressable(&self) -> usize {
        FeatureKey::all_variants()
            .iter()
            .map(|&f| self.addressable(f))
            .sum()
    }

    /// Whether `key` names a slot that exists under the current layout
    pub fn contains(&self, key: &SlotKey) -> bool {
        if !self.version_count(key.feature).contains(key.version) {
            return false;
        }
        match (key.feature.is_sectioned(), &key.section) {
            (true, Some(slot)) => self
                .occurrences
                .get(&slot.name)
                .is_some_and(|&count| slot.occurrence < count),
            (false, None) => true,
            _ => false,
        }
    }

    /// Every addressable slot, in display order
    ///
    /// Features in dashboard order, then versions in tab order, then
    /// sections in song order. The reference mix comes last.
    pub fn slots(&self) -> Vec<SlotKey> {
        let mut slots = Vec::with_capacity(self.total_addressable());
        for &feature in FeatureKey::all_variants() {
            if !feature.is_sectioned() {
                slots.push(SlotKey::reference());
                continue;
            }
            for version in self.version_count(feature).labels() {
                for slot in &self.section_slots {
                    slots.push(SlotKey {
                        feature,
                        version,
                        section: Some(*slot),
                    });
                }
            }
        }
        slots
    }
}
