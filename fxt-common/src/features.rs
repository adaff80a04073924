//! Stem feature catalog and version labelling
//!
//! Five stem features (vocals, groove, solo, instrumental bed, backing vocals)
//! accept 1-5 alternate versions per section. Three additional features never
//! carry versions: the narrow and wide spatialization mixes (one file per
//! section) and the reference mix (one file per song).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Stem category addressed by an upload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    Vocals,
    Groove,
    Solo,
    Instrumental,
    BackingVocals,
    SpatialNarrow,
    SpatialWide,
    Reference,
}

impl FeatureKey {
    /// Every feature in dashboard order
    pub fn all_variants() -> &'static [FeatureKey] {
        &[
            FeatureKey::Vocals,
            FeatureKey::Groove,
            FeatureKey::Solo,
            FeatureKey::Instrumental,
            FeatureKey::BackingVocals,
            FeatureKey::SpatialNarrow,
            FeatureKey::SpatialWide,
            FeatureKey::Reference,
        ]
    }

    /// Short key used in slot identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::Vocals => "vocals",
            FeatureKey::Groove => "groove",
            FeatureKey::Solo => "solo",
            FeatureKey::Instrumental => "instrumental",
            FeatureKey::BackingVocals => "backing_vocals",
            FeatureKey::SpatialNarrow => "spatial_narrow",
            FeatureKey::SpatialWide => "spatial_wide",
            FeatureKey::Reference => "reference",
        }
    }

    /// Whether the artist chooses a version count for this feature
    pub fn is_versioned(&self) -> bool {
        !matches!(
            self,
            FeatureKey::SpatialNarrow | FeatureKey::SpatialWide | FeatureKey::Reference
        )
    }

    /// Whether this feature takes one file per song section
    pub fn is_sectioned(&self) -> bool {
        !matches!(self, FeatureKey::Reference)
    }

    /// Catalog entry for this feature
    pub fn definition(&self) -> &'static FeatureDefinition {
        // Catalog is indexed by declaration order
        &FEATURE_CATALOG[*self as usize]
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FeatureKey::all_variants()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown feature key: {:?}", s)))
    }
}

/// Display metadata for a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDefinition {
    pub key: FeatureKey,
    pub label: &'static str,
    /// Label used in file-naming guidelines ("Vocals_Verse1_A.wav")
    pub file_stem: &'static str,
    pub description: &'static str,
}

/// Process-wide feature catalog, in dashboard order
pub static FEATURE_CATALOG: [FeatureDefinition; 8] = [
    FeatureDefinition {
        key: FeatureKey::Vocals,
        label: "VOCALS (LYRICS)",
        file_stem: "Vocals",
        description: "Main vocal tracks with lyrics - upload alternate lyric versions",
    },
    FeatureDefinition {
        key: FeatureKey::Groove,
        label: "GROOVE",
        file_stem: "Groove",
        description: "Drum patterns and rhythmic elements - upload alternate groove sections",
    },
    FeatureDefinition {
        key: FeatureKey::Solo,
        label: "SOLO",
        file_stem: "Solo",
        description: "Lead instrument solos - upload different takes",
    },
    FeatureDefinition {
        key: FeatureKey::Instrumental,
        label: "INSTRUMENTAL BED",
        file_stem: "Instrumental",
        description: "Harmonic foundation (keys, bass, pads, etc.)",
    },
    FeatureDefinition {
        key: FeatureKey::BackingVocals,
        label: "BACKING VOCALS",
        file_stem: "BackingVocals",
        description: "Background vocals, harmonies, ad-libs",
    },
    FeatureDefinition {
        key: FeatureKey::SpatialNarrow,
        label: "Narrow Mix (60s Vibe)",
        file_stem: "SpatialNarrow",
        description: "Narrow stereo imaging spatial mix",
    },
    FeatureDefinition {
        key: FeatureKey::SpatialWide,
        label: "Wide Mix (Modern)",
        file_stem: "SpatialWide",
        description: "Wide stereo imaging spatial mix",
    },
    FeatureDefinition {
        key: FeatureKey::Reference,
        label: "Full Track Reference",
        file_stem: "Reference",
        description: "Reference mix (optional - helps contributors understand your vision)",
    },
];

/// Stem features that carry versions, in dashboard order
pub fn stem_features() -> impl Iterator<Item = &'static FeatureDefinition> {
    FEATURE_CATALOG.iter().filter(|d| d.key.is_versioned())
}

/// Alternate-take label within a feature
///
/// A feature with a single version uses `Main`; with two or more versions the
/// takes are lettered `A`, `B`, `C`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionLabel {
    Main,
    Alternate(AltIndex),
}

/// Zero-based letter index of an alternate take (0 = "A")
///
/// Only indices below [`VersionCount::MAX`] can be built, so every index
/// names a take the dashboard can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AltIndex(u8);

impl AltIndex {
    pub fn new(index: u8) -> Option<Self> {
        (index < VersionCount::MAX).then_some(Self(index))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn letter(&self) -> char {
        char::from(b'A' + self.0)
    }
}

impl VersionLabel {
    /// Letter label for a zero-based index; `None` past the last take
    pub fn alternate(index: u8) -> Option<Self> {
        AltIndex::new(index).map(VersionLabel::Alternate)
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLabel::Main => f.write_str("Main"),
            VersionLabel::Alternate(i) => write!(f, "{}", i.letter()),
        }
    }
}

impl FromStr for VersionLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "Main" {
            return Ok(VersionLabel::Main);
        }
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => VersionLabel::alternate(c as u8 - b'A'),
            _ => None,
        };
        parsed.ok_or_else(|| Error::InvalidInput(format!("Unknown version label: {:?}", s)))
    }
}

impl Serialize for VersionLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Number of alternate versions for a stem feature, in [1, 5]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VersionCount(u8);

impl VersionCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(count: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(Error::InvalidInput(format!(
                "Version count {} out of range [{}, {}]",
                count,
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Labels for every version, in tab order
    pub fn labels(&self) -> Vec<VersionLabel> {
        if self.0 == 1 {
            vec![VersionLabel::Main]
        } else {
            (0..self.0).filter_map(VersionLabel::alternate).collect()
        }
    }

    /// Whether `label` names one of the current versions
    pub fn contains(&self, label: VersionLabel) -> bool {
        match label {
            VersionLabel::Main => self.0 == 1,
            VersionLabel::Alternate(i) => self.0 > 1 && i.get() < self.0,
        }
    }
}

impl Default for VersionCount {
    fn default() -> Self {
        Self(1)
    }
}

impl<'de> Deserialize<'de> for VersionCount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        VersionCount::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Per-feature version counts chosen by the artist
///
/// Non-versioned features are fixed at a single `Main` version and cannot be
/// changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPlan {
    counts: BTreeMap<FeatureKey, VersionCount>,
}

impl Default for VersionPlan {
    fn default() -> Self {
        let counts = FeatureKey::all_variants()
            .iter()
            .filter(|k| k.is_versioned())
            .map(|&k| (k, VersionCount::default()))
            .collect();
        Self { counts }
    }
}

impl VersionPlan {
    /// Version count for `feature` (always 1 for non-versioned features)
    pub fn count(&self, feature: FeatureKey) -> VersionCount {
        self.counts.get(&feature).copied().unwrap_or_default()
    }

    /// Change the version count of a stem feature
    ///
    /// Returns the previous count.
    pub fn set(&mut self, feature: FeatureKey, count: u8) -> Result<VersionCount> {
        if !feature.is_versioned() {
            return Err(Error::InvalidInput(format!(
                "Feature {} does not support alternate versions",
                feature
            )));
        }
        let count = VersionCount::new(count)?;
        Ok(self.counts.insert(feature, count).unwrap_or_default())
    }
}
