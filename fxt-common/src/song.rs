//! Song structure supplied by the artist
//!
//! A [`SongSpec`] is owned by the presentation layer and handed to the core
//! by reference. The core reads it to work out which upload slots exist; it
//! never mutates it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Minimum number of sections in a song
pub const MIN_SECTIONS: usize = 1;
/// Maximum number of sections in a song
pub const MAX_SECTIONS: usize = 10;
/// Accepted BPM range
pub const BPM_RANGE: std::ops::RangeInclusive<u16> = 60..=200;
/// Accepted contributor period range, in days
pub const CONTRIBUTOR_DAYS_RANGE: std::ops::RangeInclusive<u16> = 1..=60;

/// Song section vocabulary
///
/// Ordering follows the dashboard's section picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionName {
    Intro,
    Verse,
    #[serde(rename = "Pre-Chorus")]
    PreChorus,
    Chorus,
    Bridge,
    Solo,
    Breakdown,
    Outro,
}

impl SectionName {
    /// All section names in picker order
    pub fn all_variants() -> &'static [SectionName] {
        &[
            SectionName::Intro,
            SectionName::Verse,
            SectionName::PreChorus,
            SectionName::Chorus,
            SectionName::Bridge,
            SectionName::Solo,
            SectionName::Breakdown,
            SectionName::Outro,
        ]
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionName::Intro => "Intro",
            SectionName::Verse => "Verse",
            SectionName::PreChorus => "Pre-Chorus",
            SectionName::Chorus => "Chorus",
            SectionName::Bridge => "Bridge",
            SectionName::Solo => "Solo",
            SectionName::Breakdown => "Breakdown",
            SectionName::Outro => "Outro",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SectionName {
    type Err = Error;

    /// Case-insensitive; hyphens, underscores and spaces are ignored so
    /// "Pre-Chorus", "pre_chorus" and "prechorus" all parse.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "intro" => Ok(SectionName::Intro),
            "verse" => Ok(SectionName::Verse),
            "prechorus" => Ok(SectionName::PreChorus),
            "chorus" => Ok(SectionName::Chorus),
            "bridge" => Ok(SectionName::Bridge),
            "solo" => Ok(SectionName::Solo),
            "breakdown" => Ok(SectionName::Breakdown),
            "outro" => Ok(SectionName::Outro),
            _ => Err(Error::InvalidInput(format!("Unknown section name: {:?}", s))),
        }
    }
}

/// Genre vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "Hip-Hop")]
    HipHop,
    #[serde(rename = "R&B")]
    RnB,
    Pop,
    Electronic,
    Rock,
    Other,
}

impl Genre {
    pub fn display_name(&self) -> &'static str {
        match self {
            Genre::HipHop => "Hip-Hop",
            Genre::RnB => "R&B",
            Genre::Pop => "Pop",
            Genre::Electronic => "Electronic",
            Genre::Rock => "Rock",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Artist-supplied description of a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSpec {
    pub artist_name: String,
    pub track_title: String,
    pub release_date: NaiveDate,
    pub genre: Genre,
    pub bpm: u16,
    /// Days contributors may access the uploaded stems
    pub contributor_days: u16,
    /// Ordered sections; repeats are distinct positions
    pub sections: Vec<SectionName>,
}

impl Default for SongSpec {
    fn default() -> Self {
        Self {
            artist_name: "Zlisterr".to_string(),
            track_title: String::new(),
            release_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or(NaiveDate::MIN),
            genre: Genre::HipHop,
            bpm: 120,
            contributor_days: 14,
            sections: vec![
                SectionName::Intro,
                SectionName::Verse,
                SectionName::Chorus,
                SectionName::Outro,
            ],
        }
    }
}

impl SongSpec {
    /// Check every range constraint on the song
    pub fn validate(&self) -> Result<()> {
        let count = self.sections.len();
        if !(MIN_SECTIONS..=MAX_SECTIONS).contains(&count) {
            return Err(Error::InvalidInput(format!(
                "Section count {} out of range [{}, {}]",
                count, MIN_SECTIONS, MAX_SECTIONS
            )));
        }
        if !BPM_RANGE.contains(&self.bpm) {
            return Err(Error::InvalidInput(format!(
                "BPM {} out of range [{}, {}]",
                self.bpm,
                BPM_RANGE.start(),
                BPM_RANGE.end()
            )));
        }
        if !CONTRIBUTOR_DAYS_RANGE.contains(&self.contributor_days) {
            return Err(Error::InvalidInput(format!(
                "Contributor period {} days out of range [{}, {}]",
                self.contributor_days,
                CONTRIBUTOR_DAYS_RANGE.start(),
                CONTRIBUTOR_DAYS_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Sections paired with their occurrence index, in song order
    ///
    /// The occurrence index counts earlier positions holding the same name:
    /// `[Verse, Chorus, Verse]` yields `(Verse, 0), (Chorus, 0), (Verse, 1)`.
    pub fn section_slots(&self) -> Vec<(SectionName, usize)> {
        let mut seen: HashMap<SectionName, usize> = HashMap::new();
        self.sections
            .iter()
            .map(|&name| {
                let occurrence = seen.entry(name).or_insert(0);
                let slot = (name, *occurrence);
                *occurrence += 1;
                slot
            })
            .collect()
    }

    /// Number of positions holding each section name
    pub fn occurrence_counts(&self) -> HashMap<SectionName, usize> {
        let mut counts = HashMap::new();
        for &name in &self.sections {
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }

    /// Last day contributors may access the stems
    ///
    /// `None` when the release date is so late that the period runs past the
    /// last representable date.
    pub fn contributor_deadline(&self) -> Option<NaiveDate> {
        self.release_date
            .checked_add_days(Days::new(u64::from(self.contributor_days)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_song_is_valid() {
        let song = SongSpec::default();
        assert!(song.validate().is_ok());
        assert_eq!(song.sections.len(), 4);
        assert_eq!(song.bpm, 120);
        assert_eq!(song.contributor_days, 14);
    }

    #[test]
    fn test_section_count_bounds() {
        let mut song = SongSpec::default();
        song.sections.clear();
        assert!(matches!(song.validate(), Err(Error::InvalidInput(_))));

        song.sections = vec![SectionName::Verse; MAX_SECTIONS];
        assert!(song.validate().is_ok());

        song.sections.push(SectionName::Outro);
        assert!(matches!(song.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_bpm_and_contributor_days_bounds() {
        let mut song = SongSpec::default();
        song.bpm = 59;
        assert!(song.validate().is_err());
        song.bpm = 200;
        assert!(song.validate().is_ok());

        song.contributor_days = 0;
        assert!(song.validate().is_err());
        song.contributor_days = 61;
        assert!(song.validate().is_err());
        song.contributor_days = 60;
        assert!(song.validate().is_ok());
    }

    #[test]
    fn test_section_slots_number_repeats() {
        let song = SongSpec {
            sections: vec![
                SectionName::Verse,
                SectionName::Chorus,
                SectionName::Verse,
                SectionName::Chorus,
            ],
            ..SongSpec::default()
        };
        assert_eq!(
            song.section_slots(),
            vec![
                (SectionName::Verse, 0),
                (SectionName::Chorus, 0),
                (SectionName::Verse, 1),
                (SectionName::Chorus, 1),
            ]
        );
        assert_eq!(song.occurrence_counts()[&SectionName::Verse], 2);
    }

    #[test]
    fn test_section_name_parsing() {
        assert_eq!("Pre-Chorus".parse::<SectionName>().unwrap(), SectionName::PreChorus);
        assert_eq!("pre_chorus".parse::<SectionName>().unwrap(), SectionName::PreChorus);
        assert_eq!("OUTRO".parse::<SectionName>().unwrap(), SectionName::Outro);
        assert!("Hook".parse::<SectionName>().is_err());

        for name in SectionName::all_variants() {
            assert_eq!(name.display_name().parse::<SectionName>().unwrap(), *name);
        }
    }

    #[test]
    fn test_contributor_deadline() {
        let song = SongSpec::default();
        assert_eq!(
            song.contributor_deadline(),
            NaiveDate::from_ymd_opt(2026, 1, 29)
        );
    }

    #[test]
    fn test_contributor_deadline_past_max_date_is_none() {
        let song = SongSpec {
            release_date: NaiveDate::MAX,
            ..SongSpec::default()
        };
        assert_eq!(song.contributor_deadline(), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&SectionName::PreChorus).unwrap();
        assert_eq!(json, "\"Pre-Chorus\"");
        let json = serde_json::to_string(&Genre::RnB).unwrap();
        assert_eq!(json, "\"R&B\"");
    }
}
