//! Accepted audio formats and upload limits
//!
//! Used by the session layer before a file reaches the registry. The registry
//! itself never looks at extensions or payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Audio container accepted by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Aiff,
    Mp3,
}

impl AudioFormat {
    pub fn all_variants() -> &'static [AudioFormat] {
        &[AudioFormat::Wav, AudioFormat::Aiff, AudioFormat::Mp3]
    }

    /// Canonical file extension (lowercase, no dot)
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Aiff => "aiff",
            AudioFormat::Mp3 => "mp3",
        }
    }

    /// Detect format from a filename's extension (case-insensitive)
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "aiff" => Ok(AudioFormat::Aiff),
            "mp3" => Ok(AudioFormat::Mp3),
            _ => Err(Error::InvalidInput(format!("Unsupported audio format: {:?}", s))),
        }
    }
}

/// Allow-list and size cap applied to incoming files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed: Vec<AudioFormat>,
    /// `None` means no size cap
    max_file_bytes: Option<u64>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed: AudioFormat::all_variants().to_vec(),
            max_file_bytes: None,
        }
    }
}

impl UploadPolicy {
    pub fn new(allowed: Vec<AudioFormat>, max_file_bytes: Option<u64>) -> Result<Self> {
        if allowed.is_empty() {
            return Err(Error::Config("Upload allow-list must not be empty".to_string()));
        }
        Ok(Self {
            allowed,
            max_file_bytes,
        })
    }

    pub fn allowed_formats(&self) -> &[AudioFormat] {
        &self.allowed
    }

    pub fn max_file_bytes(&self) -> Option<u64> {
        self.max_file_bytes
    }

    /// Check a candidate upload, returning its detected format
    pub fn check(&self, name: &str, size_bytes: u64) -> Result<AudioFormat> {
        if name.trim().is_empty() {
            return Err(Error::UploadRejected("Filename is empty".to_string()));
        }

        let format = match AudioFormat::from_filename(name) {
            Some(format) if self.allowed.contains(&format) => format,
            _ => {
                warn!("Rejected upload {:?}: extension not in allow-list", name);
                return Err(Error::UploadRejected(format!(
                    "{} is not one of the accepted formats ({})",
                    name,
                    self.allowed
                        .iter()
                        .map(AudioFormat::extension)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        };

        if let Some(cap) = self.max_file_bytes {
            if size_bytes > cap {
                warn!("Rejected upload {:?}: {} bytes exceeds cap of {}", name, size_bytes, cap);
                return Err(Error::UploadRejected(format!(
                    "{} is {} bytes, limit is {} bytes",
                    name, size_bytes, cap
                )));
            }
        }

        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection_is_case_insensitive() {
        assert_eq!(AudioFormat::from_filename("Vocals_Verse1_A.WAV"), Some(AudioFormat::Wav));
        assert_eq!(AudioFormat::from_filename("mix.final.aiff"), Some(AudioFormat::Aiff));
        assert_eq!(AudioFormat::from_filename("take.Mp3"), Some(AudioFormat::Mp3));
        assert_eq!(AudioFormat::from_filename("take.flac"), None);
        assert_eq!(AudioFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_default_policy_accepts_all_three_formats() {
        let policy = UploadPolicy::default();
        for format in AudioFormat::all_variants() {
            let name = format!("stem.{}", format);
            assert_eq!(policy.check(&name, 1024).unwrap(), *format);
        }
    }

    #[test]
    fn test_policy_rejects_unlisted_extension() {
        let policy = UploadPolicy::new(vec![AudioFormat::Wav], None).unwrap();
        assert!(matches!(policy.check("stem.mp3", 10), Err(Error::UploadRejected(_))));
        assert!(matches!(policy.check("stem.ogg", 10), Err(Error::UploadRejected(_))));
    }

    #[test]
    fn test_policy_rejects_empty_name_and_oversize() {
        let policy = UploadPolicy::new(vec![AudioFormat::Wav], Some(1_000)).unwrap();
        assert!(matches!(policy.check("  ", 10), Err(Error::UploadRejected(_))));
        assert!(policy.check("stem.wav", 1_000).is_ok());
        assert!(matches!(policy.check("stem.wav", 1_001), Err(Error::UploadRejected(_))));
    }

    #[test]
    fn test_empty_allow_list_is_config_error() {
        assert!(matches!(UploadPolicy::new(vec![], None), Err(Error::Config(_))));
    }
}
