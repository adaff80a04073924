//! Artist editing session
//!
//! A [`DashboardSession`] is created when an artist opens the dashboard and
//! dropped when they leave. It owns the song structure, the version plan, the
//! slot registry and an event bus; nothing is shared between sessions. The
//! host application keeps one per artist and passes it explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::events::{EventBus, SessionEvent};
use crate::features::{FeatureKey, VersionPlan};
use crate::registry::{AggregateReport, PayloadRef, SlotRegistry, UploadRecord};
use crate::slots::{SlotKey, SlotLayout};
use crate::song::SongSpec;
use crate::upload_policy::UploadPolicy;
use crate::{Error, Result};

/// Upload status shown next to the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Nothing uploaded yet
    Pending,
    /// At least one file uploaded
    Complete { files: usize },
}

/// One artist's editing session
#[derive(Debug)]
pub struct DashboardSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    song: SongSpec,
    versions: VersionPlan,
    registry: SlotRegistry,
    policy: UploadPolicy,
    events: EventBus,
}

impl DashboardSession {
    /// Start a session for `song`
    ///
    /// Fails if the song or the config is invalid.
    pub fn new(song: SongSpec, config: &DashboardConfig) -> Result<Self> {
        song.validate()?;
        config.validate()?;

        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            song,
            versions: VersionPlan::default(),
            registry: SlotRegistry::new(),
            policy: config.upload_policy()?,
            events: EventBus::new(config.events.capacity),
        };
        info!(
            "Started dashboard session {} for {:?} ({} sections)",
            session.id,
            session.song.artist_name,
            session.song.sections.len()
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn song(&self) -> &SongSpec {
        &self.song
    }

    pub fn versions(&self) -> &VersionPlan {
        &self.versions
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Replace the song description
    ///
    /// Stored uploads are kept. Slots that no longer exist become orphaned
    /// and drop out of the completeness counts.
    pub fn set_song(&mut self, song: SongSpec) -> Result<()> {
        song.validate()?;
        let structure_changed = song.sections != self.song.sections;
        self.song = song;

        if structure_changed {
            info!(
                "Session {}: song structure now {} sections",
                self.id,
                self.song.sections.len()
            );
            self.events.emit_lossy(SessionEvent::SongStructureChanged {
                session_id: self.id,
                sections: self.song.sections.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    /// Change the number of alternate versions for a stem feature
    pub fn set_version_count(&mut self, feature: FeatureKey, count: u8) -> Result<()> {
        let old = self.versions.set(feature, count)?;
        if old.get() != count {
            info!(
                "Session {}: {} versions {} -> {}",
                self.id,
                feature,
                old.get(),
                count
            );
            self.events.emit_lossy(SessionEvent::VersionCountChanged {
                session_id: self.id,
                feature,
                old_count: old.get(),
                new_count: count,
                timestamp: Utc::now(),
            });
        }
        Ok(())
    }

    /// Addressable slot space under the current song and versions
    pub fn layout(&self) -> SlotLayout {
        SlotLayout::new(&self.song, &self.versions)
    }

    /// Every slot the presentation layer should render, in display order
    pub fn slots(&self) -> Vec<SlotKey> {
        self.layout().slots()
    }

    /// Accept a file for `key`
    ///
    /// The upload policy is checked first; a rejected file leaves the
    /// registry untouched. Returns `true` when an earlier file was replaced.
    pub fn upload(&mut self, key: SlotKey, name: &str, size_bytes: u64) -> Result<bool> {
        self.accept(key, name, size_bytes, None)
    }

    /// Like [`upload`](Self::upload), keeping a handle to the payload
    pub fn upload_with_payload(
        &mut self,
        key: SlotKey,
        name: &str,
        size_bytes: u64,
        payload: PayloadRef,
    ) -> Result<bool> {
        self.accept(key, name, size_bytes, Some(payload))
    }

    fn accept(
        &mut self,
        key: SlotKey,
        name: &str,
        size_bytes: u64,
        payload: Option<PayloadRef>,
    ) -> Result<bool> {
        self.policy.check(name, size_bytes)?;

        if !self.layout().contains(&key) {
            // Still stored: the slot may come back if the artist re-edits the song
            warn!(
                "Session {}: upload to slot {} outside the current layout",
                self.id, key
            );
        }

        let replaced = match payload {
            Some(payload) => self
                .registry
                .record_with_payload(key, name, size_bytes, payload)?,
            None => self.registry.record(key, name, size_bytes)?,
        };

        self.events.emit_lossy(SessionEvent::StemRecorded {
            session_id: self.id,
            slot: key,
            filename: name.to_string(),
            size_bytes,
            replaced,
            timestamp: Utc::now(),
        });
        Ok(replaced)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&UploadRecord> {
        self.registry.get(key)
    }

    /// Aggregate report against the current song and versions
    pub fn summary(&self) -> AggregateReport {
        self.registry.summary(&self.layout())
    }

    pub fn status(&self) -> UploadStatus {
        match self.registry.len() {
            0 => UploadStatus::Pending,
            files => UploadStatus::Complete { files },
        }
    }

    /// Publishing requires at least one uploaded stem
    pub fn check_publishable(&self) -> Result<()> {
        if self.summary().has_uploads {
            Ok(())
        } else {
            Err(Error::NothingToPublish)
        }
    }

    /// Discard every upload; returns how many were removed
    pub fn reset(&mut self) -> usize {
        let cleared = self.registry.clear();
        self.events.emit_lossy(SessionEvent::SessionReset {
            session_id: self.id,
            cleared,
            timestamp: Utc::now(),
        });
        cleared
    }
}
