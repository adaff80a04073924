//! # FluX-Tape Common Library
//!
//! Shared core for the FluX-Tape artist dashboard:
//! - Song structure and feature catalog
//! - Upload slot addressing (feature × version × section)
//! - Per-session slot registry and aggregate reporting
//! - Upload policy, configuration loading and session events
//!
//! Rendering, file reading and publishing live in the presentation layer,
//! which drives this crate through [`session::DashboardSession`] or directly
//! through [`registry::SlotRegistry`].

pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod registry;
pub mod session;
pub mod slots;
pub mod song;
pub mod upload_policy;

pub use error::{Error, Result};
pub use features::{AltIndex, FeatureKey, VersionCount, VersionLabel, VersionPlan};
pub use registry::{AggregateReport, FeatureCompleteness, SlotRegistry, UploadRecord};
pub use session::DashboardSession;
pub use slots::{derive_key, derive_reference_key, SlotKey, SlotLayout};
pub use song::{SectionName, SongSpec};
