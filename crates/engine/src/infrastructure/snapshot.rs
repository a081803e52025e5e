//! Vault snapshot loader
//!
//! A snapshot is one JSON document holding every entity a vault exports:
//!
//! ```json
//! { "events": [...], "locations": [...], "characters": [...], "groups": [...],
//!   "timeline": { "ganttMode": true, ... } }
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use storyteller_domain::{Character, Event, Group, Location, TimelineConfig};

use crate::infrastructure::memory_store::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultSnapshot {
    pub events: Vec<Event>,
    pub locations: Vec<Location>,
    pub characters: Vec<Character>,
    pub groups: Vec<Group>,
    pub timeline: TimelineConfig,
}

impl VaultSnapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            events = snapshot.events.len(),
            locations = snapshot.locations.len(),
            characters = snapshot.characters.len(),
            groups = snapshot.groups.len(),
            "Loaded vault snapshot"
        );
        Ok(snapshot)
    }

    pub async fn into_store(self) -> InMemoryStore {
        InMemoryStore::seeded(
            self.events,
            self.locations,
            self.characters,
            self.groups,
            self.timeline,
        )
        .await
    }
}
