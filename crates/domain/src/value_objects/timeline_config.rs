//! Timeline configuration and filters
//!
//! `TimelineConfig` is threaded explicitly into the dataset builder and the
//! conflict pass. Persistence belongs to the settings collaborator; this type
//! only defines the shape and defaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::common::sanitize_name;

fn default_gantt_duration_days() -> u32 {
    1
}

/// How timeline items are grouped into swimlanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[default]
    None,
    Location,
    Character,
    Group,
    Track,
}

impl std::fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupingMode::None => "none",
            GroupingMode::Location => "location",
            GroupingMode::Character => "character",
            GroupingMode::Group => "group",
            GroupingMode::Track => "track",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GroupingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(GroupingMode::None),
            "location" | "locations" => Ok(GroupingMode::Location),
            "character" | "characters" => Ok(GroupingMode::Character),
            "group" | "groups" => Ok(GroupingMode::Group),
            "track" | "tracks" => Ok(GroupingMode::Track),
            _ => Err(()),
        }
    }
}

/// A named swimlane listing events by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub event_names: Vec<String>,
}

impl TrackDefinition {
    pub fn contains(&self, event_name: &str) -> bool {
        let key = sanitize_name(event_name);
        !key.is_empty() && self.event_names.iter().any(|n| sanitize_name(n) == key)
    }
}

/// A named span of world time rendered as a background band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraDefinition {
    pub name: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// An alternate branch of the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub event_names: Vec<String>,
}

/// Timeline rendering and detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineConfig {
    #[serde(default)]
    pub gantt_mode: bool,
    #[serde(default = "default_gantt_duration_days")]
    pub default_gantt_duration_days: u32,
    #[serde(default)]
    pub grouping: GroupingMode,
    #[serde(default)]
    pub narrative_order: bool,
    #[serde(default)]
    pub tracks: Vec<TrackDefinition>,
    #[serde(default)]
    pub eras: Vec<EraDefinition>,
    #[serde(default)]
    pub forks: Vec<Fork>,
    /// Conflict identity keys the user has dismissed
    #[serde(default)]
    pub dismissed_conflicts: BTreeSet<String>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            gantt_mode: false,
            default_gantt_duration_days: default_gantt_duration_days(),
            grouping: GroupingMode::None,
            narrative_order: false,
            tracks: Vec::new(),
            eras: Vec::new(),
            forks: Vec::new(),
            dismissed_conflicts: BTreeSet::new(),
        }
    }
}

impl TimelineConfig {
    pub fn with_gantt(mut self, enabled: bool) -> Self {
        self.gantt_mode = enabled;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingMode) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_narrative_order(mut self, enabled: bool) -> Self {
        self.narrative_order = enabled;
        self
    }

    pub fn with_track(mut self, track: TrackDefinition) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn with_era(mut self, era: EraDefinition) -> Self {
        self.eras.push(era);
        self
    }

    pub fn with_fork(mut self, fork: Fork) -> Self {
        self.forks.push(fork);
        self
    }

    /// Marks a conflict identity as dismissed. Returns false if it already was.
    pub fn dismiss_conflict(&mut self, identity: impl Into<String>) -> bool {
        self.dismissed_conflicts.insert(identity.into())
    }

    /// Restores a dismissed conflict. Returns false if it was not dismissed.
    pub fn restore_conflict(&mut self, identity: &str) -> bool {
        self.dismissed_conflicts.remove(identity)
    }

    pub fn is_dismissed(&self, identity: &str) -> bool {
        self.dismissed_conflicts.contains(identity)
    }

    /// The fork an event belongs to: the first fork listing it.
    pub fn fork_of(&self, event_name: &str) -> Option<&Fork> {
        let key = sanitize_name(event_name);
        if key.is_empty() {
            return None;
        }
        self.forks
            .iter()
            .find(|fork| fork.event_names.iter().any(|n| sanitize_name(n) == key))
    }
}

/// Which events make it into a dataset.
///
/// Empty lists mean "no restriction". `fork: None` is the main timeline, which
/// excludes every event that belongs to a fork.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineFilters {
    pub milestones_only: bool,
    pub characters: Vec<String>,
    pub locations: Vec<String>,
    pub groups: Vec<String>,
    pub fork: Option<String>,
}
