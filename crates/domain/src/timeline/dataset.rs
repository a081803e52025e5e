//! Renderer-agnostic timeline output
//!
//! Everything here is rebuilt on each render and never persisted.

use serde::{Deserialize, Serialize};

use crate::conflicts::Severity;
use crate::ids::EventId;

/// Whether the renderer should draw a point or a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Point,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeGlyph {
    Flashback,
    Flashforward,
}

impl NarrativeGlyph {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Flashback => "↩",
            Self::Flashforward => "↪",
        }
    }
}

/// One event placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: EventId,
    /// Position of the event in the input slice
    pub event_index: usize,
    pub content: String,
    pub start: i64,
    pub end: Option<i64>,
    pub kind: ItemKind,
    pub group: Option<String>,
    pub class_names: Vec<String>,
    pub is_milestone: bool,
    /// Set for milestones in Gantt mode so the renderer can drop stem and dot
    pub suppress_milestone_decorations: bool,
    pub conflict_badge: Option<Severity>,
    pub narrative_marker: Option<NarrativeGlyph>,
    pub approximate: bool,
    pub display_date: String,
    pub tooltip: String,
}

/// A swimlane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub id: String,
    pub label: String,
    pub color: String,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Arrow from a prerequisite to the event that depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: EventId,
    pub to: EventId,
}

/// Era band drawn behind the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBackground {
    pub label: String,
    pub start: i64,
    pub end: i64,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDataset {
    pub items: Vec<TimelineItem>,
    /// `None` when grouping is off
    pub groups: Option<Vec<TimelineGroup>>,
    pub legend: Vec<LegendEntry>,
    pub dependencies: Vec<DependencyEdge>,
    pub backgrounds: Vec<TimelineBackground>,
}

impl TimelineDataset {
    pub fn item_for(&self, id: EventId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
