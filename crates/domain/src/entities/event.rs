//! Event entity - a dated beat in the story world
//!
//! Events reference characters, locations, groups and other events by the
//! strings the author typed. Those references are resolved per pass through
//! [`crate::index::EventIndex`] and [`crate::index::LocationIndex`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;
use crate::ids::EventId;
use crate::value_objects::NarrativeMarkers;

fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_progress).unwrap_or(0))
}

fn clamp_progress(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    // clamped to 0..=100 so the cast is lossless
    value.round().clamp(0.0, 100.0) as u8
}

/// A story event.
///
/// # Invariants
///
/// - `progress` is always within `0..=100`
/// - flashback and flash-forward are never both set through the setters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    id: EventId,
    name: String,
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    characters: Vec<String>,
    #[serde(default)]
    groups: Vec<String>,
    /// Names of events that must come before this one
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    is_milestone: bool,
    #[serde(default, deserialize_with = "deserialize_progress")]
    progress: u8,
    #[serde(default)]
    narrative_markers: Option<NarrativeMarkers>,
    #[serde(default)]
    narrative_sequence: Option<u32>,
}

impl Event {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Creates an event with a fresh id. Use [`Event::validate`] before saving.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            date_time: None,
            description: None,
            location: None,
            characters: Vec::new(),
            groups: Vec::new(),
            dependencies: Vec::new(),
            is_milestone: false,
            progress: 0,
            narrative_markers: None,
            narrative_sequence: None,
        }
    }

    /// Checks the invariants that cannot be expressed in the type.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Event name cannot be empty"));
        }
        if self
            .narrative_markers
            .as_ref()
            .is_some_and(NarrativeMarkers::is_contradictory)
        {
            return Err(DomainError::constraint(format!(
                "Event '{}' cannot be both a flashback and a flash-forward",
                self.name
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }

    pub fn with_date_time(mut self, date_time: impl Into<String>) -> Self {
        self.date_time = Some(date_time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.characters.push(character.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_dependency(mut self, event_name: impl Into<String>) -> Self {
        self.dependencies.push(event_name.into());
        self
    }

    pub fn with_milestone(mut self, is_milestone: bool) -> Self {
        self.is_milestone = is_milestone;
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = clamp_progress(progress);
        self
    }

    pub fn with_narrative_markers(mut self, markers: NarrativeMarkers) -> Self {
        self.narrative_markers = Some(markers);
        self
    }

    pub fn with_narrative_sequence(mut self, sequence: u32) -> Self {
        self.narrative_sequence = Some(sequence);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn date_time(&self) -> Option<&str> {
        self.date_time.as_deref()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[inline]
    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    #[inline]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    #[inline]
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    #[inline]
    pub fn is_milestone(&self) -> bool {
        self.is_milestone
    }

    #[inline]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[inline]
    pub fn narrative_markers(&self) -> Option<&NarrativeMarkers> {
        self.narrative_markers.as_ref()
    }

    #[inline]
    pub fn narrative_sequence(&self) -> Option<u32> {
        self.narrative_sequence
    }

    pub fn is_flashback(&self) -> bool {
        self.narrative_markers.as_ref().is_some_and(|m| m.is_flashback)
    }

    pub fn is_flashforward(&self) -> bool {
        self.narrative_markers
            .as_ref()
            .is_some_and(|m| m.is_flashforward)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn set_date_time(&mut self, date_time: Option<String>) {
        self.date_time = date_time;
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = clamp_progress(progress);
    }

    pub fn set_milestone(&mut self, is_milestone: bool) {
        self.is_milestone = is_milestone;
    }

    pub fn set_narrative_sequence(&mut self, sequence: Option<u32>) {
        self.narrative_sequence = sequence;
    }

    /// Marks the event as a flashback, clearing any flash-forward flag.
    pub fn set_flashback(&mut self) {
        self.narrative_markers
            .get_or_insert_with(NarrativeMarkers::default)
            .set_flashback(true);
    }

    /// Marks the event as a flash-forward, clearing any flashback flag.
    pub fn set_flashforward(&mut self) {
        self.narrative_markers
            .get_or_insert_with(NarrativeMarkers::default)
            .set_flashforward(true);
    }

    pub fn clear_markers(&mut self) {
        self.narrative_markers = None;
    }
}
