//! Narrative markers - how an event sits in story order versus world time

use serde::{Deserialize, Serialize};

/// Flashback / flash-forward annotations on an event.
///
/// # Invariants
///
/// - At most one of `is_flashback` / `is_flashforward` is set when mutated
///   through [`NarrativeMarkers::set_flashback`] or
///   [`NarrativeMarkers::set_flashforward`]. Deserialized data may still carry
///   both, which the conflict detector reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NarrativeMarkers {
    pub is_flashback: bool,
    pub is_flashforward: bool,
    /// When the scene is narrated, as a free-form date string
    pub narrative_date: Option<String>,
    /// Name of the event this one flashes back or forward to
    pub target_event: Option<String>,
    pub narrative_context: Option<String>,
}

impl NarrativeMarkers {
    pub fn flashback() -> Self {
        Self {
            is_flashback: true,
            ..Self::default()
        }
    }

    pub fn flashforward() -> Self {
        Self {
            is_flashforward: true,
            ..Self::default()
        }
    }

    pub fn with_target_event(mut self, target: impl Into<String>) -> Self {
        self.target_event = Some(target.into());
        self
    }

    pub fn with_narrative_date(mut self, date: impl Into<String>) -> Self {
        self.narrative_date = Some(date.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.narrative_context = Some(context.into());
        self
    }

    /// Sets the flashback flag. Setting it clears flash-forward.
    pub fn set_flashback(&mut self, value: bool) {
        self.is_flashback = value;
        if value {
            self.is_flashforward = false;
        }
    }

    /// Sets the flash-forward flag. Setting it clears flashback.
    pub fn set_flashforward(&mut self, value: bool) {
        self.is_flashforward = value;
        if value {
            self.is_flashback = false;
        }
    }

    /// True when both flags are set, which only malformed input can produce.
    pub fn is_contradictory(&self) -> bool {
        self.is_flashback && self.is_flashforward
    }

    pub fn is_empty(&self) -> bool {
        !self.is_flashback
            && !self.is_flashforward
            && self.narrative_date.is_none()
            && self.target_event.is_none()
            && self.narrative_context.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_one_direction_clears_the_other() {
        let mut markers = NarrativeMarkers::flashback();
        markers.set_flashforward(true);
        assert!(markers.is_flashforward);
        assert!(!markers.is_flashback);

        markers.set_flashback(true);
        assert!(markers.is_flashback);
        assert!(!markers.is_flashforward);
    }

    #[test]
    fn clearing_does_not_touch_the_other_flag() {
        let mut markers = NarrativeMarkers::flashback();
        markers.set_flashforward(false);
        assert!(markers.is_flashback);
    }

    #[test]
    fn deserialized_contradiction_is_detectable() {
        let markers: NarrativeMarkers =
            serde_json::from_str(r#"{"isFlashback":true,"isFlashforward":true}"#).unwrap();
        assert!(markers.is_contradictory());
    }
}
