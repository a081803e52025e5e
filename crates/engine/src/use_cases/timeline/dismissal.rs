//! Conflict dismissal, persisted in the timeline settings.

use std::sync::Arc;

use super::TimelineError;
use crate::infrastructure::ports::SettingsRepo;

pub struct ConflictDismissal {
    settings: Arc<dyn SettingsRepo>,
}

impl ConflictDismissal {
    pub fn new(settings: Arc<dyn SettingsRepo>) -> Self {
        Self { settings }
    }

    /// Hides a conflict by identity. Returns false if it was already hidden.
    pub async fn dismiss(&self, identity: &str) -> Result<bool, TimelineError> {
        let mut config = self.settings.get_timeline_config().await?;
        if !config.dismiss_conflict(identity) {
            return Ok(false);
        }
        self.settings.save_timeline_config(&config).await?;
        tracing::info!(conflict = %identity, "Conflict dismissed");
        Ok(true)
    }

    /// Shows a dismissed conflict again. Returns false if it was not hidden.
    pub async fn restore(&self, identity: &str) -> Result<bool, TimelineError> {
        let mut config = self.settings.get_timeline_config().await?;
        if !config.restore_conflict(identity) {
            return Ok(false);
        }
        self.settings.save_timeline_config(&config).await?;
        tracing::info!(conflict = %identity, "Conflict restored");
        Ok(true)
    }
}
