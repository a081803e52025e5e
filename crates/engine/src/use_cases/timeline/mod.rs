//! Timeline use cases.
//!
//! Refresh (detect + build), drag-to-reschedule, and conflict dismissal.

mod dismissal;
mod refresh;
mod reschedule;

pub use dismissal::ConflictDismissal;
pub use refresh::{RefreshTimeline, TimelineRequest, TimelineView};
pub use reschedule::{format_for_storage, RescheduleEvent};

use std::sync::Arc;

use storyteller_domain::EventId;

use crate::infrastructure::ports::RepoError;

/// Container for timeline use cases.
pub struct TimelineUseCases {
    pub refresh: Arc<RefreshTimeline>,
    pub reschedule: Arc<RescheduleEvent>,
    pub dismissal: Arc<ConflictDismissal>,
}

impl TimelineUseCases {
    pub fn new(
        refresh: Arc<RefreshTimeline>,
        reschedule: Arc<RescheduleEvent>,
        dismissal: Arc<ConflictDismissal>,
    ) -> Self {
        Self {
            refresh,
            reschedule,
            dismissal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),
    #[error("Date out of range: {0}")]
    InvalidDate(i64),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
