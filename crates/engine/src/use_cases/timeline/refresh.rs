//! Timeline refresh use case.
//!
//! Takes one snapshot of the store, runs conflict detection over it, applies
//! the user's dismissals, and builds the render dataset from the same
//! snapshot so badges and items always agree.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use storyteller_domain::{
    apply_dismissals, ConflictDetector, ConflictSummary, DetectedConflict, DisplayLocale,
    ParseOptions, TimelineBuilder, TimelineDataset, TimelineFilters,
};

use super::TimelineError;
use crate::infrastructure::ports::{ClockPort, EventRepo, GroupRepo, LocationRepo, SettingsRepo};

#[derive(Debug, Clone, Default)]
pub struct TimelineRequest {
    pub filters: TimelineFilters,
    pub locale: DisplayLocale,
    /// Anchor for relative dates; the clock's "now" when unset
    pub reference_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineView {
    pub conflicts: Vec<DetectedConflict>,
    pub summary: ConflictSummary,
    pub timeline: TimelineDataset,
}

pub struct RefreshTimeline {
    events: Arc<dyn EventRepo>,
    locations: Arc<dyn LocationRepo>,
    groups: Arc<dyn GroupRepo>,
    settings: Arc<dyn SettingsRepo>,
    clock: Arc<dyn ClockPort>,
}

impl RefreshTimeline {
    pub fn new(
        events: Arc<dyn EventRepo>,
        locations: Arc<dyn LocationRepo>,
        groups: Arc<dyn GroupRepo>,
        settings: Arc<dyn SettingsRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            events,
            locations,
            groups,
            settings,
            clock,
        }
    }

    pub async fn execute(&self, request: TimelineRequest) -> Result<TimelineView, TimelineError> {
        let events = self.events.list().await?;
        let locations = self.locations.list().await?;
        let groups = self.groups.list().await?;
        let config = self.settings.get_timeline_config().await?;

        let now = self.clock.now();
        let opts = ParseOptions::new(request.reference_date.unwrap_or_else(|| now.naive_utc()));

        let mut conflicts = ConflictDetector::new(opts)
            .with_locations(&locations)
            .detect_all(&events, now);
        let dismissed = apply_dismissals(&mut conflicts, &config);
        let summary = ConflictSummary::from_conflicts(&conflicts);

        let timeline = TimelineBuilder::new(&events, &config, opts)
            .locations(&locations)
            .groups(&groups)
            .conflicts(&conflicts)
            .filters(&request.filters)
            .locale(request.locale)
            .build();

        tracing::info!(
            events = events.len(),
            items = timeline.items.len(),
            errors = summary.errors,
            warnings = summary.warnings,
            dismissed,
            "Timeline refreshed"
        );

        Ok(TimelineView {
            conflicts,
            summary,
            timeline,
        })
    }
}
