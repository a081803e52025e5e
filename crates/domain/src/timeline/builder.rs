//! Builds a [`TimelineDataset`] from a snapshot of events
//!
//! The build is best-effort: an event that cannot be placed is left out and
//! logged, never allowed to fail the whole render.

use std::collections::HashMap;

use super::dataset::{
    DependencyEdge, ItemKind, LegendEntry, NarrativeGlyph, TimelineBackground, TimelineDataset,
    TimelineGroup, TimelineItem,
};
use crate::common::{none_if_blank, truncate_chars};
use crate::conflicts::{DetectedConflict, Severity};
use crate::entities::{Event, Group, Location};
use crate::index::{EventIndex, LocationIndex};
use crate::temporal::{
    end_or_start_millis, parse_date, to_display, to_millis, DisplayLocale, ParseOptions,
    ParsedDate, MILLIS_PER_DAY,
};
use crate::value_objects::{GroupingMode, TimelineConfig, TimelineFilters};

/// Label used when an event has no usable name.
pub const UNTITLED_EVENT: &str = "(untitled event)";

/// Swimlane colors, assigned in group order.
pub const GROUP_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// Color of the catch-all swimlane.
pub const NEUTRAL_COLOR: &str = "#9e9e9e";

const DEFAULT_ERA_COLOR: &str = "rgba(128, 128, 128, 0.15)";
const CATCH_ALL_KEY: &str = "__unassigned__";
const TOOLTIP_DESCRIPTION_CHARS: usize = 120;
const TOOLTIP_CONFLICTS_PER_SEVERITY: usize = 3;

/// Events without a narrative sequence sort after every sequenced event.
const NO_SEQUENCE: u32 = u32::MAX;

struct Placed<'e> {
    index: usize,
    event: &'e Event,
    parsed: ParsedDate,
    start: i64,
}

struct GroupAssignment {
    key: String,
    label: String,
    color: Option<String>,
}

/// Fluent builder; every input other than the events is optional.
pub struct TimelineBuilder<'a> {
    events: &'a [Event],
    locations: &'a [Location],
    groups: &'a [Group],
    conflicts: &'a [DetectedConflict],
    filters: TimelineFilters,
    config: &'a TimelineConfig,
    opts: ParseOptions,
    locale: DisplayLocale,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(events: &'a [Event], config: &'a TimelineConfig, opts: ParseOptions) -> Self {
        Self {
            events,
            locations: &[],
            groups: &[],
            conflicts: &[],
            filters: TimelineFilters::default(),
            config,
            opts,
            locale: DisplayLocale::default(),
        }
    }

    pub fn locations(mut self, locations: &'a [Location]) -> Self {
        self.locations = locations;
        self
    }

    pub fn groups(mut self, groups: &'a [Group]) -> Self {
        self.groups = groups;
        self
    }

    pub fn conflicts(mut self, conflicts: &'a [DetectedConflict]) -> Self {
        self.conflicts = conflicts;
        self
    }

    pub fn filters(mut self, filters: &TimelineFilters) -> Self {
        self.filters = filters.clone();
        self
    }

    pub fn locale(mut self, locale: DisplayLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn build(&self) -> TimelineDataset {
        let location_index = LocationIndex::build(self.locations);
        let mut placed = self.place(&location_index);
        self.order(&mut placed);

        let assignments: Vec<Option<GroupAssignment>> = placed
            .iter()
            .map(|p| self.assign_group(p.event, &location_index))
            .collect();
        let groups = self.build_groups(&placed, &assignments);

        let items: Vec<TimelineItem> = placed
            .iter()
            .zip(&assignments)
            .map(|(p, assignment)| {
                let group = groups.as_ref().map(|_| {
                    assignment
                        .as_ref()
                        .map_or_else(|| CATCH_ALL_KEY.to_string(), |a| a.key.clone())
                });
                self.build_item(p, group, &location_index)
            })
            .collect();

        let legend = groups
            .as_ref()
            .map(|gs| {
                gs.iter()
                    .map(|g| LegendEntry {
                        label: g.label.clone(),
                        color: g.color.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let dataset = TimelineDataset {
            dependencies: dependency_edges(&placed),
            backgrounds: self.backgrounds(),
            items,
            groups,
            legend,
        };
        tracing::debug!(
            events = self.events.len(),
            items = dataset.items.len(),
            arrows = dataset.dependencies.len(),
            grouping = %self.config.grouping,
            "Timeline dataset built"
        );
        dataset
    }

    // =========================================================================
    // Filtering and placement
    // =========================================================================

    fn place(&self, locations: &LocationIndex) -> Vec<Placed<'a>> {
        let mut placed = Vec::new();
        for (index, event) in self.events.iter().enumerate() {
            if !self.passes_filters(event, locations) {
                continue;
            }
            let Some(text) = event.date_time() else {
                tracing::debug!(event = %event.name(), "Event has no date, not placed");
                continue;
            };
            let parsed = parse_date(text, &self.opts);
            let Some(start) = to_millis(&parsed) else {
                tracing::debug!(
                    event = %event.name(),
                    date = %text,
                    error = ?parsed.error,
                    "Event date did not parse, not placed"
                );
                continue;
            };
            placed.push(Placed {
                index,
                event,
                parsed,
                start,
            });
        }
        placed
    }

    fn passes_filters(&self, event: &Event, locations: &LocationIndex) -> bool {
        let filters = &self.filters;
        if filters.milestones_only && !event.is_milestone() {
            return false;
        }
        if !filters.characters.is_empty()
            && !event
                .characters()
                .iter()
                .any(|c| filters.characters.iter().any(|f| same_text(c, f)))
        {
            return false;
        }
        if !filters.locations.is_empty() {
            let Some(location) = event.location().and_then(none_if_blank) else {
                return false;
            };
            let key = locations.key(location);
            if !filters.locations.iter().any(|f| locations.key(f) == key) {
                return false;
            }
        }
        if !filters.groups.is_empty()
            && !event
                .groups()
                .iter()
                .any(|g| filters.groups.iter().any(|f| self.same_group(g, f)))
        {
            return false;
        }
        let fork = self.config.fork_of(event.name()).map(|f| f.id.as_str());
        match filters.fork.as_deref() {
            None => fork.is_none(),
            Some(wanted) => fork == Some(wanted),
        }
    }

    fn same_group(&self, a: &str, b: &str) -> bool {
        if same_text(a, b) {
            return true;
        }
        match (
            self.groups.iter().find(|g| g.matches(a)),
            self.groups.iter().find(|g| g.matches(b)),
        ) {
            (Some(x), Some(y)) => x.id() == y.id(),
            _ => false,
        }
    }

    fn order(&self, placed: &mut [Placed<'_>]) {
        if self.config.narrative_order {
            placed.sort_by_key(|p| {
                (
                    p.event.narrative_sequence().unwrap_or(NO_SEQUENCE),
                    p.index,
                )
            });
        } else {
            placed.sort_by_key(|p| (p.start, p.index));
        }
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    fn assign_group(&self, event: &Event, locations: &LocationIndex) -> Option<GroupAssignment> {
        match self.config.grouping {
            GroupingMode::None => None,
            GroupingMode::Location => {
                let raw = event.location().and_then(none_if_blank)?;
                Some(GroupAssignment {
                    key: locations.key(raw),
                    label: locations.display_name(raw).to_string(),
                    color: None,
                })
            }
            GroupingMode::Character => {
                let raw = event.characters().iter().find_map(|c| none_if_blank(c))?;
                Some(GroupAssignment {
                    key: raw.to_lowercase(),
                    label: raw.to_string(),
                    color: None,
                })
            }
            GroupingMode::Group => {
                let raw = event.groups().iter().find_map(|g| none_if_blank(g))?;
                match self.groups.iter().find(|g| g.matches(raw)) {
                    Some(group) => Some(GroupAssignment {
                        key: group.id().to_string(),
                        label: group.name().to_string(),
                        color: group.color().map(str::to_string),
                    }),
                    None => Some(GroupAssignment {
                        key: raw.to_lowercase(),
                        label: raw.to_string(),
                        color: None,
                    }),
                }
            }
            GroupingMode::Track => {
                let track = self.config.tracks.iter().find(|t| t.contains(event.name()))?;
                Some(GroupAssignment {
                    key: track.id.clone(),
                    label: track.name.clone(),
                    color: track.color.clone(),
                })
            }
        }
    }

    fn build_groups(
        &self,
        placed: &[Placed<'_>],
        assignments: &[Option<GroupAssignment>],
    ) -> Option<Vec<TimelineGroup>> {
        if self.config.grouping == GroupingMode::None {
            return None;
        }

        let mut seen: HashMap<&str, &GroupAssignment> = HashMap::new();
        let mut needs_catch_all = false;
        for assignment in assignments {
            match assignment {
                Some(a) => {
                    seen.entry(a.key.as_str()).or_insert(a);
                }
                None => needs_catch_all = true,
            }
        }

        let mut ordered: Vec<&GroupAssignment> = seen.into_values().collect();
        if self.config.grouping == GroupingMode::Track {
            let position = |key: &str| {
                self.config
                    .tracks
                    .iter()
                    .position(|t| t.id == key)
                    .unwrap_or(usize::MAX)
            };
            ordered.sort_by_key(|a| (position(&a.key), a.key.clone()));
        } else {
            ordered.sort_by(|a, b| {
                a.label
                    .to_lowercase()
                    .cmp(&b.label.to_lowercase())
                    .then_with(|| a.key.cmp(&b.key))
            });
        }

        let mut groups: Vec<TimelineGroup> = ordered
            .into_iter()
            .enumerate()
            .map(|(order, a)| TimelineGroup {
                id: a.key.clone(),
                label: a.label.clone(),
                color: a
                    .color
                    .clone()
                    .unwrap_or_else(|| GROUP_PALETTE[order % GROUP_PALETTE.len()].to_string()),
                order,
            })
            .collect();

        if needs_catch_all {
            groups.push(TimelineGroup {
                id: CATCH_ALL_KEY.to_string(),
                label: catch_all_label(self.config.grouping).to_string(),
                color: NEUTRAL_COLOR.to_string(),
                order: groups.len(),
            });
        }
        tracing::trace!(groups = groups.len(), items = placed.len(), "Grouped timeline items");
        Some(groups)
    }

    // =========================================================================
    // Items
    // =========================================================================

    fn build_item(
        &self,
        placed: &Placed<'_>,
        group: Option<String>,
        locations: &LocationIndex,
    ) -> TimelineItem {
        let event = placed.event;
        let conflicts: Vec<&DetectedConflict> = self
            .conflicts
            .iter()
            .filter(|c| !c.dismissed && c.involves(event.id()))
            .collect();
        let badge = conflicts.iter().map(|c| c.severity).min();

        let narrative = if event.is_flashback() {
            Some(NarrativeGlyph::Flashback)
        } else if event.is_flashforward() {
            Some(NarrativeGlyph::Flashforward)
        } else {
            None
        };

        let gantt = self.config.gantt_mode;
        let end = placed.parsed.end_millis().or_else(|| {
            gantt.then(|| {
                let days = i64::from(self.config.default_gantt_duration_days);
                placed.start.saturating_add(days.saturating_mul(MILLIS_PER_DAY))
            })
        });
        let kind = if end.is_some() {
            ItemKind::Range
        } else {
            ItemKind::Point
        };

        let name = match none_if_blank(event.name()) {
            Some(name) => name,
            None => {
                tracing::warn!(
                    event_id = %event.id(),
                    "Event has an empty name, using placeholder label"
                );
                UNTITLED_EVENT
            }
        };

        let mut prefix: Vec<String> = Vec::new();
        match badge {
            Some(Severity::Error) => prefix.push("⛔".to_string()),
            Some(Severity::Warning) => prefix.push("⚠".to_string()),
            None => {}
        }
        if let Some(glyph) = narrative {
            prefix.push(glyph.glyph().to_string());
        }
        if event.is_milestone() {
            prefix.push("◆".to_string());
        }
        if self.config.narrative_order {
            if let Some(sequence) = event.narrative_sequence() {
                prefix.push(format!("[{sequence}]"));
            }
        }
        prefix.push(name.to_string());
        let content = prefix.join(" ");

        let mut class_names = vec!["timeline-event".to_string()];
        if event.is_milestone() {
            class_names.push("milestone".to_string());
        }
        if kind == ItemKind::Range {
            class_names.push("range".to_string());
        }
        match narrative {
            Some(NarrativeGlyph::Flashback) => class_names.push("flashback".to_string()),
            Some(NarrativeGlyph::Flashforward) => class_names.push("flashforward".to_string()),
            None => {}
        }
        match badge {
            Some(Severity::Error) => class_names.push("has-conflict-error".to_string()),
            Some(Severity::Warning) => class_names.push("has-conflict-warning".to_string()),
            None => {}
        }
        if placed.parsed.approximate {
            class_names.push("approximate".to_string());
        }

        let display_date = to_display(&placed.parsed, self.locale);
        let tooltip = tooltip(name, &display_date, event, locations, &conflicts);

        TimelineItem {
            id: event.id(),
            event_index: placed.index,
            content,
            start: placed.start,
            end,
            kind,
            group,
            class_names,
            is_milestone: event.is_milestone(),
            suppress_milestone_decorations: gantt && event.is_milestone(),
            conflict_badge: badge,
            narrative_marker: narrative,
            approximate: placed.parsed.approximate,
            display_date,
            tooltip,
        }
    }

    // =========================================================================
    // Eras
    // =========================================================================

    fn backgrounds(&self) -> Vec<TimelineBackground> {
        let mut out = Vec::new();
        for era in &self.config.eras {
            let start_parsed = parse_date(&era.start, &self.opts);
            let Some(start) = to_millis(&start_parsed) else {
                tracing::warn!(era = %era.name, start = %era.start, "Era start did not parse, skipping");
                continue;
            };
            let end = match era.end.as_deref().and_then(none_if_blank) {
                Some(text) => end_or_start_millis(&parse_date(text, &self.opts)),
                None => end_or_start_millis(&start_parsed),
            };
            let Some(end) = end else {
                tracing::warn!(era = %era.name, end = ?era.end, "Era end did not parse, skipping");
                continue;
            };
            out.push(TimelineBackground {
                label: era.name.clone(),
                start: start.min(end),
                end: start.max(end),
                color: era
                    .color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ERA_COLOR.to_string()),
            });
        }
        out
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn catch_all_label(mode: GroupingMode) -> &'static str {
    match mode {
        GroupingMode::Location => "No location",
        GroupingMode::Character => "No character",
        GroupingMode::Group => "Ungrouped",
        GroupingMode::Track | GroupingMode::None => "Unassigned",
    }
}

/// Arrows only connect events that made it onto the timeline.
fn dependency_edges(placed: &[Placed<'_>]) -> Vec<DependencyEdge> {
    let index = EventIndex::build_from(placed.iter().map(|p| p.event));
    let mut edges = Vec::new();
    for p in placed {
        for dependency in p.event.dependencies() {
            let Some(dependency) = none_if_blank(dependency) else {
                continue;
            };
            match index.resolve(dependency) {
                Some(from) if from != p.event.id() => {
                    let edge = DependencyEdge {
                        from,
                        to: p.event.id(),
                    };
                    if !edges.contains(&edge) {
                        edges.push(edge);
                    }
                }
                Some(_) => {}
                None => {
                    tracing::debug!(
                        event = %p.event.name(),
                        dependency = %dependency,
                        "Dependency not on timeline, skipping arrow"
                    );
                }
            }
        }
    }
    edges
}

fn tooltip(
    name: &str,
    display_date: &str,
    event: &Event,
    locations: &LocationIndex,
    conflicts: &[&DetectedConflict],
) -> String {
    let mut lines = vec![name.to_string(), display_date.to_string()];
    if let Some(location) = event.location().and_then(none_if_blank) {
        lines.push(format!("Location: {}", locations.display_name(location)));
    }
    if let Some(description) = event.description().and_then(none_if_blank) {
        lines.push(truncate_chars(description, TOOLTIP_DESCRIPTION_CHARS));
    }
    for (severity, heading) in [(Severity::Error, "Errors:"), (Severity::Warning, "Warnings:")] {
        let matching: Vec<&&DetectedConflict> =
            conflicts.iter().filter(|c| c.severity == severity).collect();
        if matching.is_empty() {
            continue;
        }
        lines.push(heading.to_string());
        for conflict in matching.iter().take(TOOLTIP_CONFLICTS_PER_SEVERITY) {
            lines.push(format!("- {}", conflict.message));
        }
        if matching.len() > TOOLTIP_CONFLICTS_PER_SEVERITY {
            lines.push(format!(
                "...and {} more",
                matching.len() - TOOLTIP_CONFLICTS_PER_SEVERITY
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflicts::{ConflictDetector, ConflictEvent, ConflictType};
    use crate::value_objects::{EraDefinition, Fork, TrackDefinition};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn opts() -> ParseOptions {
        ParseOptions::new(
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn build(events: &[Event], config: &TimelineConfig) -> TimelineDataset {
        TimelineBuilder::new(events, config, opts()).build()
    }

    fn names(dataset: &TimelineDataset, events: &[Event]) -> Vec<String> {
        dataset
            .items
            .iter()
            .map(|i| events[i.event_index].name().to_string())
            .collect()
    }

    fn warning(event: &Event, message: &str) -> DetectedConflict {
        DetectedConflict {
            conflict_type: ConflictType::TemporalOverlap,
            severity: Severity::Warning,
            message: message.to_string(),
            events: vec![ConflictEvent {
                id: event.id(),
                name: event.name().to_string(),
            }],
            entities: Vec::new(),
            suggestion: None,
            dismissed: false,
            detected: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    mod placement {
        use super::*;

        #[test]
        fn gantt_mode_synthesizes_default_duration() {
            let events = vec![Event::new("A").with_date_time("2024-01-01")];
            let config = TimelineConfig::default().with_gantt(true);
            let item = &build(&events, &config).items[0];
            assert_eq!(item.end, Some(item.start + MILLIS_PER_DAY));
            assert_eq!(item.kind, ItemKind::Range);
        }

        #[test]
        fn point_mode_has_no_end() {
            let events = vec![Event::new("A").with_date_time("2024-01-01")];
            let item = &build(&events, &TimelineConfig::default()).items[0];
            assert_eq!(item.end, None);
            assert_eq!(item.kind, ItemKind::Point);
        }

        #[test]
        fn explicit_ranges_keep_their_end_in_gantt_mode() {
            let events = vec![Event::new("A").with_date_time("2024-01-01 to 2024-01-10")];
            let config = TimelineConfig::default().with_gantt(true);
            let item = &build(&events, &config).items[0];
            assert_eq!(item.end, Some(item.start + 9 * MILLIS_PER_DAY));
        }

        #[test]
        fn milestones_suppress_decorations_only_in_gantt_mode() {
            let events = vec![Event::new("M").with_date_time("1200").with_milestone(true)];
            let gantt = build(&events, &TimelineConfig::default().with_gantt(true));
            assert!(gantt.items[0].suppress_milestone_decorations);
            assert!(gantt.items[0].end.is_some());
            let plain = build(&events, &TimelineConfig::default());
            assert!(!plain.items[0].suppress_milestone_decorations);
        }

        #[test]
        fn undated_and_unparseable_events_are_left_out() {
            let events = vec![
                Event::new("A").with_date_time("1200"),
                Event::new("B"),
                Event::new("C").with_date_time("whenever"),
            ];
            assert_eq!(names(&build(&events, &TimelineConfig::default()), &events), vec!["A"]);
        }

        #[test]
        fn items_are_chronological_with_bce_first() {
            let events = vec![
                Event::new("C").with_date_time("10 CE"),
                Event::new("A").with_date_time("100 BCE"),
                Event::new("B").with_date_time("50 BCE"),
            ];
            let dataset = build(&events, &TimelineConfig::default());
            assert_eq!(names(&dataset, &events), vec!["A", "B", "C"]);
        }
    }

    mod narrative_order {
        use super::*;

        #[test]
        fn sorts_by_sequence_with_unsequenced_last() {
            let events = vec![
                Event::new("Unsequenced").with_date_time("1100"),
                Event::new("Second").with_date_time("1000").with_narrative_sequence(2),
                Event::new("First").with_date_time("1300").with_narrative_sequence(1),
                Event::new("Also unsequenced").with_date_time("900"),
            ];
            let config = TimelineConfig::default().with_narrative_order(true);
            let dataset = build(&events, &config);
            assert_eq!(
                names(&dataset, &events),
                vec!["First", "Second", "Unsequenced", "Also unsequenced"]
            );
            assert_eq!(dataset.items[0].content, "[1] First");
            assert_eq!(dataset.items[2].content, "Unsequenced");
        }
    }

    mod content {
        use super::*;

        #[test]
        fn prefix_precedence() {
            let mut event = Event::new("Vision")
                .with_date_time("1200")
                .with_milestone(true)
                .with_narrative_sequence(4);
            event.set_flashforward();
            let events = vec![event];
            let conflicts = vec![warning(&events[0], "overlap")];
            let config = TimelineConfig::default().with_narrative_order(true);
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .conflicts(&conflicts)
                .build();
            assert_eq!(dataset.items[0].content, "⚠ ↪ ◆ [4] Vision");
        }

        #[test]
        fn error_badge_beats_warning() {
            let events = vec![Event::new("A").with_date_time("1200")];
            let mut error = warning(&events[0], "boom");
            error.severity = Severity::Error;
            let conflicts = vec![warning(&events[0], "meh"), error];
            let config = TimelineConfig::default();
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .conflicts(&conflicts)
                .build();
            assert_eq!(dataset.items[0].conflict_badge, Some(Severity::Error));
            assert!(dataset.items[0].content.starts_with("⛔ "));
        }

        #[test]
        fn dismissed_conflicts_have_no_badge() {
            let events = vec![Event::new("A").with_date_time("1200")];
            let mut conflict = warning(&events[0], "meh");
            conflict.dismissed = true;
            let conflicts = vec![conflict];
            let config = TimelineConfig::default();
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .conflicts(&conflicts)
                .build();
            assert_eq!(dataset.items[0].conflict_badge, None);
            assert_eq!(dataset.items[0].content, "A");
        }

        #[test]
        fn blank_name_gets_placeholder() {
            let events = vec![Event::new("   ").with_date_time("1200")];
            let dataset = build(&events, &TimelineConfig::default());
            assert_eq!(dataset.items[0].content, UNTITLED_EVENT);
        }

        #[test]
        fn tooltip_truncates_conflict_lists() {
            let event = Event::new("Siege")
                .with_date_time("1200")
                .with_location("Keep")
                .with_description("x".repeat(200));
            let events = vec![event];
            let conflicts: Vec<DetectedConflict> = (0..5)
                .map(|i| {
                    let mut c = warning(&events[0], &format!("warning {i}"));
                    c.events.push(ConflictEvent {
                        id: crate::ids::EventId::new(),
                        name: format!("Other {i}"),
                    });
                    c
                })
                .collect();
            let config = TimelineConfig::default();
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .conflicts(&conflicts)
                .build();
            let lines: Vec<&str> = dataset.items[0].tooltip.lines().collect();
            assert_eq!(lines[0], "Siege");
            assert_eq!(lines[1], "1200");
            assert_eq!(lines[2], "Location: Keep");
            assert_eq!(lines[3].chars().count(), TOOLTIP_DESCRIPTION_CHARS + 3);
            assert_eq!(lines[4], "Warnings:");
            assert_eq!(lines[5], "- warning 0");
            assert_eq!(lines[8], "...and 2 more");
            assert_eq!(lines.len(), 9);
        }
    }

    mod filtering {
        use super::*;

        fn forked_config() -> TimelineConfig {
            TimelineConfig::default().with_fork(Fork {
                id: "alt".into(),
                name: "Alternate".into(),
                event_names: vec!["Betrayal".into()],
            })
        }

        #[test]
        fn main_view_excludes_forked_events() {
            let events = vec![
                Event::new("Coronation").with_date_time("1200"),
                Event::new("Betrayal").with_date_time("1201"),
            ];
            let dataset = build(&events, &forked_config());
            assert_eq!(names(&dataset, &events), vec!["Coronation"]);
        }

        #[test]
        fn fork_view_includes_only_that_fork() {
            let events = vec![
                Event::new("Coronation").with_date_time("1200"),
                Event::new("Betrayal").with_date_time("1201"),
            ];
            let config = forked_config();
            let filters = TimelineFilters {
                fork: Some("alt".into()),
                ..TimelineFilters::default()
            };
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .filters(&filters)
                .build();
            assert_eq!(names(&dataset, &events), vec!["Betrayal"]);
        }

        #[test]
        fn milestone_character_and_location_filters() {
            let events = vec![
                Event::new("A")
                    .with_date_time("1200")
                    .with_milestone(true)
                    .with_character("Alice")
                    .with_location("Keep"),
                Event::new("B")
                    .with_date_time("1201")
                    .with_milestone(true)
                    .with_character("Bob")
                    .with_location("Keep"),
                Event::new("C").with_date_time("1202").with_character("Alice"),
            ];
            let config = TimelineConfig::default();
            let filters = TimelineFilters {
                milestones_only: true,
                characters: vec!["alice".into()],
                locations: vec!["keep".into()],
                ..TimelineFilters::default()
            };
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .filters(&filters)
                .build();
            assert_eq!(names(&dataset, &events), vec!["A"]);
        }

        #[test]
        fn group_filter_matches_id_or_name() {
            let guild = Group::new("Thieves Guild");
            let events = vec![
                Event::new("Heist")
                    .with_date_time("1200")
                    .with_group(guild.id().to_string()),
                Event::new("Parade").with_date_time("1201"),
            ];
            let config = TimelineConfig::default();
            let groups = vec![guild];
            let filters = TimelineFilters {
                groups: vec!["thieves guild".into()],
                ..TimelineFilters::default()
            };
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .groups(&groups)
                .filters(&filters)
                .build();
            assert_eq!(names(&dataset, &events), vec!["Heist"]);
        }
    }

    mod grouping {
        use super::*;

        #[test]
        fn no_grouping_has_no_groups_or_legend() {
            let events = vec![Event::new("A").with_date_time("1200")];
            let dataset = build(&events, &TimelineConfig::default());
            assert!(dataset.groups.is_none());
            assert!(dataset.legend.is_empty());
            assert_eq!(dataset.items[0].group, None);
        }

        #[test]
        fn location_groups_are_sorted_with_catch_all_last() {
            let events = vec![
                Event::new("A").with_date_time("1200").with_location("Keep"),
                Event::new("B").with_date_time("1201"),
                Event::new("C").with_date_time("1202").with_location("Abbey"),
                Event::new("D").with_date_time("1203").with_location("keep"),
            ];
            let config = TimelineConfig::default().with_grouping(GroupingMode::Location);
            let dataset = build(&events, &config);
            let groups = dataset.groups.unwrap();
            let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
            assert_eq!(labels, vec!["Abbey", "Keep", "No location"]);
            assert_eq!(groups[2].color, NEUTRAL_COLOR);
            assert_eq!(groups[0].color, GROUP_PALETTE[0]);
            assert_eq!(dataset.legend.len(), 3);
            assert_eq!(dataset.items[0].group, dataset.items[3].group);
        }

        #[test]
        fn tracks_follow_config_order_and_colors() {
            let events = vec![
                Event::new("Battle").with_date_time("1200"),
                Event::new("Wedding").with_date_time("1201"),
                Event::new("Famine").with_date_time("1202"),
            ];
            let config = TimelineConfig::default()
                .with_grouping(GroupingMode::Track)
                .with_track(TrackDefinition {
                    id: "romance".into(),
                    name: "Romance".into(),
                    color: Some("#ff0000".into()),
                    event_names: vec!["wedding".into()],
                })
                .with_track(TrackDefinition {
                    id: "war".into(),
                    name: "War".into(),
                    color: None,
                    event_names: vec!["Battle".into()],
                });
            let groups = build(&events, &config).groups.unwrap();
            let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
            assert_eq!(labels, vec!["Romance", "War", "Unassigned"]);
            assert_eq!(groups[0].color, "#ff0000");
        }

        #[test]
        fn group_mode_uses_group_color() {
            let guild = Group::new("Guild").with_color("#123456");
            let events = vec![Event::new("Heist").with_date_time("1200").with_group("guild")];
            let groups = vec![guild];
            let config = TimelineConfig::default().with_grouping(GroupingMode::Group);
            let dataset = TimelineBuilder::new(&events, &config, opts())
                .groups(&groups)
                .build();
            let lanes = dataset.groups.unwrap();
            assert_eq!(lanes.len(), 1);
            assert_eq!(lanes[0].color, "#123456");
            assert_eq!(lanes[0].label, "Guild");
        }
    }

    mod arrows {
        use super::*;

        #[test]
        fn unresolved_and_filtered_dependencies_are_skipped() {
            let events = vec![
                Event::new("Cause").with_date_time("1200"),
                Event::new("Effect")
                    .with_date_time("1201")
                    .with_dependency("cause")
                    .with_dependency("Ghost")
                    .with_dependency("Undated"),
                Event::new("Undated"),
            ];
            let dataset = build(&events, &TimelineConfig::default());
            assert_eq!(
                dataset.dependencies,
                vec![DependencyEdge {
                    from: events[0].id(),
                    to: events[1].id()
                }]
            );
        }
    }

    mod eras {
        use super::*;

        #[test]
        fn parseable_eras_become_backgrounds() {
            let config = TimelineConfig::default()
                .with_era(EraDefinition {
                    name: "Old Kingdom".into(),
                    start: "3000 BCE".into(),
                    end: Some("2000 BCE".into()),
                    color: None,
                })
                .with_era(EraDefinition {
                    name: "Broken".into(),
                    start: "the before times".into(),
                    end: None,
                    color: None,
                });
            let dataset = build(&[], &config);
            assert_eq!(dataset.backgrounds.len(), 1);
            assert_eq!(dataset.backgrounds[0].label, "Old Kingdom");
            assert!(dataset.backgrounds[0].start < dataset.backgrounds[0].end);
        }
    }

    #[test]
    fn detector_output_feeds_badges() {
        let events = vec![
            Event::new("A").with_dependency("B"),
            Event::new("B").with_date_time("1200").with_dependency("A"),
        ];
        let conflicts =
            ConflictDetector::new(opts()).detect_all(&events, Utc.timestamp_opt(0, 0).unwrap());
        let config = TimelineConfig::default();
        let dataset = TimelineBuilder::new(&events, &config, opts())
            .conflicts(&conflicts)
            .build();
        assert_eq!(dataset.items.len(), 1);
        assert_eq!(dataset.items[0].conflict_badge, Some(Severity::Error));
    }
}
