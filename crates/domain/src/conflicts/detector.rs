//! Conflict detection over a snapshot of events
//!
//! A pass is a pure function of its inputs. Events whose dates do not parse
//! are left out of the time-based checks; they still take part in dependency
//! and narrative checks, which only look at names.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::types::{ConflictEvent, ConflictType, DetectedConflict, Severity};
use crate::common::none_if_blank;
use crate::entities::{Event, Location};
use crate::index::{EventIndex, LocationIndex};
use crate::temporal::{end_or_start_millis, parse_date, to_millis, ParseOptions};

/// Detects overlaps, impossible travel, dependency problems and narrative
/// marker problems.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    opts: ParseOptions,
    locations: LocationIndex,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: i64,
    end: i64,
}

impl Span {
    fn intersects(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Accumulates conflicts, merging entities of findings with the same identity.
#[derive(Default)]
struct Collector {
    conflicts: Vec<DetectedConflict>,
    seen: HashMap<String, usize>,
}

impl Collector {
    fn push(&mut self, conflict: DetectedConflict) {
        let key = conflict.identity();
        match self.seen.get(&key) {
            Some(&existing) => {
                let target = &mut self.conflicts[existing];
                for entity in conflict.entities {
                    if !target.entities.contains(&entity) {
                        target.entities.push(entity);
                    }
                }
            }
            None => {
                self.seen.insert(key, self.conflicts.len());
                self.conflicts.push(conflict);
            }
        }
    }
}

impl ConflictDetector {
    pub fn new(opts: ParseOptions) -> Self {
        Self {
            opts,
            locations: LocationIndex::default(),
        }
    }

    /// Lets location references by id and by name compare equal.
    pub fn with_locations(mut self, locations: &[Location]) -> Self {
        self.locations = LocationIndex::build(locations);
        self
    }

    /// Runs every check and returns deduplicated conflicts.
    pub fn detect_all(&self, events: &[Event], detected_at: DateTime<Utc>) -> Vec<DetectedConflict> {
        let spans: Vec<Option<Span>> = events.iter().map(|e| self.span_of(e)).collect();
        let index = EventIndex::build(events);
        let mut out = Collector::default();

        self.detect_overlaps(events, &spans, detected_at, &mut out);
        self.detect_travel(events, &spans, detected_at, &mut out);
        detect_dependencies(events, &index, detected_at, &mut out);
        detect_narrative(events, &index, detected_at, &mut out);

        let conflicts = out.conflicts;
        tracing::debug!(
            events = events.len(),
            conflicts = conflicts.len(),
            errors = conflicts.iter().filter(|c| c.is_error()).count(),
            "Conflict detection pass complete"
        );
        conflicts
    }

    fn span_of(&self, event: &Event) -> Option<Span> {
        let text = event.date_time()?;
        let parsed = parse_date(text, &self.opts);
        let start = to_millis(&parsed)?;
        let end = end_or_start_millis(&parsed).unwrap_or(start);
        Some(Span { start, end })
    }

    fn location_key(&self, event: &Event) -> Option<String> {
        event
            .location()
            .and_then(none_if_blank)
            .map(|loc| self.locations.key(loc))
    }

    fn detect_overlaps(
        &self,
        events: &[Event],
        spans: &[Option<Span>],
        detected_at: DateTime<Utc>,
        out: &mut Collector,
    ) {
        for i in 0..events.len() {
            let Some(a) = spans[i] else { continue };
            for j in (i + 1)..events.len() {
                let Some(b) = spans[j] else { continue };
                if !a.intersects(&b) {
                    continue;
                }
                let shared = self.shared_entities(&events[i], &events[j]);
                if shared.is_empty() {
                    continue;
                }
                let (first, second) = (&events[i], &events[j]);
                out.push(DetectedConflict {
                    conflict_type: ConflictType::TemporalOverlap,
                    severity: Severity::Warning,
                    message: format!(
                        "\"{}\" and \"{}\" overlap in time and share {}",
                        first.name(),
                        second.name(),
                        shared.join(", ")
                    ),
                    events: vec![conflict_event(first), conflict_event(second)],
                    entities: shared,
                    suggestion: Some(
                        "Adjust one of the dates or change who is involved".to_string(),
                    ),
                    dismissed: false,
                    detected: detected_at,
                });
            }
        }
    }

    fn shared_entities(&self, a: &Event, b: &Event) -> Vec<String> {
        let mut shared = Vec::new();
        for character in a.characters() {
            let key = character.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let in_b = b
                .characters()
                .iter()
                .any(|other| other.trim().to_lowercase() == key);
            let name = character.trim().to_string();
            if in_b && !shared.contains(&name) {
                shared.push(name);
            }
        }
        if let (Some(la), Some(lb)) = (self.location_key(a), self.location_key(b)) {
            if la == lb {
                let raw = a.location().unwrap_or_default();
                shared.push(self.locations.display_name(raw.trim()).to_string());
            }
        }
        shared
    }

    fn detect_travel(
        &self,
        events: &[Event],
        spans: &[Option<Span>],
        detected_at: DateTime<Utc>,
        out: &mut Collector,
    ) {
        // character key -> (display name, events placed in time and space)
        let mut itineraries: BTreeMap<String, (String, Vec<usize>)> = BTreeMap::new();
        for (idx, event) in events.iter().enumerate() {
            if spans[idx].is_none() || self.location_key(event).is_none() {
                continue;
            }
            for character in event.characters() {
                let key = character.trim().to_lowercase();
                if key.is_empty() {
                    continue;
                }
                let entry = itineraries
                    .entry(key)
                    .or_insert_with(|| (character.trim().to_string(), Vec::new()));
                if !entry.1.contains(&idx) {
                    entry.1.push(idx);
                }
            }
        }

        for (character, mut stops) in itineraries.into_values() {
            stops.sort_by_key(|&idx| (spans[idx].map(|s| s.start), idx));
            for pair in stops.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                let (Some(prev_span), Some(next_span)) = (spans[prev], spans[next]) else {
                    continue;
                };
                let (Some(from), Some(to)) = (
                    self.location_key(&events[prev]),
                    self.location_key(&events[next]),
                ) else {
                    continue;
                };
                if from == to || next_span.start - prev_span.end > 0 {
                    continue;
                }
                let from_name = self
                    .locations
                    .display_name(events[prev].location().unwrap_or_default().trim())
                    .to_string();
                let to_name = self
                    .locations
                    .display_name(events[next].location().unwrap_or_default().trim())
                    .to_string();
                out.push(DetectedConflict {
                    conflict_type: ConflictType::TravelImpossible,
                    severity: Severity::Error,
                    message: format!(
                        "{character} cannot be at {from_name} for \"{}\" and at {to_name} for \"{}\" with no time to travel",
                        events[prev].name(),
                        events[next].name()
                    ),
                    events: vec![conflict_event(&events[prev]), conflict_event(&events[next])],
                    entities: vec![character.clone(), from_name, to_name],
                    suggestion: Some("Leave time between the events for the journey".to_string()),
                    dismissed: false,
                    detected: detected_at,
                });
            }
        }
    }
}

fn conflict_event(event: &Event) -> ConflictEvent {
    ConflictEvent {
        id: event.id(),
        name: event.name().to_string(),
    }
}

fn detect_dependencies(
    events: &[Event],
    index: &EventIndex,
    detected_at: DateTime<Utc>,
    out: &mut Collector,
) {
    // edge i -> j: event i depends on event j
    let mut graph: Vec<Vec<usize>> = vec![Vec::new(); events.len()];
    for (idx, event) in events.iter().enumerate() {
        let mut missing = Vec::new();
        for dependency in event.dependencies() {
            let Some(dependency) = none_if_blank(dependency) else {
                continue;
            };
            match index.position(dependency) {
                Some(target) if !graph[idx].contains(&target) => graph[idx].push(target),
                Some(_) => {}
                None => missing.push(dependency.to_string()),
            }
        }
        if missing.is_empty() {
            continue;
        }
        let quoted: Vec<String> = missing.iter().map(|m| format!("\"{m}\"")).collect();
        out.push(DetectedConflict {
            conflict_type: ConflictType::DependencyMissing,
            severity: Severity::Warning,
            message: format!(
                "\"{}\" depends on unknown event {}",
                event.name(),
                quoted.join(", ")
            ),
            events: vec![conflict_event(event)],
            entities: missing,
            suggestion: Some("Check the spelling or create the missing event".to_string()),
            dismissed: false,
            detected: detected_at,
        });
    }

    for cycle in find_cycles(&graph) {
        let mut names: Vec<&str> = cycle.iter().map(|&i| events[i].name()).collect();
        if let Some(&first) = names.first() {
            names.push(first);
        }
        out.push(DetectedConflict {
            conflict_type: ConflictType::DependencyCycle,
            severity: Severity::Error,
            message: format!("Circular dependency: {}", names.join(" -> ")),
            events: cycle.iter().map(|&i| conflict_event(&events[i])).collect(),
            entities: Vec::new(),
            suggestion: Some("Remove one dependency to break the cycle".to_string()),
            dismissed: false,
            detected: detected_at,
        });
    }
}

/// Depth-first search with recursion-stack coloring. Each back edge yields the
/// stack slice from its target to the current node.
fn find_cycles(graph: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut color = vec![Color::White; graph.len()];
    let mut cycles = Vec::new();

    for root in 0..graph.len() {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Gray;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(&child) = graph[node].get(frame.1) else {
                color[node] = Color::Black;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match color[child] {
                Color::White => {
                    color[child] = Color::Gray;
                    stack.push((child, 0));
                }
                Color::Gray => {
                    let from = stack.iter().position(|(n, _)| *n == child).unwrap_or(0);
                    cycles.push(stack[from..].iter().map(|(n, _)| *n).collect());
                }
                Color::Black => {}
            }
        }
    }
    cycles
}

fn detect_narrative(
    events: &[Event],
    index: &EventIndex,
    detected_at: DateTime<Utc>,
    out: &mut Collector,
) {
    for event in events {
        let Some(markers) = event.narrative_markers() else {
            continue;
        };
        let mut problems = Vec::new();
        let mut entities = Vec::new();
        let mut severity = Severity::Warning;

        if markers.is_contradictory() {
            problems.push("is marked as both a flashback and a flash-forward".to_string());
            severity = Severity::Error;
        }
        if let Some(target) = markers.target_event.as_deref().and_then(none_if_blank) {
            if !index.contains(target) {
                problems.push(format!("points at unknown event \"{target}\""));
                entities.push(target.to_string());
            }
        }
        if problems.is_empty() {
            continue;
        }
        out.push(DetectedConflict {
            conflict_type: ConflictType::NarrativeInconsistency,
            severity,
            message: format!("\"{}\" {}", event.name(), problems.join(" and ")),
            events: vec![conflict_event(event)],
            entities,
            suggestion: Some("Review the event's narrative markers".to_string()),
            dismissed: false,
            detected: detected_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::NarrativeMarkers;
    use chrono::{NaiveDate, TimeZone};

    fn detector() -> ConflictDetector {
        let reference = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ConflictDetector::new(ParseOptions::new(reference))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn of_type(conflicts: &[DetectedConflict], kind: ConflictType) -> Vec<&DetectedConflict> {
        conflicts.iter().filter(|c| c.conflict_type == kind).collect()
    }

    mod overlap {
        use super::*;

        #[test]
        fn shared_character_overlap_is_reported_once_regardless_of_order() {
            let e1 = Event::new("Duel")
                .with_date_time("2024-03-01 to 2024-03-05")
                .with_character("Alice")
                .with_location("Arena");
            let e2 = Event::new("Feast")
                .with_date_time("2024-03-04 to 2024-03-06")
                .with_character("alice")
                .with_location("Arena");

            for events in [vec![e1.clone(), e2.clone()], vec![e2, e1]] {
                let conflicts = detector().detect_all(&events, now());
                let overlaps = of_type(&conflicts, ConflictType::TemporalOverlap);
                assert_eq!(overlaps.len(), 1);
                assert_eq!(overlaps[0].identity(), "temporal-overlap:Duel|Feast");
                assert_eq!(overlaps[0].severity, Severity::Warning);
            }
        }

        #[test]
        fn shared_location_alone_triggers_overlap() {
            let events = vec![
                Event::new("A")
                    .with_date_time("1200 to 1210")
                    .with_location("Tavern")
                    .with_character("Bob"),
                Event::new("B")
                    .with_date_time("1205")
                    .with_location("tavern")
                    .with_character("Carol"),
            ];
            let conflicts = detector().detect_all(&events, now());
            let overlaps = of_type(&conflicts, ConflictType::TemporalOverlap);
            assert_eq!(overlaps.len(), 1);
            assert_eq!(overlaps[0].entities, vec!["Tavern".to_string()]);
        }

        #[test]
        fn location_by_id_matches_location_by_name() {
            let tavern = Location::new("Tavern");
            let events = vec![
                Event::new("A").with_date_time("1200").with_location(tavern.id().to_string()),
                Event::new("B").with_date_time("1200").with_location("Tavern"),
            ];
            let conflicts = detector()
                .with_locations(std::slice::from_ref(&tavern))
                .detect_all(&events, now());
            let overlaps = of_type(&conflicts, ConflictType::TemporalOverlap);
            assert_eq!(overlaps.len(), 1);
            assert_eq!(overlaps[0].entities, vec!["Tavern".to_string()]);
        }

        #[test]
        fn disjoint_or_unrelated_events_do_not_conflict() {
            let events = vec![
                Event::new("A").with_date_time("1200").with_character("Alice"),
                Event::new("B").with_date_time("1201").with_character("Alice"),
                Event::new("C").with_date_time("1200").with_character("Bob"),
            ];
            let conflicts = detector().detect_all(&events, now());
            assert!(of_type(&conflicts, ConflictType::TemporalOverlap).is_empty());
        }

        #[test]
        fn unparseable_dates_are_skipped() {
            let events = vec![
                Event::new("A").with_date_time("sometime").with_character("Alice"),
                Event::new("B").with_date_time("1200").with_character("Alice"),
            ];
            assert!(detector().detect_all(&events, now()).is_empty());
        }
    }

    mod travel {
        use super::*;

        #[test]
        fn same_instant_at_different_places_is_an_error() {
            let events = vec![
                Event::new("Coronation")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_location("Capital"),
                Event::new("Shipwreck")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_location("Coast"),
            ];
            let conflicts = detector().detect_all(&events, now());
            let travel = of_type(&conflicts, ConflictType::TravelImpossible);
            assert_eq!(travel.len(), 1);
            assert_eq!(travel[0].severity, Severity::Error);
            assert_eq!(travel[0].entities, vec!["Alice", "Capital", "Coast"]);
        }

        #[test]
        fn positive_gap_is_accepted() {
            let events = vec![
                Event::new("A")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_location("Capital"),
                Event::new("B")
                    .with_date_time("2024-05-02")
                    .with_character("Alice")
                    .with_location("Coast"),
            ];
            let conflicts = detector().detect_all(&events, now());
            assert!(of_type(&conflicts, ConflictType::TravelImpossible).is_empty());
        }

        #[test]
        fn same_place_is_never_travel() {
            let events = vec![
                Event::new("A")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_location("Capital"),
                Event::new("B")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_location("capital"),
            ];
            let conflicts = detector().detect_all(&events, now());
            assert!(of_type(&conflicts, ConflictType::TravelImpossible).is_empty());
        }

        #[test]
        fn two_shared_characters_yield_one_conflict() {
            let events = vec![
                Event::new("A")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_character("Bob")
                    .with_location("Capital"),
                Event::new("B")
                    .with_date_time("2024-05-01")
                    .with_character("Alice")
                    .with_character("Bob")
                    .with_location("Coast"),
            ];
            let conflicts = detector().detect_all(&events, now());
            let travel = of_type(&conflicts, ConflictType::TravelImpossible);
            assert_eq!(travel.len(), 1);
            assert!(travel[0].entities.contains(&"Bob".to_string()));
        }
    }

    mod dependencies {
        use super::*;

        #[test]
        fn three_event_cycle_is_reported() {
            let events = vec![
                Event::new("A").with_dependency("B"),
                Event::new("B").with_dependency("C"),
                Event::new("C").with_dependency("A"),
            ];
            let conflicts = detector().detect_all(&events, now());
            let cycles = of_type(&conflicts, ConflictType::DependencyCycle);
            assert_eq!(cycles.len(), 1);
            assert_eq!(cycles[0].severity, Severity::Error);
            assert_eq!(cycles[0].identity(), "dependency-cycle:A|B|C");
            assert_eq!(cycles[0].message, "Circular dependency: A -> B -> C -> A");
        }

        #[test]
        fn acyclic_chain_is_clean() {
            let events = vec![
                Event::new("A").with_dependency("B"),
                Event::new("B").with_dependency("C"),
                Event::new("C"),
            ];
            assert!(detector().detect_all(&events, now()).is_empty());
        }

        #[test]
        fn self_dependency_is_a_cycle() {
            let events = vec![Event::new("A").with_dependency("a!")];
            let conflicts = detector().detect_all(&events, now());
            assert_eq!(of_type(&conflicts, ConflictType::DependencyCycle).len(), 1);
        }

        #[test]
        fn missing_dependencies_merge_into_one_warning() {
            let events = vec![Event::new("A")
                .with_dependency("Ghost")
                .with_dependency("Phantom")
                .with_dependency("  ")];
            let conflicts = detector().detect_all(&events, now());
            let missing = of_type(&conflicts, ConflictType::DependencyMissing);
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].severity, Severity::Warning);
            assert_eq!(missing[0].entities, vec!["Ghost", "Phantom"]);
        }

        #[test]
        fn sanitized_names_resolve() {
            let events = vec![
                Event::new("The Fall of Rome"),
                Event::new("Aftermath").with_dependency("the fall of rome!!"),
            ];
            assert!(detector().detect_all(&events, now()).is_empty());
        }
    }

    mod narrative {
        use super::*;

        #[test]
        fn unknown_target_is_a_warning() {
            let events = vec![Event::new("Memory")
                .with_narrative_markers(NarrativeMarkers::flashback().with_target_event("Ghost"))];
            let conflicts = detector().detect_all(&events, now());
            let narrative = of_type(&conflicts, ConflictType::NarrativeInconsistency);
            assert_eq!(narrative.len(), 1);
            assert_eq!(narrative[0].severity, Severity::Warning);
        }

        #[test]
        fn known_target_is_clean() {
            let events = vec![
                Event::new("Origin"),
                Event::new("Memory").with_narrative_markers(
                    NarrativeMarkers::flashback().with_target_event("origin"),
                ),
            ];
            assert!(detector().detect_all(&events, now()).is_empty());
        }

        #[test]
        fn both_flags_is_an_error() {
            let markers = NarrativeMarkers {
                is_flashback: true,
                is_flashforward: true,
                ..NarrativeMarkers::default()
            };
            let events = vec![Event::new("Muddle").with_narrative_markers(markers)];
            let conflicts = detector().detect_all(&events, now());
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].severity, Severity::Error);
            assert_eq!(conflicts[0].detected, now());
        }
    }
}
