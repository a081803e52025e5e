//! Conflict records produced by a detection pass

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::sanitize_name;
use crate::ids::EventId;
use crate::value_objects::TimelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictType {
    TemporalOverlap,
    TravelImpossible,
    DependencyCycle,
    DependencyMissing,
    NarrativeInconsistency,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemporalOverlap => "temporal-overlap",
            Self::TravelImpossible => "travel-impossible",
            Self::DependencyCycle => "dependency-cycle",
            Self::DependencyMissing => "dependency-missing",
            Self::NarrativeInconsistency => "narrative-inconsistency",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors sort before warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// An event implicated in a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEvent {
    pub id: EventId,
    pub name: String,
}

/// One finding from a detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedConflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub message: String,
    pub events: Vec<ConflictEvent>,
    /// Characters, locations or dangling names involved
    pub entities: Vec<String>,
    pub suggestion: Option<String>,
    pub dismissed: bool,
    pub detected: DateTime<Utc>,
}

impl DetectedConflict {
    /// Key used for deduplication and for carrying dismissal across passes:
    /// the type plus the participant names, sorted.
    pub fn identity(&self) -> String {
        let mut names: Vec<&str> = self.events.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        format!("{}:{}", self.conflict_type, names.join("|"))
    }

    pub fn involves(&self, event_id: EventId) -> bool {
        self.events.iter().any(|e| e.id == event_id)
    }

    /// Sanitized name match, for callers that only hold a name.
    pub fn involves_name(&self, name: &str) -> bool {
        let key = sanitize_name(name);
        !key.is_empty() && self.events.iter().any(|e| sanitize_name(&e.name) == key)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Counts over a conflict list. Dismissed conflicts only count as dismissed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub errors: usize,
    pub warnings: usize,
    pub dismissed: usize,
}

impl ConflictSummary {
    pub fn from_conflicts(conflicts: &[DetectedConflict]) -> Self {
        conflicts.iter().fold(Self::default(), |mut acc, c| {
            match (c.dismissed, c.severity) {
                (true, _) => acc.dismissed += 1,
                (false, Severity::Error) => acc.errors += 1,
                (false, Severity::Warning) => acc.warnings += 1,
            }
            acc
        })
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

/// Conflicts naming the given event, matched by sanitized name.
pub fn conflicts_for_event<'a>(
    conflicts: &'a [DetectedConflict],
    event_name: &str,
) -> Vec<&'a DetectedConflict> {
    conflicts
        .iter()
        .filter(|c| c.involves_name(event_name))
        .collect()
}

/// Marks conflicts whose identity the user has dismissed. Returns how many
/// were marked.
pub fn apply_dismissals(conflicts: &mut [DetectedConflict], config: &TimelineConfig) -> usize {
    let mut marked = 0;
    for conflict in conflicts.iter_mut() {
        conflict.dismissed = config.is_dismissed(&conflict.identity());
        if conflict.dismissed {
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn conflict(kind: ConflictType, severity: Severity, names: &[&str]) -> DetectedConflict {
        DetectedConflict {
            conflict_type: kind,
            severity,
            message: String::new(),
            events: names
                .iter()
                .map(|n| ConflictEvent {
                    id: EventId::new(),
                    name: n.to_string(),
                })
                .collect(),
            entities: Vec::new(),
            suggestion: None,
            dismissed: false,
            detected: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn identity_is_order_independent() {
        let a = conflict(ConflictType::TemporalOverlap, Severity::Warning, &["B", "A"]);
        let b = conflict(ConflictType::TemporalOverlap, Severity::Warning, &["A", "B"]);
        assert_eq!(a.identity(), "temporal-overlap:A|B");
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn type_serializes_kebab_case() {
        let c = conflict(ConflictType::DependencyCycle, Severity::Error, &["A"]);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "dependency-cycle");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn summary_excludes_dismissed_from_counts() {
        let mut list = vec![
            conflict(ConflictType::DependencyCycle, Severity::Error, &["A"]),
            conflict(ConflictType::TemporalOverlap, Severity::Warning, &["A", "B"]),
            conflict(ConflictType::DependencyMissing, Severity::Warning, &["C"]),
        ];
        let mut config = TimelineConfig::default();
        config.dismiss_conflict("dependency-missing:C");
        assert_eq!(apply_dismissals(&mut list, &config), 1);

        let summary = ConflictSummary::from_conflicts(&list);
        assert_eq!(
            summary,
            ConflictSummary {
                errors: 1,
                warnings: 1,
                dismissed: 1
            }
        );
    }

    #[test]
    fn conflicts_for_event_uses_sanitized_names() {
        let list = vec![
            conflict(ConflictType::TemporalOverlap, Severity::Warning, &["The Duel", "B"]),
            conflict(ConflictType::DependencyMissing, Severity::Warning, &["C"]),
        ];
        assert_eq!(conflicts_for_event(&list, "the duel!").len(), 1);
        assert!(conflicts_for_event(&list, "D").is_empty());
    }
}
