//! Conflict detection between events

mod detector;
mod types;

pub use detector::ConflictDetector;
pub use types::{
    apply_dismissals, conflicts_for_event, ConflictEvent, ConflictSummary, ConflictType,
    DetectedConflict, Severity,
};
