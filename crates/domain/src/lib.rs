//! Storyteller domain: entities, date parsing, conflict detection, timeline
//! datasets, and location hierarchy rules. No I/O lives here.

pub mod common;
pub mod conflicts;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod index;
pub mod placement;
pub mod temporal;
pub mod timeline;
pub mod value_objects;

pub use entities::{Character, Event, Group, Location};
pub use error::DomainError;

pub use conflicts::{
    apply_dismissals, conflicts_for_event, ConflictDetector, ConflictEvent, ConflictSummary,
    ConflictType, DetectedConflict, Severity,
};

pub use hierarchy::{HierarchyIssue, HierarchyReport, LocationTree};

// Re-export ID types
pub use ids::{CharacterId, EventId, GroupId, LocationId};

pub use index::{EventIndex, LocationIndex};

pub use placement::{
    coordinate_name, find_nearest, match_existing, GeoHierarchy, GranularityLevel, LevelPolicy,
};

pub use temporal::{
    compare_parsed, end_or_start_millis, parse_date, sort_chronologically, to_display, to_millis,
    DateParseError, DatePoint, DatePrecision, DisplayLocale, ParseOptions, ParsedDate, TimePoint,
};

pub use timeline::{
    DependencyEdge, ItemKind, LegendEntry, NarrativeGlyph, TimelineBackground, TimelineBuilder,
    TimelineDataset, TimelineGroup, TimelineItem,
};

pub use value_objects::{
    EntityRef, EntityType, EraDefinition, Fork, GroupingMode, MapBinding, NarrativeMarkers,
    TimelineConfig, TimelineFilters, TrackDefinition,
};
