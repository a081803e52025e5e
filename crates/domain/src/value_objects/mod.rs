//! Value objects - immutable-ish data without identity

mod map_binding;
mod narrative_markers;
mod timeline_config;

pub use map_binding::{EntityRef, EntityType, MapBinding};
pub use narrative_markers::NarrativeMarkers;
pub use timeline_config::{
    EraDefinition, Fork, GroupingMode, TimelineConfig, TimelineFilters, TrackDefinition,
};
