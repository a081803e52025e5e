//! Use cases - user stories orchestrated over the ports.

pub mod location_hierarchy;
pub mod map_placement;
pub mod timeline;

pub use location_hierarchy::{HierarchyError, LocationHierarchy};
pub use map_placement::{MapPlacement, PlacementError, PlacementResult};
pub use timeline::{
    ConflictDismissal, RefreshTimeline, RescheduleEvent, TimelineError, TimelineRequest,
    TimelineUseCases, TimelineView,
};
