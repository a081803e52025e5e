//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    memory_store::InMemoryStore,
    ports::{
        CharacterRepo, ClockPort, EventRepo, GeocoderPort, GroupRepo, LocationRepo, SettingsRepo,
    },
};
use crate::use_cases::{
    ConflictDismissal, LocationHierarchy, MapPlacement, RefreshTimeline, RescheduleEvent,
    TimelineUseCases,
};

/// Main application state.
///
/// Holds the ports and every use case wired over them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Port traits injected directly; use cases hold clones of these.
#[derive(Clone)]
pub struct Repositories {
    pub event: Arc<dyn EventRepo>,
    pub location: Arc<dyn LocationRepo>,
    pub character: Arc<dyn CharacterRepo>,
    pub group: Arc<dyn GroupRepo>,
    pub settings: Arc<dyn SettingsRepo>,
}

impl Repositories {
    /// Every port backed by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            event: store.clone(),
            location: store.clone(),
            character: store.clone(),
            group: store.clone(),
            settings: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub timeline: TimelineUseCases,
    pub location_hierarchy: Arc<LocationHierarchy>,
    pub map_placement: Arc<MapPlacement>,
}

impl App {
    pub fn new(
        repositories: Repositories,
        geocoder: Arc<dyn GeocoderPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let timeline = TimelineUseCases::new(
            Arc::new(RefreshTimeline::new(
                repositories.event.clone(),
                repositories.location.clone(),
                repositories.group.clone(),
                repositories.settings.clone(),
                clock.clone(),
            )),
            Arc::new(RescheduleEvent::new(repositories.event.clone(), clock)),
            Arc::new(ConflictDismissal::new(repositories.settings.clone())),
        );

        let location_hierarchy = Arc::new(LocationHierarchy::new(
            repositories.location.clone(),
            repositories.character.clone(),
        ));
        let map_placement = Arc::new(MapPlacement::new(
            repositories.location.clone(),
            location_hierarchy.clone(),
            geocoder,
        ));

        Self {
            repositories,
            use_cases: UseCases {
                timeline,
                location_hierarchy,
                map_placement,
            },
        }
    }
}
