//! Map placement use cases.
//!
//! Image maps resolve a click to the nearest bound location. Real-world maps
//! reverse-geocode the click, reuse a matching location when one exists, and
//! otherwise create one. Placements run under the location hierarchy's
//! mutation lock, so two clicks on the same place cannot both create it and
//! no binding or entity move interleaves with a placement.

use std::sync::Arc;

use serde::Serialize;
use storyteller_domain::{
    coordinate_name, find_nearest, match_existing, EntityRef, GeoHierarchy, LevelPolicy, Location,
    MapBinding,
};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{GeocoderPort, LocationRepo, RepoError};
use crate::use_cases::location_hierarchy::{HierarchyError, LocationHierarchy};

/// Highest zoom Nominatim distinguishes.
const MAX_GEOCODER_ZOOM: f64 = 18.0;

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub location: Location,
    pub is_new: bool,
}

pub struct MapPlacement {
    locations: Arc<dyn LocationRepo>,
    hierarchy: Arc<LocationHierarchy>,
    geocoder: Arc<dyn GeocoderPort>,
    mutations: Arc<Mutex<()>>,
}

impl MapPlacement {
    pub fn new(
        locations: Arc<dyn LocationRepo>,
        hierarchy: Arc<LocationHierarchy>,
        geocoder: Arc<dyn GeocoderPort>,
    ) -> Self {
        Self {
            locations,
            mutations: hierarchy.mutation_lock(),
            hierarchy,
            geocoder,
        }
    }

    /// Closest location bound to `map_id` within `tolerance` of the click.
    pub async fn find_location_at_coordinates(
        &self,
        map_id: &str,
        coordinates: [f64; 2],
        tolerance: f64,
    ) -> Result<Option<Location>, PlacementError> {
        let all = self.locations.list().await?;
        Ok(find_nearest(&all, map_id, coordinates, tolerance).cloned())
    }

    /// Resolves a click on a real-world map (`[lat, lon]`) to a location.
    ///
    /// A geocoder failure never fails the placement: the location is then
    /// named after the coordinates. When `entity` is given it is moved to the
    /// resolved location.
    pub async fn find_or_create_for_real_world_map(
        &self,
        map_id: &str,
        coordinates: [f64; 2],
        entity: Option<EntityRef>,
        level: LevelPolicy,
        zoom: f64,
    ) -> Result<PlacementResult, PlacementError> {
        let _guard = self.mutations.lock().await;

        let requested = level.resolve(zoom);
        let geocoded = self.reverse_geocode(coordinates, zoom).await;

        let selected = geocoded
            .as_ref()
            .and_then(|geo| geo.select(requested).map(|(at, name)| (geo, at, name)));
        let (name, description, location_type) = match selected {
            Some((geo, at, name)) => {
                if at != requested {
                    tracing::debug!(
                        requested = %requested,
                        resolved = %at,
                        "Geocoder had no name at requested level, using coarser"
                    );
                }
                (
                    name.to_string(),
                    geo.describe(at, coordinates),
                    Some(at.as_str()),
                )
            }
            None => (
                coordinate_name(coordinates),
                format!("Coordinates: {:.6}, {:.6}", coordinates[0], coordinates[1]),
                None,
            ),
        };
        let place_id = geocoded.as_ref().and_then(|g| g.place_id.clone());

        let all = self.locations.list().await?;
        let (mut location, is_new) = match match_existing(&all, &name, place_id.as_deref()) {
            Some(existing) => {
                let mut existing = existing.clone();
                if existing.binding_for_map(map_id).is_none() {
                    existing.set_map_binding(MapBinding::new(map_id, coordinates));
                    self.locations.save(&existing).await?;
                }
                tracing::debug!(location = %existing.name(), "Placement matched existing location");
                (existing, false)
            }
            None => {
                let mut created = Location::new(name)
                    .with_description(description)
                    .with_map_binding(MapBinding::new(map_id, coordinates));
                if let Some(kind) = location_type {
                    created = created.with_location_type(kind);
                }
                if let Some(place_id) = place_id {
                    created = created.with_osm_place_id(place_id);
                }
                self.locations.save(&created).await?;
                tracing::info!(
                    location = %created.name(),
                    map = %map_id,
                    "Created location from map placement"
                );
                (created, true)
            }
        };

        if let Some(entity) = entity {
            location = self
                .hierarchy
                .move_entity(entity, location.id())
                .await?;
        }

        Ok(PlacementResult { location, is_new })
    }

    async fn reverse_geocode(&self, coordinates: [f64; 2], zoom: f64) -> Option<GeoHierarchy> {
        // Clamped to 0..=18 first, so the cast cannot truncate
        let zoom = zoom.round().clamp(0.0, MAX_GEOCODER_ZOOM) as u8;
        match self
            .geocoder
            .reverse_geocode(coordinates[0], coordinates[1], zoom)
            .await
        {
            Ok(geo) => Some(geo),
            Err(error) => {
                tracing::warn!(
                    %error,
                    lat = coordinates[0],
                    lon = coordinates[1],
                    "Reverse geocoding failed, naming location from coordinates"
                );
                None
            }
        }
    }
}
