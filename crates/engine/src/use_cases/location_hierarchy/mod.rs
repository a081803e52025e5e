//! Location hierarchy service.
//!
//! Queries read one snapshot of the store and answer through
//! [`LocationTree`]. Mutations keep the two link directions (a child's
//! `parent_location_id` and the parent's `child_location_ids`) and the
//! location/character entity bookkeeping in step, saving one location at a
//! time. A failure between saves leaves drift that `validate_hierarchy`
//! reports.
//!
//! Every mutation runs under one lock, which map placement shares.

use std::collections::HashSet;
use std::sync::Arc;

use storyteller_domain::{
    CharacterId, EntityRef, EntityType, HierarchyReport, Location, LocationId, LocationTree,
    MapBinding,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::infrastructure::ports::{CharacterRepo, LocationRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),
    #[error("Moving location {location_id} under {new_parent_id} would create a cycle")]
    CircularReference {
        location_id: LocationId,
        new_parent_id: LocationId,
    },
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct LocationHierarchy {
    locations: Arc<dyn LocationRepo>,
    characters: Arc<dyn CharacterRepo>,
    mutations: Arc<Mutex<()>>,
}

impl LocationHierarchy {
    pub fn new(locations: Arc<dyn LocationRepo>, characters: Arc<dyn CharacterRepo>) -> Self {
        Self {
            locations,
            characters,
            mutations: Arc::new(Mutex::new(())),
        }
    }

    /// The lock held by every location mutation.
    pub(crate) fn mutation_lock(&self) -> Arc<Mutex<()>> {
        self.mutations.clone()
    }

    async fn require(&self, id: LocationId) -> Result<Location, HierarchyError> {
        self.locations
            .get(id)
            .await?
            .ok_or(HierarchyError::LocationNotFound(id))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get_location(&self, id: LocationId) -> Result<Option<Location>, HierarchyError> {
        Ok(self.locations.get(id).await?)
    }

    /// Root first, target last. Empty when the location does not exist.
    pub async fn get_location_path(
        &self,
        id: LocationId,
    ) -> Result<Vec<Location>, HierarchyError> {
        let all = self.locations.list().await?;
        Ok(cloned(LocationTree::new(&all).path(id)))
    }

    /// Breadth-first, excluding the location itself.
    pub async fn get_location_descendants(
        &self,
        id: LocationId,
    ) -> Result<Vec<Location>, HierarchyError> {
        let all = self.locations.list().await?;
        Ok(cloned(LocationTree::new(&all).descendants(id)))
    }

    pub async fn get_child_locations(
        &self,
        id: LocationId,
    ) -> Result<Vec<Location>, HierarchyError> {
        let all = self.locations.list().await?;
        Ok(cloned(LocationTree::new(&all).children(id)))
    }

    pub async fn get_root_locations(&self) -> Result<Vec<Location>, HierarchyError> {
        let all = self.locations.list().await?;
        Ok(cloned(LocationTree::new(&all).roots()))
    }

    /// Drift scan. Problems come back as data; nothing is repaired.
    pub async fn validate_hierarchy(&self) -> Result<HierarchyReport, HierarchyError> {
        let all = self.locations.list().await?;
        let report = LocationTree::new(&all).validate();
        if !report.valid {
            tracing::warn!(issues = report.errors.len(), "Location hierarchy has drifted");
        }
        Ok(report)
    }

    pub async fn get_locations_for_map(
        &self,
        map_id: &str,
    ) -> Result<Vec<Location>, HierarchyError> {
        let all = self.locations.list().await?;
        Ok(all
            .into_iter()
            .filter(|l| l.binding_for_map(map_id).is_some())
            .collect())
    }

    /// Entities listed at the location, and optionally at every location
    /// below it. Each entity appears once.
    pub async fn get_entities_at_location(
        &self,
        id: LocationId,
        include_descendants: bool,
    ) -> Result<Vec<EntityRef>, HierarchyError> {
        let all = self.locations.list().await?;
        let tree = LocationTree::new(&all);
        let location = tree.get(id).ok_or(HierarchyError::LocationNotFound(id))?;

        let mut scope = vec![location];
        if include_descendants {
            scope.extend(tree.descendants(id));
        }

        let mut seen: HashSet<Uuid> = HashSet::new();
        Ok(scope
            .into_iter()
            .flat_map(|l| l.entity_refs().iter())
            .filter(|r| seen.insert(r.entity_id))
            .cloned()
            .collect())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Saves `child` under `parent_id` and lists it on the parent.
    ///
    /// A `child` that is already stored is moved instead, exactly as
    /// [`Self::update_location_hierarchy`] would move it; its other fields are
    /// not overwritten.
    pub async fn create_child_location(
        &self,
        parent_id: LocationId,
        mut child: Location,
    ) -> Result<Location, HierarchyError> {
        let _guard = self.mutations.lock().await;

        let all = self.locations.list().await?;
        let tree = LocationTree::new(&all);
        if tree.get(child.id()).is_some() {
            return self.reparent(&tree, child.id(), Some(parent_id)).await;
        }
        let mut parent = tree
            .get(parent_id)
            .cloned()
            .ok_or(HierarchyError::LocationNotFound(parent_id))?;

        // A new location may arrive already listing children
        let ancestors = tree.path(parent_id);
        if let Some(looped) = ancestors
            .iter()
            .find(|a| child.child_location_ids().contains(&a.id()))
        {
            tracing::warn!(
                location = %child.name(),
                ancestor = %looped.name(),
                "Rejected new location that lists one of its ancestors as a child"
            );
            return Err(HierarchyError::CircularReference {
                location_id: child.id(),
                new_parent_id: parent_id,
            });
        }

        child.set_parent(Some(parent_id));
        self.locations.save(&child).await?;

        if parent.add_child(child.id()) {
            self.locations.save(&parent).await?;
        }

        tracing::info!(
            location = %child.name(),
            parent = %parent.name(),
            "Created child location"
        );
        Ok(child)
    }

    /// Moves a location under `new_parent_id`, or to the root when `None`.
    ///
    /// Rejects moves that would place a location below itself. Writes happen
    /// in order: old parent, the location, new parent.
    pub async fn update_location_hierarchy(
        &self,
        id: LocationId,
        new_parent_id: Option<LocationId>,
    ) -> Result<Location, HierarchyError> {
        let _guard = self.mutations.lock().await;
        let all = self.locations.list().await?;
        self.reparent(&LocationTree::new(&all), id, new_parent_id).await
    }

    async fn reparent(
        &self,
        tree: &LocationTree<'_>,
        id: LocationId,
        new_parent_id: Option<LocationId>,
    ) -> Result<Location, HierarchyError> {
        let mut location = tree
            .get(id)
            .cloned()
            .ok_or(HierarchyError::LocationNotFound(id))?;

        let mut new_parent = match new_parent_id {
            Some(parent_id) => {
                if tree.would_create_cycle(id, parent_id) {
                    tracing::warn!(
                        location = %location.name(),
                        new_parent = %parent_id,
                        "Rejected reparenting that would create a cycle"
                    );
                    return Err(HierarchyError::CircularReference {
                        location_id: id,
                        new_parent_id: parent_id,
                    });
                }
                Some(
                    tree.get(parent_id)
                        .cloned()
                        .ok_or(HierarchyError::LocationNotFound(parent_id))?,
                )
            }
            None => None,
        };

        let old_parent_id = location.parent_location_id();
        if old_parent_id == new_parent_id {
            return Ok(location);
        }

        if let Some(mut old_parent) = old_parent_id.and_then(|p| tree.get(p)).cloned() {
            if old_parent.remove_child(id) {
                self.locations.save(&old_parent).await?;
            }
        }

        location.set_parent(new_parent_id);
        self.locations.save(&location).await?;

        if let Some(parent) = new_parent.as_mut() {
            if parent.add_child(id) {
                self.locations.save(parent).await?;
            }
        }

        tracing::info!(
            location = %location.name(),
            old_parent = ?old_parent_id,
            new_parent = ?new_parent_id,
            "Location moved"
        );
        Ok(location)
    }

    // =========================================================================
    // Map bindings
    // =========================================================================

    /// Binds the location to a map point, replacing any binding it already
    /// has for that map.
    pub async fn add_map_binding(
        &self,
        id: LocationId,
        binding: MapBinding,
    ) -> Result<Location, HierarchyError> {
        let _guard = self.mutations.lock().await;
        let mut location = self.require(id).await?;
        location.set_map_binding(binding);
        self.locations.save(&location).await?;
        Ok(location)
    }

    /// Returns false when the location had no binding for the map.
    pub async fn remove_map_binding(
        &self,
        id: LocationId,
        map_id: &str,
    ) -> Result<bool, HierarchyError> {
        let _guard = self.mutations.lock().await;
        let mut location = self.require(id).await?;
        if !location.remove_map_binding(map_id) {
            return Ok(false);
        }
        self.locations.save(&location).await?;
        Ok(true)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Lists `entity` at `destination` only. For characters the character's
    /// own `current_location_id` is updated too.
    pub async fn move_entity_to_location(
        &self,
        entity: EntityRef,
        destination: LocationId,
    ) -> Result<Location, HierarchyError> {
        let _guard = self.mutations.lock().await;
        self.move_entity(entity, destination).await
    }

    /// [`Self::move_entity_to_location`] for callers already holding
    /// [`Self::mutation_lock`].
    pub(crate) async fn move_entity(
        &self,
        entity: EntityRef,
        destination: LocationId,
    ) -> Result<Location, HierarchyError> {
        let all = self.locations.list().await?;
        let mut target = all
            .iter()
            .find(|l| l.id() == destination)
            .cloned()
            .ok_or(HierarchyError::LocationNotFound(destination))?;

        for location in &all {
            if location.id() == destination || !location.has_entity(entity.entity_id) {
                continue;
            }
            let mut previous = location.clone();
            previous.remove_entity_ref(entity.entity_id);
            self.locations.save(&previous).await?;
            tracing::debug!(
                entity = %entity.entity_id,
                from = %previous.name(),
                "Removed entity from previous location"
            );
        }

        target.add_entity_ref(entity.clone());
        self.locations.save(&target).await?;

        if entity.entity_type == EntityType::Character {
            let character_id = CharacterId::from_uuid(entity.entity_id);
            match self.characters.get(character_id).await? {
                Some(mut character) => {
                    character.set_current_location(Some(destination));
                    self.characters.save(&character).await?;
                }
                None => tracing::warn!(
                    character = %character_id,
                    "Moved character is not in the store; only the location was updated"
                ),
            }
        }

        Ok(target)
    }
}

fn cloned(locations: Vec<&Location>) -> Vec<Location> {
    locations.into_iter().cloned().collect()
}
