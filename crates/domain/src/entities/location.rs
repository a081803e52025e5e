//! Location entity - places arranged in a parent/child tree
//!
//! The tree is stored on both sides: `parent_location_id` on the child and
//! `child_location_ids` on the parent. Keeping the two in step is the job of
//! the hierarchy service; [`crate::hierarchy::LocationTree::validate`] reports
//! any drift between them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ids::LocationId;
use crate::value_objects::{EntityRef, MapBinding};

/// A place in the story world.
///
/// # Invariants
///
/// - at most one map binding per map id
/// - at most one entity reference per entity id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    id: LocationId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    /// Free-form kind ("city", "tavern", "building")
    #[serde(default)]
    location_type: Option<String>,
    #[serde(default)]
    parent_location_id: Option<LocationId>,
    #[serde(default)]
    child_location_ids: Vec<LocationId>,
    #[serde(default)]
    map_bindings: Vec<MapBinding>,
    #[serde(default)]
    entity_refs: Vec<EntityRef>,
    /// Reverse-geocoder place id, for locations created from a map click
    #[serde(default)]
    osm_place_id: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            description: None,
            location_type: None,
            parent_location_id: None,
            child_location_ids: Vec::new(),
            map_bindings: Vec::new(),
            entity_refs: Vec::new(),
            osm_place_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Location name cannot be empty"));
        }
        if self.parent_location_id == Some(self.id) {
            return Err(DomainError::circular_reference(self.id, self.id));
        }
        Ok(())
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: LocationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location_type(mut self, location_type: impl Into<String>) -> Self {
        self.location_type = Some(location_type.into());
        self
    }

    pub fn with_parent(mut self, parent: LocationId) -> Self {
        self.parent_location_id = Some(parent);
        self
    }

    pub fn with_child(mut self, child: LocationId) -> Self {
        self.add_child(child);
        self
    }

    pub fn with_map_binding(mut self, binding: MapBinding) -> Self {
        self.set_map_binding(binding);
        self
    }

    pub fn with_osm_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.osm_place_id = Some(place_id.into());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> LocationId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn location_type(&self) -> Option<&str> {
        self.location_type.as_deref()
    }

    #[inline]
    pub fn parent_location_id(&self) -> Option<LocationId> {
        self.parent_location_id
    }

    #[inline]
    pub fn child_location_ids(&self) -> &[LocationId] {
        &self.child_location_ids
    }

    #[inline]
    pub fn map_bindings(&self) -> &[MapBinding] {
        &self.map_bindings
    }

    #[inline]
    pub fn entity_refs(&self) -> &[EntityRef] {
        &self.entity_refs
    }

    #[inline]
    pub fn osm_place_id(&self) -> Option<&str> {
        self.osm_place_id.as_deref()
    }

    pub fn binding_for_map(&self, map_id: &str) -> Option<&MapBinding> {
        self.map_bindings.iter().find(|b| b.map_id == map_id)
    }

    pub fn has_child(&self, child: LocationId) -> bool {
        self.child_location_ids.contains(&child)
    }

    pub fn has_entity(&self, entity_id: Uuid) -> bool {
        self.entity_refs.iter().any(|r| r.entity_id == entity_id)
    }

    // =========================================================================
    // Hierarchy Mutations
    // =========================================================================

    pub fn set_parent(&mut self, parent: Option<LocationId>) {
        self.parent_location_id = parent;
    }

    /// Adds a child id. Returns false if it was already listed.
    pub fn add_child(&mut self, child: LocationId) -> bool {
        if self.has_child(child) {
            return false;
        }
        self.child_location_ids.push(child);
        true
    }

    /// Removes a child id. Returns false if it was not listed.
    pub fn remove_child(&mut self, child: LocationId) -> bool {
        let before = self.child_location_ids.len();
        self.child_location_ids.retain(|c| *c != child);
        self.child_location_ids.len() != before
    }

    // =========================================================================
    // Map Bindings
    // =========================================================================

    /// Adds a binding, replacing any existing binding for the same map.
    pub fn set_map_binding(&mut self, binding: MapBinding) {
        match self
            .map_bindings
            .iter_mut()
            .find(|b| b.map_id == binding.map_id)
        {
            Some(existing) => *existing = binding,
            None => self.map_bindings.push(binding),
        }
    }

    /// Removes the binding for a map. Returns false if there was none.
    pub fn remove_map_binding(&mut self, map_id: &str) -> bool {
        let before = self.map_bindings.len();
        self.map_bindings.retain(|b| b.map_id != map_id);
        self.map_bindings.len() != before
    }

    // =========================================================================
    // Entity References
    // =========================================================================

    /// Adds an entity reference, replacing an existing one for the same entity.
    pub fn add_entity_ref(&mut self, entity: EntityRef) {
        self.remove_entity_ref(entity.entity_id);
        self.entity_refs.push(entity);
    }

    /// Removes every reference to the entity. Returns false if none existed.
    pub fn remove_entity_ref(&mut self, entity_id: Uuid) -> bool {
        let before = self.entity_refs.len();
        self.entity_refs.retain(|r| r.entity_id != entity_id);
        self.entity_refs.len() != before
    }
}
