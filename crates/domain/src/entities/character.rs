//! Character entity
//!
//! Only the fields the timeline and location code read. `current_location_id`
//! mirrors the character's entry in a location's `entity_refs`.

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, LocationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default)]
    id: CharacterId,
    name: String,
    #[serde(default)]
    current_location_id: Option<LocationId>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            current_location_id: None,
        }
    }

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn current_location_id(&self) -> Option<LocationId> {
        self.current_location_id
    }

    pub fn set_current_location(&mut self, location: Option<LocationId>) {
        self.current_location_id = location;
    }
}
