//! Map bindings and entity references attached to locations

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Association of a location with a point on a specific map.
///
/// For image maps `coordinates` are pixel/grid positions; for real-world maps
/// they are `[lat, lon]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBinding {
    pub map_id: String,
    pub coordinates: [f64; 2],
    #[serde(default)]
    pub zoom_range: Option<[u8; 2]>,
    #[serde(default)]
    pub marker_icon: Option<String>,
}

impl MapBinding {
    pub fn new(map_id: impl Into<String>, coordinates: [f64; 2]) -> Self {
        Self {
            map_id: map_id.into(),
            coordinates,
            zoom_range: None,
            marker_icon: None,
        }
    }

    pub fn with_zoom_range(mut self, min: u8, max: u8) -> Self {
        self.zoom_range = Some([min.min(max), min.max(max)]);
        self
    }

    pub fn with_marker_icon(mut self, icon: impl Into<String>) -> Self {
        self.marker_icon = Some(icon.into());
        self
    }

    /// Euclidean distance from this binding to a point on the same map.
    pub fn distance_to(&self, point: [f64; 2]) -> f64 {
        let dx = self.coordinates[0] - point[0];
        let dy = self.coordinates[1] - point[1];
        (dx * dx + dy * dy).sqrt()
    }
}

/// Kind of entity situated at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Character,
    Event,
    Group,
    Item,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityType::Character => "character",
            EntityType::Event => "event",
            EntityType::Group => "group",
            EntityType::Item => "item",
            EntityType::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// An entity listed at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    /// Free-form relationship label ("lives here", "born here")
    #[serde(default)]
    pub relationship: String,
}

impl EntityRef {
    pub fn new(entity_id: Uuid, entity_type: EntityType, relationship: impl Into<String>) -> Self {
        Self {
            entity_id,
            entity_type,
            relationship: relationship.into(),
        }
    }
}
