//! In-memory entity store.
//!
//! Backs every repository port with insertion-ordered collections so listings
//! come back in the order the vault supplied them. Used by the binary and by
//! use-case tests that want real read-after-write behavior.

use async_trait::async_trait;
use tokio::sync::RwLock;

use storyteller_domain::{
    Character, CharacterId, Event, EventId, Group, GroupId, Location, LocationId, TimelineConfig,
};

use crate::infrastructure::ports::{
    CharacterRepo, EventRepo, GroupRepo, LocationRepo, RepoError, SettingsRepo,
};

/// Insertion-ordered collection keyed by id. Saving an existing id replaces
/// it in place.
struct Collection<K, V> {
    entries: RwLock<Vec<(K, V)>>,
}

impl<K, V> Collection<K, V>
where
    K: PartialEq + Copy + Send + Sync,
    V: Clone + Send + Sync,
{
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    async fn get(&self, id: K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.iter().find(|(k, _)| *k == id).map(|(_, v)| v.clone())
    }

    async fn list(&self) -> Vec<V> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(_, v)| v.clone())
            .collect()
    }

    async fn upsert(&self, id: K, value: V) {
        let mut guard = self.entries.write().await;
        match guard.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = value,
            None => guard.push((id, value)),
        }
    }

    async fn remove(&self, id: K) -> bool {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|(k, _)| *k != id);
        guard.len() != before
    }
}

pub struct InMemoryStore {
    events: Collection<EventId, Event>,
    locations: Collection<LocationId, Location>,
    characters: Collection<CharacterId, Character>,
    groups: Collection<GroupId, Group>,
    timeline: RwLock<TimelineConfig>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            events: Collection::new(),
            locations: Collection::new(),
            characters: Collection::new(),
            groups: Collection::new(),
            timeline: RwLock::new(TimelineConfig::default()),
        }
    }

    /// Store pre-filled with a vault's contents, in the given order.
    pub async fn seeded(
        events: Vec<Event>,
        locations: Vec<Location>,
        characters: Vec<Character>,
        groups: Vec<Group>,
        timeline: TimelineConfig,
    ) -> Self {
        let store = Self::new();
        for event in events {
            store.events.upsert(event.id(), event).await;
        }
        for location in locations {
            store.locations.upsert(location.id(), location).await;
        }
        for character in characters {
            store.characters.upsert(character.id(), character).await;
        }
        for group in groups {
            store.groups.upsert(group.id(), group).await;
        }
        *store.timeline.write().await = timeline;
        store
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Port implementations
// =============================================================================

#[async_trait]
impl EventRepo for InMemoryStore {
    async fn get(&self, id: EventId) -> Result<Option<Event>, RepoError> {
        Ok(self.events.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Event>, RepoError> {
        Ok(self.events.list().await)
    }

    async fn save(&self, event: &Event) -> Result<(), RepoError> {
        // Contradictory markers are stored as-is; the conflict detector reports them
        if event.name().trim().is_empty() {
            return Err(RepoError::constraint("Event name cannot be empty"));
        }
        self.events.upsert(event.id(), event.clone()).await;
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<(), RepoError> {
        if self.events.remove(id).await {
            Ok(())
        } else {
            Err(RepoError::not_found("Event", id))
        }
    }
}

#[async_trait]
impl LocationRepo for InMemoryStore {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError> {
        Ok(self.locations.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        Ok(self.locations.list().await)
    }

    async fn save(&self, location: &Location) -> Result<(), RepoError> {
        location
            .validate()
            .map_err(|e| RepoError::constraint(e.to_string()))?;
        self.locations.upsert(location.id(), location.clone()).await;
        Ok(())
    }

    async fn delete(&self, id: LocationId) -> Result<(), RepoError> {
        if self.locations.remove(id).await {
            Ok(())
        } else {
            Err(RepoError::not_found("Location", id))
        }
    }
}

#[async_trait]
impl CharacterRepo for InMemoryStore {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        Ok(self.characters.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Character>, RepoError> {
        Ok(self.characters.list().await)
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        self.characters
            .upsert(character.id(), character.clone())
            .await;
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        if self.characters.remove(id).await {
            Ok(())
        } else {
            Err(RepoError::not_found("Character", id))
        }
    }
}

#[async_trait]
impl GroupRepo for InMemoryStore {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, RepoError> {
        Ok(self.groups.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        Ok(self.groups.list().await)
    }

    async fn save(&self, group: &Group) -> Result<(), RepoError> {
        self.groups.upsert(group.id(), group.clone()).await;
        Ok(())
    }

    async fn delete(&self, id: GroupId) -> Result<(), RepoError> {
        if self.groups.remove(id).await {
            Ok(())
        } else {
            Err(RepoError::not_found("Group", id))
        }
    }
}

#[async_trait]
impl SettingsRepo for InMemoryStore {
    async fn get_timeline_config(&self) -> Result<TimelineConfig, RepoError> {
        Ok(self.timeline.read().await.clone())
    }

    async fn save_timeline_config(&self, config: &TimelineConfig) -> Result<(), RepoError> {
        *self.timeline.write().await = config.clone();
        Ok(())
    }
}
