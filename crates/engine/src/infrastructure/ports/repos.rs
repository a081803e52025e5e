//! Entity-store ports, one per entity kind.

use async_trait::async_trait;
use storyteller_domain::{
    Character, CharacterId, Event, EventId, Group, GroupId, Location, LocationId, TimelineConfig,
};

use super::error::RepoError;

// =============================================================================
// Settings Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    /// Stored timeline settings, or defaults when none were saved.
    async fn get_timeline_config(&self) -> Result<TimelineConfig, RepoError>;
    async fn save_timeline_config(&self, config: &TimelineConfig) -> Result<(), RepoError>;
}

// =============================================================================
// Entity Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn get(&self, id: EventId) -> Result<Option<Event>, RepoError>;
    /// All events in storage order.
    async fn list(&self) -> Result<Vec<Event>, RepoError>;
    async fn save(&self, event: &Event) -> Result<(), RepoError>;
    async fn delete(&self, id: EventId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepo: Send + Sync {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError>;
    async fn list(&self) -> Result<Vec<Location>, RepoError>;
    async fn save(&self, location: &Location) -> Result<(), RepoError>;
    async fn delete(&self, id: LocationId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn list(&self) -> Result<Vec<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepo: Send + Sync {
    async fn get(&self, id: GroupId) -> Result<Option<Group>, RepoError>;
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
    async fn save(&self, group: &Group) -> Result<(), RepoError>;
    async fn delete(&self, id: GroupId) -> Result<(), RepoError>;
}
