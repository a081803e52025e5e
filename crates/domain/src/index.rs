//! Compatibility indexes for name-based references
//!
//! Authors link events and locations by typing names. Both indexes are built
//! once per pass from a snapshot and resolve those strings to stable ids.

use std::collections::HashMap;

use crate::common::sanitize_name;
use crate::entities::{Event, Location};
use crate::ids::{EventId, LocationId};

/// Resolves event names by sanitized match.
///
/// The first event registered under a sanitized key wins. Later events with
/// the same key stay reachable by id but not by name.
#[derive(Debug, Clone, Default)]
pub struct EventIndex {
    by_key: HashMap<String, (EventId, usize)>,
}

impl EventIndex {
    pub fn build(events: &[Event]) -> Self {
        Self::build_from(events.iter())
    }

    /// Builds from any sequence of events; positions count from zero in
    /// iteration order.
    pub fn build_from<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut by_key = HashMap::new();
        for (position, event) in events.into_iter().enumerate() {
            let key = sanitize_name(event.name());
            if key.is_empty() {
                continue;
            }
            match by_key.get(&key) {
                Some(_) => {
                    tracing::debug!(
                        event = %event.name(),
                        key = %key,
                        "Duplicate sanitized event name, keeping first"
                    );
                }
                None => {
                    by_key.insert(key, (event.id(), position));
                }
            }
        }
        Self { by_key }
    }

    pub fn resolve(&self, name: &str) -> Option<EventId> {
        self.lookup(name).map(|(id, _)| id)
    }

    /// Position of the matching event in the slice the index was built from.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(|(_, position)| position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<(EventId, usize)> {
        let key = sanitize_name(name);
        if key.is_empty() {
            return None;
        }
        self.by_key.get(&key).copied()
    }
}

/// Resolves location references by exact id, then case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    by_id: HashMap<LocationId, String>,
    by_name: HashMap<String, LocationId>,
}

impl LocationIndex {
    pub fn build(locations: &[Location]) -> Self {
        let mut by_id = HashMap::with_capacity(locations.len());
        let mut by_name = HashMap::with_capacity(locations.len());
        for location in locations {
            by_id.insert(location.id(), location.name().to_string());
            by_name
                .entry(location.name().trim().to_lowercase())
                .or_insert(location.id());
        }
        Self { by_id, by_name }
    }

    pub fn resolve(&self, reference: &str) -> Option<LocationId> {
        if let Ok(id) = reference.parse::<LocationId>() {
            if self.by_id.contains_key(&id) {
                return Some(id);
            }
        }
        self.by_name.get(&reference.trim().to_lowercase()).copied()
    }

    pub fn name_of(&self, id: LocationId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Display name for a reference, falling back to the raw text.
    pub fn display_name<'a>(&'a self, reference: &'a str) -> &'a str {
        self.resolve(reference)
            .and_then(|id| self.name_of(id))
            .unwrap_or(reference)
    }

    /// Normalized key for comparing two references: the resolved id when
    /// known, otherwise the lowercased text.
    pub fn key(&self, reference: &str) -> String {
        match self.resolve(reference) {
            Some(id) => id.to_string(),
            None => reference.trim().to_lowercase(),
        }
    }
}
