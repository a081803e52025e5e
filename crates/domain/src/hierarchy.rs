//! Read-only queries over the location tree
//!
//! `LocationTree` borrows a snapshot and answers path, descendant and drift
//! questions. Mutations live in the engine's hierarchy service, which checks
//! [`LocationTree::would_create_cycle`] before touching the store.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::Location;
use crate::ids::LocationId;

/// One inconsistency found by [`LocationTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyIssue {
    /// `parent_location_id` points at a location that does not exist
    DanglingParent {
        location: LocationId,
        parent: LocationId,
    },
    /// `child_location_ids` lists a location that does not exist
    DanglingChild {
        location: LocationId,
        child: LocationId,
    },
    /// The parent lists the child, but the child points elsewhere
    ChildNotLinkedBack {
        parent: LocationId,
        child: LocationId,
        actual_parent: Option<LocationId>,
    },
    /// The child points at the parent, but the parent does not list it
    MissingFromParent {
        parent: LocationId,
        child: LocationId,
    },
    /// Following parent pointers from this location loops
    Cycle { location: LocationId },
}

impl fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingParent { location, parent } => {
                write!(f, "Location {location} has missing parent {parent}")
            }
            Self::DanglingChild { location, child } => {
                write!(f, "Location {location} lists missing child {child}")
            }
            Self::ChildNotLinkedBack {
                parent,
                child,
                actual_parent,
            } => match actual_parent {
                Some(actual) => write!(
                    f,
                    "Location {parent} lists child {child}, whose parent is {actual}"
                ),
                None => write!(
                    f,
                    "Location {parent} lists child {child}, which has no parent"
                ),
            },
            Self::MissingFromParent { parent, child } => write!(
                f,
                "Location {child} points at parent {parent}, which does not list it"
            ),
            Self::Cycle { location } => write!(f, "Location {location} is part of a cycle"),
        }
    }
}

/// Result of a drift scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyReport {
    pub valid: bool,
    pub errors: Vec<HierarchyIssue>,
}

/// Borrowed view of a location snapshot keyed by id.
#[derive(Debug, Clone)]
pub struct LocationTree<'a> {
    order: Vec<&'a Location>,
    by_id: HashMap<LocationId, &'a Location>,
}

impl<'a> LocationTree<'a> {
    pub fn new(locations: &'a [Location]) -> Self {
        let by_id = locations.iter().map(|l| (l.id(), l)).collect();
        Self {
            order: locations.iter().collect(),
            by_id,
        }
    }

    pub fn get(&self, id: LocationId) -> Option<&'a Location> {
        self.by_id.get(&id).copied()
    }

    /// Ancestors from the root down to the target, inclusive.
    ///
    /// Stops at a dangling parent or a repeated node, so a corrupted tree still
    /// yields a finite path. Empty when the target does not exist.
    pub fn path(&self, id: LocationId) -> Vec<&'a Location> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.get(id);
        while let Some(location) = current {
            if !visited.insert(location.id()) {
                break;
            }
            path.push(location);
            current = location.parent_location_id().and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    /// Every location below `id`, breadth first. Excludes `id` itself.
    pub fn descendants(&self, id: LocationId) -> Vec<&'a Location> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut queue: VecDeque<LocationId> = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if visited.insert(child.id()) {
                    out.push(child);
                    queue.push_back(child.id());
                }
            }
        }
        out
    }

    /// Direct children listed by `id` that exist in the snapshot.
    pub fn children(&self, id: LocationId) -> Vec<&'a Location> {
        self.get(id)
            .map(|l| {
                l.child_location_ids()
                    .iter()
                    .filter_map(|c| self.get(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Locations without a parent, in snapshot order.
    pub fn roots(&self) -> Vec<&'a Location> {
        self.order
            .iter()
            .copied()
            .filter(|l| l.parent_location_id().is_none())
            .collect()
    }

    /// True when reparenting `id` under `new_parent` would put `id` below itself.
    pub fn would_create_cycle(&self, id: LocationId, new_parent: LocationId) -> bool {
        id == new_parent || self.descendants(id).iter().any(|d| d.id() == new_parent)
    }

    /// Scans for drift between parent pointers and child lists. Never repairs.
    pub fn validate(&self) -> HierarchyReport {
        let mut errors = Vec::new();

        for location in &self.order {
            let id = location.id();
            if let Some(parent_id) = location.parent_location_id() {
                match self.get(parent_id) {
                    None => errors.push(HierarchyIssue::DanglingParent {
                        location: id,
                        parent: parent_id,
                    }),
                    Some(parent) if !parent.has_child(id) => {
                        errors.push(HierarchyIssue::MissingFromParent {
                            parent: parent_id,
                            child: id,
                        })
                    }
                    Some(_) => {}
                }
            }
            for child_id in location.child_location_ids() {
                match self.get(*child_id) {
                    None => errors.push(HierarchyIssue::DanglingChild {
                        location: id,
                        child: *child_id,
                    }),
                    Some(child) if child.parent_location_id() != Some(id) => {
                        errors.push(HierarchyIssue::ChildNotLinkedBack {
                            parent: id,
                            child: *child_id,
                            actual_parent: child.parent_location_id(),
                        })
                    }
                    Some(_) => {}
                }
            }
            if self.parent_chain_loops(id) {
                errors.push(HierarchyIssue::Cycle { location: id });
            }
        }

        HierarchyReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// True only when `id` itself sits on the loop, not merely upstream of one.
    fn parent_chain_loops(&self, id: LocationId) -> bool {
        let mut visited = HashSet::from([id]);
        let mut current = self.get(id).and_then(Location::parent_location_id);
        while let Some(parent) = current {
            if !visited.insert(parent) {
                return parent == id;
            }
            current = self.get(parent).and_then(Location::parent_location_id);
        }
        false
    }
}
