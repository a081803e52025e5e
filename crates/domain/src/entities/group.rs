use serde::{Deserialize, Serialize};

use crate::ids::GroupId;

/// A faction or other named set of entities. Events list groups by id or name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    id: GroupId,
    name: String,
    /// CSS color used for the group's swimlane
    #[serde(default)]
    color: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[inline]
    pub fn id(&self) -> GroupId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// True when `reference` is this group's id or, case-insensitively, its name.
    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim();
        reference == self.id.to_string() || reference.eq_ignore_ascii_case(self.name.trim())
    }
}
