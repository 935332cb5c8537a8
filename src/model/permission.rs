use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A `category.action` capability address.
///
/// Only the first `.` separates the segments, so `task.edit.title` has the
/// action `edit.title` (which no tree grants unless spelled that way).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionPath {
    pub category: String,
    pub action: String,
}

impl PermissionPath {
    pub fn new(category: impl Into<String>, action: impl Into<String>) -> Self {
        PermissionPath {
            category: category.into(),
            action: action.into(),
        }
    }

    /// Parse `category.action`. Returns `None` when there is no `.` or
    /// either segment is empty.
    pub fn parse(path: &str) -> Option<PermissionPath> {
        let (category, action) = path.split_once('.')?;
        if category.is_empty() || action.is_empty() {
            return None;
        }
        Some(PermissionPath::new(category, action))
    }
}

impl fmt::Display for PermissionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.action)
    }
}

/// Two-level capability map carried by a role: category → action → granted.
///
/// Anything absent is denied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTree(BTreeMap<String, BTreeMap<String, bool>>);

impl PermissionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style grant, mostly for fixtures
    pub fn grant(mut self, category: &str, action: &str) -> Self {
        self.set(category, action, true);
        self
    }

    pub fn set(&mut self, category: &str, action: &str, granted: bool) {
        self.0
            .entry(category.to_string())
            .or_default()
            .insert(action.to_string(), granted);
    }

    /// Exact lookup; missing category or action is `false`
    pub fn allows(&self, path: &PermissionPath) -> bool {
        self.0
            .get(&path.category)
            .and_then(|actions| actions.get(&path.action))
            .copied()
            .unwrap_or(false)
    }

    /// Every path explicitly granted, in sorted order
    pub fn granted(&self) -> Vec<PermissionPath> {
        self.0
            .iter()
            .flat_map(|(category, actions)| {
                actions
                    .iter()
                    .filter(|(_, granted)| **granted)
                    .map(move |(action, _)| PermissionPath::new(category.clone(), action.clone()))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The decoded, already-verified caller of a server operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: u64,
    pub email: String,
    pub role_id: u64,
    #[serde(default)]
    pub permissions: PermissionTree,
}
