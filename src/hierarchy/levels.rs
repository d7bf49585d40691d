//! Hierarchy levels and the ordered chain built from them.

use crate::error::ApiError;
use crate::hierarchy::flow::FlowRecord;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One named rank in the attribute chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub name: String,
    pub order: i32,
}

impl HierarchyLevel {
    pub fn new(name: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            order,
        }
    }
}

/// Levels sorted ascending by `order`, names unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hierarchy {
    levels: Vec<HierarchyLevel>,
}

impl Hierarchy {
    /// Build a hierarchy, sorting by `order`.
    ///
    /// Rejects empty names and names that collide case-insensitively.
    pub fn new(mut levels: Vec<HierarchyLevel>) -> Result<Self, ApiError> {
        let mut seen = HashSet::new();
        for level in &levels {
            let key = level.name.trim().to_lowercase();
            if key.is_empty() {
                return Err(ApiError::ConfigError(
                    "Hierarchy level name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(key) {
                return Err(ApiError::ConfigError(format!(
                    "Duplicate hierarchy level name: {}",
                    level.name
                )));
            }
        }
        levels.sort_by_key(|level| level.order);
        Ok(Self { levels })
    }

    /// Convenience constructor assigning `order` from position.
    pub fn from_names<I, S>(names: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| HierarchyLevel::new(name, i as i32))
            .collect();
        Self::new(levels)
    }

    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level 0: maps to the instance identity.
    pub fn top(&self) -> Option<&HierarchyLevel> {
        self.levels.first()
    }

    /// Last level: the flow's own identity.
    pub fn leaf(&self) -> Option<&HierarchyLevel> {
        self.levels.last()
    }

    pub fn level_at(&self, index: usize) -> Option<&HierarchyLevel> {
        self.levels.get(index)
    }

    /// Position of a level by name, ignoring case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.name.eq_ignore_ascii_case(name))
    }

    /// One value per level, ascending; missing values are empty strings.
    pub fn ordered_values(&self, flow: &FlowRecord, side: Side) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| flow.value(&level.name, side).to_string())
            .collect()
    }

    pub fn top_value<'a>(&self, flow: &'a FlowRecord, side: Side) -> Option<&'a str> {
        self.top().map(|level| flow.value(&level.name, side))
    }

    pub fn leaf_value<'a>(&self, flow: &'a FlowRecord, side: Side) -> Option<&'a str> {
        self.leaf().map(|level| flow.value(&level.name, side))
    }

    /// Values for the levels strictly between top and leaf, ascending, empties skipped.
    pub fn infix_values(&self, flow: &FlowRecord, side: Side) -> Vec<String> {
        if self.levels.len() < 3 {
            return Vec::new();
        }
        self.levels[1..self.levels.len() - 1]
            .iter()
            .map(|level| flow.value(&level.name, side))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}
