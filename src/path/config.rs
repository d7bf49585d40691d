//! Configured base paths per instance and side.

use crate::types::{ContainerId, InstanceId, Side};
use serde::{Deserialize, Serialize};

/// Base path for one `(instance, side)`: an existing prefix that is never re-derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    pub instance_id: InstanceId,
    pub side: Side,
    /// Process group the base path ends at
    pub container_id: ContainerId,
    /// Root-first segments
    pub segments: Vec<String>,
}

impl PathConfig {
    /// Parse a slash-delimited path such as `/NiFi Flow/From DC1/`.
    ///
    /// Segments are trimmed and empty segments dropped.
    pub fn parse(
        instance_id: impl Into<InstanceId>,
        side: Side,
        container_id: impl Into<ContainerId>,
        raw: &str,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            side,
            container_id: container_id.into(),
            segments: split_path(raw),
        }
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Human form, `/`-joined with a leading slash.
    pub fn display(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Split a slash-delimited path into trimmed, non-empty segments.
pub fn split_path(raw: &str) -> Vec<String> {
    raw.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// All configured base paths, looked up by `(instance, side)`
#[derive(Debug, Clone, Default)]
pub struct PathConfigSet {
    configs: Vec<PathConfig>,
}

impl PathConfigSet {
    pub fn new(configs: Vec<PathConfig>) -> Self {
        Self { configs }
    }

    pub fn get(&self, instance_id: &str, side: Side) -> Option<&PathConfig> {
        self.configs
            .iter()
            .find(|config| config.instance_id == instance_id && config.side == side)
    }

    /// Insert or replace the config for its `(instance, side)`.
    pub fn upsert(&mut self, config: PathConfig) {
        match self
            .configs
            .iter_mut()
            .find(|c| c.instance_id == config.instance_id && c.side == config.side)
        {
            Some(existing) => *existing = config,
            None => self.configs.push(config),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathConfig> {
        self.configs.iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
