//! Flow records: per-level source/destination values plus template references.

use crate::error::ApiError;
use crate::types::{FlowId, Side, TemplateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source and destination value for a single hierarchy level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideValues {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

impl SideValues {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source,
            Side::Destination => &self.destination,
        }
    }
}

/// Snapshot of a flow taken for one deployment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: FlowId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Level name → values
    #[serde(default)]
    pub values: BTreeMap<String, SideValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_template_id: Option<TemplateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_template_id: Option<TemplateId>,
}

fn default_active() -> bool {
    true
}

impl FlowRecord {
    pub fn builder(id: impl Into<FlowId>) -> FlowRecordBuilder {
        FlowRecordBuilder {
            record: FlowRecord {
                id: id.into(),
                name: String::new(),
                description: String::new(),
                active: true,
                values: BTreeMap::new(),
                source_template_id: None,
                destination_template_id: None,
            },
        }
    }

    /// Value for a level on one side; empty when the flow has none.
    ///
    /// Level names are matched exactly first, then ignoring case.
    pub fn value(&self, level: &str, side: Side) -> &str {
        if let Some(values) = self.values.get(level) {
            return values.get(side);
        }
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(level))
            .map(|(_, values)| values.get(side))
            .unwrap_or("")
    }

    pub fn template_id(&self, side: Side) -> Option<TemplateId> {
        match side {
            Side::Source => self.source_template_id,
            Side::Destination => self.destination_template_id,
        }
    }
}

/// Builder used by loaders and tests
pub struct FlowRecordBuilder {
    record: FlowRecord,
}

impl FlowRecordBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = name.into();
        self
    }

    pub fn value(
        mut self,
        level: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.record.values.insert(
            level.into(),
            SideValues {
                source: source.into(),
                destination: destination.into(),
            },
        );
        self
    }

    pub fn templates(mut self, source: Option<TemplateId>, destination: Option<TemplateId>) -> Self {
        self.record.source_template_id = source;
        self.record.destination_template_id = destination;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.record.active = active;
        self
    }

    pub fn build(self) -> FlowRecord {
        self.record
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlowFile {
    Wrapped { flows: Vec<FlowRecord> },
    List(Vec<FlowRecord>),
}

impl FlowFile {
    fn into_flows(self) -> Vec<FlowRecord> {
        match self {
            FlowFile::Wrapped { flows } => flows,
            FlowFile::List(flows) => flows,
        }
    }
}

/// Load flow records from a TOML, JSON or YAML file, chosen by extension.
///
/// TOML files hold a `[[flows]]` array; JSON and YAML accept either a bare
/// list or a `flows` key.
pub fn load_flows(path: &Path) -> Result<Vec<FlowRecord>, ApiError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ApiError::ConfigError(format!("Failed to read flows file {}: {}", path.display(), e))
    })?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let file: FlowFile = match extension.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| {
            ApiError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?,
        "json" => serde_json::from_str(&content).map_err(|e| {
            ApiError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?,
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| {
            ApiError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?,
        other => {
            return Err(ApiError::ConfigError(format!(
                "Unsupported flows file extension '{}' (expected toml, json, yaml)",
                other
            )))
        }
    };

    let flows = file.into_flows();
    tracing::debug!(path = %path.display(), count = flows.len(), "Loaded flow records");
    Ok(flows)
}
