//! Core types shared across hierarchy resolution and deployment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// InstanceId: identifier of a managed flow-orchestration instance
pub type InstanceId = String;

/// ContainerId: identifier of a process group inside an instance
pub type ContainerId = String;

/// FlowId: identifier of a flow record
pub type FlowId = String;

/// TemplateId: identifier of a deployable template
pub type TemplateId = i64;

/// Which end of a flow a value or deployment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    /// Both sides in deployment order.
    pub const ALL: [Side; 2] = [Side::Source, Side::Destination];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Destination => "destination",
        }
    }

    pub fn parse(value: &str) -> Option<Side> {
        match value.trim().to_ascii_lowercase().as_str() {
            "source" | "src" => Some(Side::Source),
            "destination" | "dest" | "dst" => Some(Side::Destination),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
