//! Instance descriptors and the pure lookup over them.

use crate::types::InstanceId;
use serde::{Deserialize, Serialize};

/// Where a managed instance lives. Informational: deployments go through the
/// manager API, which authenticates with `deploy.api_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub base_url: String,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_verify_tls() -> bool {
    true
}

/// A managed instance bound to one hierarchy value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub id: InstanceId,
    pub hierarchy_level_name: String,
    pub hierarchy_level_value: String,
    pub connection: ConnectionInfo,
}

/// Find the descriptor serving `(level_name, level_value)`.
///
/// Both fields must match exactly, including case.
pub fn resolve_instance<'a>(
    level_name: &str,
    level_value: &str,
    descriptors: &'a [InstanceDescriptor],
) -> Option<&'a InstanceDescriptor> {
    descriptors.iter().find(|descriptor| {
        descriptor.hierarchy_level_name == level_name
            && descriptor.hierarchy_level_value == level_value
    })
}

#[cfg(test)]
pub(crate) fn test_descriptor(id: &str, level: &str, value: &str) -> InstanceDescriptor {
    InstanceDescriptor {
        id: id.to_string(),
        hierarchy_level_name: level.to_string(),
        hierarchy_level_value: value.to_string(),
        connection: ConnectionInfo {
            base_url: format!("https://{}.example.net", id),
            verify_tls: true,
        },
    }
}
