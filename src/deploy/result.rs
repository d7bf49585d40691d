//! Per-target outcomes and the batch summary.

use crate::deploy::conflict::ConflictAction;
use crate::deploy::target::DeploymentTarget;
use crate::error::RemoteErrorKind;
use crate::types::ContainerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: DeploymentTarget,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_id: Option<ContainerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `None` for validation failures, which never reach the network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RemoteErrorKind>,
    /// Set when the outcome came out of conflict resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ConflictAction>,
}

impl TargetOutcome {
    pub fn succeeded(
        target: DeploymentTarget,
        result_id: ContainerId,
        result_name: Option<String>,
    ) -> Self {
        Self {
            target,
            success: true,
            result_name,
            result_id: Some(result_id),
            error: None,
            error_kind: None,
            resolution: None,
        }
    }

    pub fn failed(target: DeploymentTarget, error: String, error_kind: Option<RemoteErrorKind>) -> Self {
        Self {
            target,
            success: false,
            result_name: None,
            result_id: None,
            error: Some(error),
            error_kind,
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, action: ConflictAction) -> Self {
        self.resolution = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<TargetOutcome>,
    /// Targets never attempted because the batch was cancelled
    #[serde(default)]
    pub abandoned: Vec<DeploymentTarget>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len() + self.abandoned.len()
    }

    pub fn outcome_for(&self, label: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target.label() == label)
    }
}
