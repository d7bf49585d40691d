//! Naming conflicts and the ways out of them.

use crate::deploy::request::{DeploymentRequest, ExistingProcessGroup};
use crate::deploy::target::DeploymentTarget;
use crate::error::ApiError;
use crate::types::InstanceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller's choice for a suspended conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// Resubmit without a name; the instance picks a disambiguated default
    DeployAnyway,
    /// Delete the existing group, then resubmit unchanged
    DeleteAndDeploy,
    /// Move the existing version-controlled group to the requested version
    UpdateVersion,
}

impl ConflictAction {
    pub const ALL: [ConflictAction; 3] = [
        ConflictAction::DeployAnyway,
        ConflictAction::DeleteAndDeploy,
        ConflictAction::UpdateVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictAction::DeployAnyway => "deploy_anyway",
            ConflictAction::DeleteAndDeploy => "delete_and_deploy",
            ConflictAction::UpdateVersion => "update_version",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConflictAction::DeployAnyway => "Deploy anyway (instance assigns a new name)",
            ConflictAction::DeleteAndDeploy => "Delete the existing process group and deploy",
            ConflictAction::UpdateVersion => "Update the existing process group's version",
        }
    }
}

impl fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deploy_anyway" => Ok(ConflictAction::DeployAnyway),
            "delete_and_deploy" => Ok(ConflictAction::DeleteAndDeploy),
            "update_version" => Ok(ConflictAction::UpdateVersion),
            other => Err(ApiError::InvalidResolution(format!(
                "Unknown conflict action: {}. Must be deploy_anyway, delete_and_deploy, or update_version",
                other
            ))),
        }
    }
}

/// Everything needed to resume after a conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictContext {
    pub existing_container: ExistingProcessGroup,
    pub pending_request: DeploymentRequest,
    pub pending_target: DeploymentTarget,
    pub instance_id: InstanceId,
    /// Message reported with the conflict
    pub message: String,
}

impl ConflictContext {
    /// Actions valid for this conflict; version update needs version control.
    pub fn available_actions(&self) -> Vec<ConflictAction> {
        ConflictAction::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }

    pub fn allows(&self, action: ConflictAction) -> bool {
        match action {
            ConflictAction::UpdateVersion => self.existing_container.has_version_control,
            ConflictAction::DeployAnyway | ConflictAction::DeleteAndDeploy => true,
        }
    }
}
