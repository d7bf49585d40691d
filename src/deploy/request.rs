//! Wire shapes for the deployment endpoint.

use crate::types::{ContainerId, TemplateId};
use serde::{Deserialize, Serialize};

/// Flags applied to every deployment in a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployFlags {
    #[serde(default)]
    pub stop_versioning_after_deploy: bool,
    #[serde(default)]
    pub disable_after_deploy: bool,
    #[serde(default)]
    pub start_after_deploy: bool,
}

/// Body of a template instantiation request.
///
/// Exactly one of `parent_process_group_id` / `parent_process_group_path` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub template_id: Option<TemplateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_process_group_id: Option<ContainerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_process_group_path: Option<String>,
    pub process_group_name: Option<String>,
    /// `None` deploys the latest version
    pub version: Option<i64>,
    pub x_position: i64,
    pub y_position: i64,
    pub stop_versioning_after_deploy: bool,
    pub disable_after_deploy: bool,
    pub start_after_deploy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_context_name: Option<String>,
}

impl DeploymentRequest {
    fn base(template_id: Option<TemplateId>, name: Option<String>, flags: DeployFlags) -> Self {
        Self {
            template_id,
            parent_process_group_id: None,
            parent_process_group_path: None,
            process_group_name: name,
            version: None,
            x_position: 0,
            y_position: 0,
            stop_versioning_after_deploy: flags.stop_versioning_after_deploy,
            disable_after_deploy: flags.disable_after_deploy,
            start_after_deploy: flags.start_after_deploy,
            hierarchy_attribute: None,
            parameter_context_name: None,
        }
    }

    /// Deploy under an existing process group.
    pub fn under_group(
        template_id: Option<TemplateId>,
        parent_id: impl Into<ContainerId>,
        name: Option<String>,
        flags: DeployFlags,
    ) -> Self {
        let mut request = Self::base(template_id, name, flags);
        request.parent_process_group_id = Some(parent_id.into());
        request
    }

    /// Deploy under a path the instance creates as needed.
    pub fn under_path(
        template_id: Option<TemplateId>,
        parent_path: impl Into<String>,
        name: Option<String>,
        flags: DeployFlags,
    ) -> Self {
        let mut request = Self::base(template_id, name, flags);
        request.parent_process_group_path = Some(parent_path.into());
        request
    }

    pub fn with_version(mut self, version: Option<i64>) -> Self {
        self.version = version;
        self
    }

    pub fn with_hierarchy_attribute(mut self, attribute: Option<String>) -> Self {
        self.hierarchy_attribute = attribute;
        self
    }

    pub fn with_parameter_context(mut self, name: Option<String>) -> Self {
        self.parameter_context_name = name;
        self
    }

    /// Same request with the name cleared so the instance assigns a default.
    pub fn without_name(&self) -> Self {
        let mut request = self.clone();
        request.process_group_name = None;
        request
    }

    /// Where the process group goes, for logs and summaries.
    pub fn parent_label(&self) -> String {
        match (&self.parent_process_group_id, &self.parent_process_group_path) {
            (Some(id), _) => id.clone(),
            (None, Some(path)) => path.clone(),
            (None, None) => "<unset>".to_string(),
        }
    }
}

/// Successful deployment answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub process_group_id: ContainerId,
    #[serde(default)]
    pub process_group_name: Option<String>,
}

/// The process group that caused a naming conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingProcessGroup {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub running_count: u32,
    #[serde(default)]
    pub stopped_count: u32,
    #[serde(default)]
    pub has_version_control: bool,
}
