//! Deployment targets: one per `(flow, side)`, built during preparation.

use crate::deploy::request::{DeployFlags, DeploymentRequest};
use crate::error::ApiError;
use crate::types::{ContainerId, FlowId, InstanceId, Side, TemplateId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub flow_id: FlowId,
    pub side: Side,
    /// Top-level hierarchy value for this side
    pub hierarchy_value: String,
    pub instance_id: Option<InstanceId>,
    /// Existing process group to deploy under
    pub resolved_container_id: Option<ContainerId>,
    /// Root-first path to create when nothing existing matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<Vec<String>>,
    /// Root-first path of the parent, resolved or synthesized; empty if unknown
    #[serde(default)]
    pub container_path: Vec<String>,
    pub generated_name: String,
    pub template_id: Option<TemplateId>,
    pub template_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_context_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl DeploymentTarget {
    pub fn new(flow_id: impl Into<FlowId>, side: Side) -> Self {
        Self {
            flow_id: flow_id.into(),
            side,
            hierarchy_value: String::new(),
            instance_id: None,
            resolved_container_id: None,
            parent_path: None,
            container_path: Vec::new(),
            generated_name: String::new(),
            template_id: None,
            template_name: None,
            hierarchy_attribute: None,
            parameter_context_name: None,
            version: None,
        }
    }

    /// `flow/side`, used in logs and results.
    pub fn label(&self) -> String {
        format!("{}/{}", self.flow_id, self.side)
    }

    /// Check preconditions and build the request body.
    ///
    /// Fails before any network call when the instance, the parent container
    /// or the template is missing.
    pub fn to_request(&self, flags: DeployFlags) -> Result<(InstanceId, DeploymentRequest), ApiError> {
        let instance_id = self.instance_id.clone().ok_or_else(|| {
            ApiError::ValidationError(format!(
                "No instance resolved for {} (hierarchy value '{}')",
                self.label(),
                self.hierarchy_value
            ))
        })?;

        if self.template_id.is_none() {
            return Err(ApiError::ValidationError(format!(
                "No template configured for {}",
                self.label()
            )));
        }

        let name = if self.generated_name.is_empty() {
            None
        } else {
            Some(self.generated_name.clone())
        };

        let request = match (&self.resolved_container_id, &self.parent_path) {
            (Some(container_id), _) => {
                DeploymentRequest::under_group(self.template_id, container_id.clone(), name, flags)
            }
            (None, Some(path)) if !path.is_empty() => DeploymentRequest::under_path(
                self.template_id,
                format!("/{}", path.join("/")),
                name,
                flags,
            ),
            _ => {
                return Err(ApiError::ValidationError(format!(
                    "No process group selected for {}",
                    self.label()
                )))
            }
        };

        Ok((
            instance_id,
            request
                .with_version(self.version)
                .with_hierarchy_attribute(self.hierarchy_attribute.clone())
                .with_parameter_context(self.parameter_context_name.clone()),
        ))
    }
}
