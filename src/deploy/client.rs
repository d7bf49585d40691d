//! Deployment client port.
//!
//! Everything the orchestrator and preparation need from a managed instance.
//! Implementations normalize failures into `RemoteError` before returning.

use crate::deploy::request::{DeploymentRequest, DeploymentResponse};
use crate::error::RemoteError;
use crate::path::ProcessGroupListing;
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait DeploymentClient: Send + Sync {
    /// Instantiate a template. A name clash comes back as a conflict-kind error.
    async fn deploy(
        &self,
        instance_id: &str,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResponse, RemoteError>;

    async fn delete_process_group(
        &self,
        instance_id: &str,
        process_group_id: &ContainerId,
    ) -> Result<(), RemoteError>;

    /// Move a version-controlled process group to `version` (`None` = latest).
    async fn update_version(
        &self,
        instance_id: &str,
        process_group_id: &ContainerId,
        version: Option<i64>,
    ) -> Result<(), RemoteError>;

    async fn list_process_groups(
        &self,
        instance_id: &str,
    ) -> Result<Vec<ProcessGroupListing>, RemoteError>;

    /// Names of the parameter contexts defined on an instance.
    async fn list_parameter_contexts(&self, instance_id: &str) -> Result<Vec<String>, RemoteError>;
}
