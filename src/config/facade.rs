//! ConfigLoader facade over the merge service.

use super::merge::service::MergeService;
use super::DeployConfig;
use crate::error::ApiError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the layered configuration for a workspace.
    pub fn load(workspace_root: &Path) -> Result<DeployConfig, ApiError> {
        Ok(MergeService::load(workspace_root)?)
    }

    /// Load one explicit file, with the environment still layered on top.
    pub fn load_from_file(path: &Path) -> Result<DeployConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::NotFound(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Ok(MergeService::load_from_file(path)?)
    }

    /// Load and reject configurations that fail validation.
    pub fn load_validated(workspace_root: &Path) -> Result<DeployConfig, ApiError> {
        let config = Self::load(workspace_root)?;
        config.validate()?;
        Ok(config)
    }
}
