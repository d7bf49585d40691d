//! MergeService: stacks the sources and deserializes into `DeployConfig`.

use super::merge_policy;
use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::DeployConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

pub struct MergeService;

impl MergeService {
    /// Precedence: defaults -> global file -> workspace file -> environment.
    pub fn load(workspace_root: &Path) -> Result<DeployConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let config: DeployConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            levels = config.hierarchy.len(),
            instances = config.instances.len(),
            paths = config.paths.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Defaults, then `path`, then environment.
    pub fn load_from_file(path: &Path) -> Result<DeployConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}
