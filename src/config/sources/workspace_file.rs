//! Workspace layer: `<workspace>/flowdeploy.toml`, optional.

use crate::config::paths;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;
use tracing::debug;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = paths::workspace_config_path(workspace_root);
    if !path.exists() {
        return Ok(builder);
    }
    debug!(path = %path.display(), "Adding workspace config file");
    Ok(builder.add_source(File::from(path).required(false)))
}
