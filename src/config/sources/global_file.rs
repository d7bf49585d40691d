//! Global layer: `$XDG_CONFIG_HOME/flowdeploy/config.toml`, optional.

use crate::config::paths;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use tracing::debug;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    // No resolvable home means no global layer, not a failure
    let Ok(path) = paths::global_config_path() else {
        return Ok(builder);
    };
    if !path.exists() {
        return Ok(builder);
    }
    debug!(path = %path.display(), "Adding global config file");
    Ok(builder.add_source(File::from(path).required(false)))
}
