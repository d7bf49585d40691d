//! Built-in defaults, the lowest layer of every load.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;

/// Builder seeded with scalar defaults.
///
/// Table defaults (hierarchy, instances, paths, templates) come from serde
/// instead, so arrays in later layers replace rather than merge.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("deploy.api_base_url", "http://localhost:8000")?
        .set_default("deploy.request_timeout_secs", 30)?
        .set_default("deploy.name_template", "{last_hierarchy_value}")?
        .set_default("deploy.stop_versioning_after_deploy", false)?
        .set_default("deploy.disable_after_deploy", false)?
        .set_default("deploy.start_after_deploy", false)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
