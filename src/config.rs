//! Configuration
//!
//! `DeployConfig` is assembled by the `config` crate from, lowest to highest
//! precedence: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/flowdeploy/config.toml`), the workspace file
//! (`flowdeploy.toml`) and `FLOWDEPLOY__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod validation;

pub use facade::ConfigLoader;
pub use validation::ConfigReport;

use crate::deploy::{DeployFlags, TemplateDescriptor};
use crate::error::ApiError;
use crate::hierarchy::{Hierarchy, HierarchyLevel};
use crate::instance::{ConfigInstanceRepository, InstanceDescriptor, InstanceRegistry};
use crate::logging::LoggingConfig;
use crate::naming::NameTemplate;
use crate::path::{PathConfig, PathConfigSet};
use crate::types::{ContainerId, InstanceId, Side};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Base path entry as written in config files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub instance_id: InstanceId,
    pub side: Side,
    pub container_id: ContainerId,
    /// Slash-delimited, e.g. `/NiFi Flow/From DC1`
    pub path: String,
}

impl PathEntry {
    pub fn to_path_config(&self) -> PathConfig {
        PathConfig::parse(
            self.instance_id.clone(),
            self.side,
            self.container_id.clone(),
            &self.path,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterContextSettings {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// `[deploy]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploySettings {
    #[serde(default)]
    pub stop_versioning_after_deploy: bool,
    #[serde(default)]
    pub disable_after_deploy: bool,
    #[serde(default)]
    pub start_after_deploy: bool,
    #[serde(default)]
    pub name_template: NameTemplate,
    #[serde(default)]
    pub parameter_contexts: ParameterContextSettings,
    /// Template version to deploy; unset deploys the latest
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            stop_versioning_after_deploy: false,
            disable_after_deploy: false,
            start_after_deploy: false,
            name_template: NameTemplate::default(),
            parameter_contexts: ParameterContextSettings::default(),
            version: None,
            api_base_url: default_api_base_url(),
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DeploySettings {
    pub fn flags(&self) -> DeployFlags {
        DeployFlags {
            stop_versioning_after_deploy: self.stop_versioning_after_deploy,
            disable_after_deploy: self.disable_after_deploy,
            start_after_deploy: self.start_after_deploy,
        }
    }

    /// Configured parameter context per side, blank names dropped.
    pub fn parameter_context_map(&self) -> HashMap<Side, String> {
        let contexts = &self.parameter_contexts;
        [
            (Side::Source, contexts.source.as_ref()),
            (Side::Destination, contexts.destination.as_ref()),
        ]
        .into_iter()
        .filter_map(|(side, name)| {
            name.filter(|n| !n.trim().is_empty())
                .map(|n| (side, n.clone()))
        })
        .collect()
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub hierarchy: Vec<HierarchyLevel>,
    #[serde(default)]
    pub instances: Vec<InstanceDescriptor>,
    #[serde(default)]
    pub paths: Vec<PathEntry>,
    #[serde(default)]
    pub templates: Vec<TemplateDescriptor>,
    /// Flow records file, relative to the workspace root
    #[serde(default)]
    pub flows: Option<PathBuf>,
    #[serde(default)]
    pub deploy: DeploySettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeployConfig {
    pub fn hierarchy(&self) -> Result<Hierarchy, ApiError> {
        Hierarchy::new(self.hierarchy.clone())
    }

    /// Registry backed by the configured instances; loads on first use.
    pub fn instance_registry(&self) -> InstanceRegistry {
        InstanceRegistry::with_repository(Arc::new(ConfigInstanceRepository::new(
            self.instances.clone(),
        )))
    }

    /// Base paths by `(instance, side)`; a later duplicate replaces an earlier one.
    pub fn path_configs(&self) -> PathConfigSet {
        let mut set = PathConfigSet::default();
        for entry in &self.paths {
            set.upsert(entry.to_path_config());
        }
        set
    }

    /// Run every check and collect the findings.
    pub fn report(&self) -> ConfigReport {
        validation::check(self)
    }

    /// Fail with every error found, joined.
    pub fn validate(&self) -> Result<(), ApiError> {
        let report = self.report();
        if report.is_valid() {
            Ok(())
        } else {
            Err(ApiError::ConfigError(report.errors.join("; ")))
        }
    }
}
