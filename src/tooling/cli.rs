//! CLI Tooling
//!
//! Workspace-scoped commands over the deployment library. Each command builds
//! what it needs from the loaded configuration and returns its output as a
//! string; the binary prints it.

use crate::cache::{ParameterContextCache, PathCache};
use crate::client::HttpDeploymentClient;
use crate::config::{ConfigLoader, DeployConfig};
use crate::deploy::{
    BatchProgress, BatchResult, ConflictAction, ConflictContext, DeploymentClient,
    DeploymentOrchestrator, PreparationContext, PreparedTarget, TargetPreparer,
};
use crate::error::ApiError;
use crate::hierarchy::{load_flows, FlowRecord, Hierarchy};
use crate::instance::InstanceRegistry;
use crate::logging::LoggingConfig;
use crate::naming::render_name;
use crate::path::{
    calculate_level, select_matching_path, split_path, synthesize_path, CandidatePath,
    PathConfig, PathConfigSet, ProcessGroupListing,
};
use crate::tooling::format;
use crate::types::Side;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Hierarchical flow deployment
#[derive(Parser)]
#[command(name = "flowdeploy")]
#[command(about = "Deploy templated flows to the instances their hierarchy values resolve to")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file (replaces the global and workspace files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging table.
    pub fn apply_log_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the hierarchy levels and name placeholders
    Levels {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List configured instances
    Instances {
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check the configuration for consistency
    Check {
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve instances, paths and names for every flow without deploying
    Plan {
        /// Flow records file (defaults to `flows` from the config)
        #[arg(long)]
        flows: Option<PathBuf>,
        /// Skip fetching process group listings; every path is treated as new
        #[arg(long)]
        offline: bool,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Deploy every prepared target, one at a time
    Deploy {
        #[arg(long)]
        flows: Option<PathBuf>,
        /// Resolve conflicts without prompting: deploy_anyway, delete_and_deploy, update_version
        #[arg(long)]
        on_conflict: Option<String>,
        /// Template version to deploy (default: latest)
        #[arg(long)]
        version: Option<i64>,
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Render a name template against hierarchy values
    RenderName {
        template: String,
        /// Hierarchy values in level order
        values: Vec<String>,
    },
    /// Match a base path and infix against a listing file, offline
    SelectPath {
        /// JSON file with the process group listing of one instance
        #[arg(long)]
        listing: PathBuf,
        /// Base path, e.g. "/NiFi Flow/From DC1"
        #[arg(long)]
        prefix: String,
        /// Infix hierarchy values, in order
        #[arg(long = "infix")]
        infix: Vec<String>,
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingFile {
    Wrapped { process_groups: Vec<ProcessGroupListing> },
    List(Vec<ProcessGroupListing>),
}

/// Loaded configuration plus the objects built from it
pub struct CliContext {
    workspace_root: PathBuf,
    config: DeployConfig,
    hierarchy: Hierarchy,
    instances: InstanceRegistry,
    paths: PathConfigSet,
    path_cache: PathCache,
    parameter_contexts: ParameterContextCache,
}

impl CliContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let hierarchy = config.hierarchy()?;
        let mut instances = config.instance_registry();
        instances.ensure_loaded()?;
        let paths = config.path_configs();

        Ok(Self {
            workspace_root,
            config,
            hierarchy,
            instances,
            paths,
            path_cache: PathCache::new(),
            parameter_contexts: ParameterContextCache::new(),
        })
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Levels { format } => self.handle_levels(format),
            Commands::Instances { format } => self.handle_instances(format),
            Commands::Check { format } => self.handle_check(format),
            Commands::Plan {
                flows,
                offline,
                format,
            } => self.handle_plan(flows.as_deref(), *offline, format),
            Commands::Deploy {
                flows,
                on_conflict,
                version,
                format,
            } => {
                let action = on_conflict
                    .as_deref()
                    .map(str::parse::<ConflictAction>)
                    .transpose()?;
                self.handle_deploy(flows.as_deref(), action, *version, format)
            }
            Commands::RenderName { template, values } => Ok(render_name(template, values)),
            Commands::SelectPath {
                listing,
                prefix,
                infix,
                format,
            } => self.handle_select_path(listing, prefix, infix, format),
        }
    }

    fn handle_levels(&self, format: &str) -> Result<String, ApiError> {
        match parse_format(format)? {
            OutputFormat::Json => to_json(&json!({
                "levels": self.hierarchy.levels(),
                "name_template": self.config.deploy.name_template,
            })),
            OutputFormat::Text => Ok(format::format_levels_text(&self.hierarchy)),
        }
    }

    fn handle_instances(&self, format: &str) -> Result<String, ApiError> {
        match parse_format(format)? {
            OutputFormat::Json => to_json(self.instances.list()),
            OutputFormat::Text => Ok(format::format_instances_text(self.instances.list())),
        }
    }

    fn handle_check(&self, format: &str) -> Result<String, ApiError> {
        let report = self.config.report();
        match parse_format(format)? {
            OutputFormat::Json => to_json(&report),
            OutputFormat::Text => Ok(format::format_report_text(&report)),
        }
    }

    fn handle_plan(
        &self,
        flows: Option<&Path>,
        offline: bool,
        format: &str,
    ) -> Result<String, ApiError> {
        let output = parse_format(format)?;
        let flows = self.load_active_flows(flows)?;
        let prepared = if offline {
            self.preparer(None).prepare_all(&flows, &self.path_cache)
        } else {
            let client = self.client()?;
            runtime()?.block_on(self.prepare_online(&flows, None, client.as_ref()))?
        };
        match output {
            OutputFormat::Json => to_json(&prepared),
            OutputFormat::Text => Ok(format::format_plan_text(&prepared)),
        }
    }

    fn handle_deploy(
        &self,
        flows: Option<&Path>,
        on_conflict: Option<ConflictAction>,
        version: Option<i64>,
        format: &str,
    ) -> Result<String, ApiError> {
        let output = parse_format(format)?;
        let flows = self.load_active_flows(flows)?;
        let client = self.client()?;

        let result = runtime()?.block_on(async {
            let prepared = self
                .prepare_online(&flows, version, client.as_ref())
                .await?;
            for entry in prepared.iter().filter(|p| !p.is_ready()) {
                warn!(
                    deployment = %entry.target.label(),
                    issues = ?entry.issues,
                    "Target is incomplete and will fail validation"
                );
            }
            let targets = prepared.into_iter().map(|p| p.target).collect();

            let mut orchestrator =
                DeploymentOrchestrator::new(Arc::clone(&client), self.config.deploy.flags());
            let mut progress = orchestrator.run_batch(targets).await?;
            let result = loop {
                match progress {
                    BatchProgress::Completed(result) => break result,
                    BatchProgress::Suspended(context) => {
                        if output == OutputFormat::Text {
                            eprint!("{}", format::format_conflict_text(&context));
                        }
                        match choose_action(&context, on_conflict)? {
                            Some(action) => {
                                progress = orchestrator.resolve_conflict(action).await?;
                            }
                            None => break orchestrator.cancel()?,
                        }
                    }
                }
            };
            self.invalidate_deployed(&result);
            Ok::<BatchResult, ApiError>(result)
        })?;

        info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            "Deploy command finished"
        );
        match output {
            OutputFormat::Json => to_json(&result),
            OutputFormat::Text => Ok(format::format_batch_text(&result)),
        }
    }

    fn handle_select_path(
        &self,
        listing: &Path,
        prefix: &str,
        infix: &[String],
        format: &str,
    ) -> Result<String, ApiError> {
        let output = parse_format(format)?;
        let content = std::fs::read_to_string(listing)?;
        let listings = match serde_json::from_str::<ListingFile>(&content)? {
            ListingFile::Wrapped { process_groups } => process_groups,
            ListingFile::List(list) => list,
        };
        let candidates: Vec<CandidatePath> = listings.iter().map(|l| l.to_candidate()).collect();
        let prefix_segments = split_path(prefix);
        let selected = select_matching_path(&prefix_segments, infix, &candidates);
        let synthesized = synthesize_path(&prefix_segments, infix);

        // Only the depth of the base path matters for the attribute
        let base = PathConfig::parse("", Side::Source, "", prefix);
        let level = selected.and_then(|c| calculate_level(&c.segments, &base, &self.hierarchy));

        match output {
            OutputFormat::Json => to_json(&json!({
                "selected": selected,
                "hierarchy_attribute": level,
                "synthesized_path": if selected.is_none() { Some(&synthesized) } else { None },
            })),
            OutputFormat::Text => Ok(format::format_selection_text(selected, &synthesized, level)),
        }
    }

    fn client(&self) -> Result<Arc<dyn DeploymentClient>, ApiError> {
        let settings = &self.config.deploy;
        let client = HttpDeploymentClient::new(
            settings.api_base_url.clone(),
            settings.api_token.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )?;
        Ok(Arc::new(client))
    }

    fn preparer(&self, version: Option<i64>) -> TargetPreparer<'_> {
        TargetPreparer::new(PreparationContext {
            hierarchy: &self.hierarchy,
            instances: &self.instances,
            paths: &self.paths,
            templates: &self.config.templates,
            name_template: &self.config.deploy.name_template,
            parameter_contexts: self.config.deploy.parameter_context_map(),
            version: version.or(self.config.deploy.version),
        })
    }

    /// Fetch listings for every instance involved, then prepare.
    ///
    /// A listing that cannot be fetched leaves that instance without
    /// candidates; its targets fall back to new containers.
    async fn prepare_online(
        &self,
        flows: &[FlowRecord],
        version: Option<i64>,
        client: &dyn DeploymentClient,
    ) -> Result<Vec<PreparedTarget>, ApiError> {
        let preparer = self.preparer(version);
        for instance_id in preparer.required_instances(flows) {
            if let Err(e) = self.path_cache.get_or_fetch(&instance_id, client).await {
                warn!(instance_id = %instance_id, error = %e, "Could not list process groups");
            }
        }
        let mut prepared = preparer.prepare_all(flows, &self.path_cache);
        self.check_parameter_contexts(&mut prepared, client).await;
        Ok(prepared)
    }

    async fn check_parameter_contexts(
        &self,
        prepared: &mut [PreparedTarget],
        client: &dyn DeploymentClient,
    ) {
        for entry in prepared.iter_mut() {
            let (Some(instance_id), Some(name)) = (
                entry.target.instance_id.clone(),
                entry.target.parameter_context_name.clone(),
            ) else {
                continue;
            };
            match self.parameter_contexts.get_or_fetch(&instance_id, client).await {
                Ok(names) if !names.contains(&name) => entry.issues.push(format!(
                    "Parameter context '{}' does not exist on {}",
                    name, instance_id
                )),
                Ok(_) => {}
                Err(e) => {
                    warn!(instance_id = %instance_id, error = %e, "Could not list parameter contexts")
                }
            }
        }
    }

    /// Deployments add or replace containers; drop the affected listings.
    fn invalidate_deployed(&self, result: &BatchResult) {
        let touched: BTreeSet<&str> = result
            .outcomes
            .iter()
            .filter(|o| o.success)
            .filter_map(|o| o.target.instance_id.as_deref())
            .collect();
        for instance_id in touched {
            self.path_cache.invalidate(instance_id);
        }
    }

    fn load_active_flows(&self, flows: Option<&Path>) -> Result<Vec<FlowRecord>, ApiError> {
        let path = match flows {
            Some(path) => path.to_path_buf(),
            None => {
                let configured = self.config.flows.as_ref().ok_or_else(|| {
                    ApiError::ConfigError(
                        "No flows file given; pass --flows or set `flows` in flowdeploy.toml"
                            .to_string(),
                    )
                })?;
                self.workspace_root.join(configured)
            }
        };
        let flows: Vec<FlowRecord> = load_flows(&path)?
            .into_iter()
            .filter(|f| f.active)
            .collect();
        info!(path = %path.display(), flows = flows.len(), "Loaded active flows");
        Ok(flows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_format(format: &str) -> Result<OutputFormat, ApiError> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(ApiError::ValidationError(format!(
            "Unknown output format '{}' (expected text or json)",
            other
        ))),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Resolution for a suspended batch; `None` cancels it.
///
/// A preset action the conflict does not allow cancels rather than failing,
/// so the remaining targets are reported as abandoned.
fn choose_action(
    context: &ConflictContext,
    preset: Option<ConflictAction>,
) -> Result<Option<ConflictAction>, ApiError> {
    if let Some(action) = preset {
        if context.allows(action) {
            return Ok(Some(action));
        }
        warn!(
            action = %action,
            existing_id = %context.existing_container.id,
            "Preset conflict action is not available; cancelling batch"
        );
        return Ok(None);
    }

    use dialoguer::Select;
    let actions = context.available_actions();
    let mut items: Vec<String> = actions
        .iter()
        .map(|a| format!("{}: {}", a, a.description()))
        .collect();
    items.push("cancel: abandon this and all remaining targets".to_string());

    let selection = Select::new()
        .with_prompt("How should this conflict be resolved?")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
    Ok(actions.get(selection).copied())
}
