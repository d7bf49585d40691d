//! Target preparation.
//!
//! For each `(flow, side)` with a template: resolve the instance from the top
//! hierarchy value, find or synthesize the parent path, derive the hierarchy
//! attribute and render the name. Misses never abort preparation; they are
//! noted on the prepared target and surface as validation failures when the
//! batch runs.

use crate::cache::PathCache;
use crate::deploy::target::DeploymentTarget;
use crate::hierarchy::{FlowRecord, Hierarchy};
use crate::instance::InstanceRegistry;
use crate::naming::NameTemplate;
use crate::path::{auto_select_path, calculate_level, synthesize_path, CandidatePath, PathConfigSet};
use crate::types::{ContainerId, FlowId, InstanceId, Side, TemplateId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A deployable template known to the manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: String,
}

/// Everything preparation reads
pub struct PreparationContext<'a> {
    pub hierarchy: &'a Hierarchy,
    pub instances: &'a InstanceRegistry,
    pub paths: &'a PathConfigSet,
    pub templates: &'a [TemplateDescriptor],
    pub name_template: &'a NameTemplate,
    /// Parameter context to bind per side
    pub parameter_contexts: HashMap<Side, String>,
    /// Template version to deploy; `None` = latest
    pub version: Option<i64>,
}

/// A target plus notes about anything that could not be resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedTarget {
    pub target: DeploymentTarget,
    pub issues: Vec<String>,
}

impl PreparedTarget {
    pub fn is_ready(&self) -> bool {
        self.target.instance_id.is_some()
            && (self.target.resolved_container_id.is_some() || self.target.parent_path.is_some())
    }
}

pub struct TargetPreparer<'a> {
    context: PreparationContext<'a>,
    manual: HashMap<(FlowId, Side), ContainerId>,
}

impl<'a> TargetPreparer<'a> {
    pub fn new(context: PreparationContext<'a>) -> Self {
        Self {
            context,
            manual: HashMap::new(),
        }
    }

    /// Pin a flow side to a process group chosen by hand; skips auto-selection.
    pub fn with_manual_selection(
        mut self,
        flow_id: impl Into<FlowId>,
        side: Side,
        container_id: impl Into<ContainerId>,
    ) -> Self {
        self.manual.insert((flow_id.into(), side), container_id.into());
        self
    }

    /// Instances whose listings preparation will look at.
    pub fn required_instances(&self, flows: &[FlowRecord]) -> Vec<InstanceId> {
        let mut ids = BTreeSet::new();
        for flow in flows {
            for side in Side::ALL {
                if flow.template_id(side).is_none() {
                    continue;
                }
                if let Some(instance) =
                    self.context
                        .instances
                        .resolve_for_flow(self.context.hierarchy, flow, side)
                {
                    ids.insert(instance.id.clone());
                }
            }
        }
        ids.into_iter().collect()
    }

    /// Prepare every templated side of every flow, source before destination.
    ///
    /// Listings are read from `cache`; an instance with no cached listing is
    /// treated as having no existing containers.
    pub fn prepare_all(&self, flows: &[FlowRecord], cache: &PathCache) -> Vec<PreparedTarget> {
        let mut prepared = Vec::new();
        for flow in flows {
            for side in Side::ALL {
                let listing = self
                    .context
                    .instances
                    .resolve_for_flow(self.context.hierarchy, flow, side)
                    .and_then(|instance| cache.get(&instance.id));
                let candidates: &[CandidatePath] = listing.as_deref().map(Vec::as_slice).unwrap_or(&[]);
                if let Some(target) = self.prepare(flow, side, candidates) {
                    prepared.push(target);
                }
            }
        }
        prepared
    }

    /// Prepare one side of a flow; `None` when that side has no template.
    pub fn prepare(
        &self,
        flow: &FlowRecord,
        side: Side,
        candidates: &[CandidatePath],
    ) -> Option<PreparedTarget> {
        let ctx = &self.context;
        let template_id = flow.template_id(side)?;
        let mut issues = Vec::new();

        let mut target = DeploymentTarget::new(flow.id.clone(), side);
        target.template_id = Some(template_id);
        target.template_name = ctx
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .map(|t| t.name.clone());
        if target.template_name.is_none() {
            issues.push(format!("Template {} is not in the template catalog", template_id));
        }
        target.hierarchy_value = ctx.hierarchy.top_value(flow, side).unwrap_or("").to_string();
        target.parameter_context_name = ctx.parameter_contexts.get(&side).cloned();
        target.version = ctx.version;

        let ordered = ctx.hierarchy.ordered_values(flow, side);
        let rendered = ctx.name_template.render(&ordered);
        target.generated_name = rendered.clone();

        let Some(instance) = ctx.instances.resolve_for_flow(ctx.hierarchy, flow, side) else {
            let level = ctx.hierarchy.top().map(|l| l.name.as_str()).unwrap_or("?");
            issues.push(format!(
                "No instance serves {}={}",
                level, target.hierarchy_value
            ));
            return Some(PreparedTarget { target, issues });
        };
        target.instance_id = Some(instance.id.clone());

        let config = ctx.paths.get(&instance.id, side);
        let manual = self.manual.get(&(flow.id.clone(), side));

        if let Some(container_id) = manual {
            target.resolved_container_id = Some(container_id.clone());
            match candidates.iter().find(|c| &c.container_id == container_id) {
                Some(candidate) => target.container_path = candidate.segments.clone(),
                None => issues.push(format!(
                    "Manually selected process group {} is not in the listing",
                    container_id
                )),
            }
        } else if let Some(config) = config {
            match auto_select_path(ctx.hierarchy, flow, side, &instance.id, ctx.paths, candidates) {
                Some(candidate) => {
                    target.resolved_container_id = Some(candidate.container_id.clone());
                    target.container_path = candidate.segments.clone();
                }
                None => {
                    let infix = ctx.hierarchy.infix_values(flow, side);
                    let path = synthesize_path(&config.segments, &infix);
                    issues.push(format!(
                        "No existing process group matched; will create /{}",
                        path.join("/")
                    ));
                    let leaf = ctx.hierarchy.leaf_value(flow, side).unwrap_or("");
                    if !leaf.is_empty() {
                        target.generated_name = leaf.to_string();
                    }
                    target.container_path = path.clone();
                    target.parent_path = Some(path);
                }
            }
        } else {
            issues.push(format!(
                "No base path configured for {} ({}); select a process group manually",
                instance.id, side
            ));
        }

        if let Some(config) = config {
            if !target.container_path.is_empty() {
                target.hierarchy_attribute =
                    calculate_level(&target.container_path, config, ctx.hierarchy)
                        .map(str::to_string);
            }
        }

        debug!(
            deployment = %target.label(),
            instance_id = ?target.instance_id,
            container = ?target.resolved_container_id,
            attribute = ?target.hierarchy_attribute,
            name = %target.generated_name,
            "Prepared deployment target"
        );
        Some(PreparedTarget { target, issues })
    }
}
