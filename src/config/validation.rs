//! Consistency checks across hierarchy, instances, paths and templates.

use super::DeployConfig;
use crate::hierarchy::Hierarchy;
use crate::naming::NameTemplate;
use serde::Serialize;
use std::collections::HashSet;

/// Findings from checking a configuration
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigReport {
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn add_check(&mut self, description: &str, passed: bool) {
        self.checks.push((description.to_string(), passed));
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(crate) fn check(config: &DeployConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    let hierarchy = match config.hierarchy() {
        Ok(h) if h.is_empty() => {
            report.add_check("Hierarchy defines at least one level", false);
            report.add_error("Hierarchy has no levels".to_string());
            None
        }
        Ok(h) => {
            report.add_check("Hierarchy defines at least one level", true);
            Some(h)
        }
        Err(e) => {
            report.add_check("Hierarchy levels are valid", false);
            report.add_error(e.to_string());
            None
        }
    };

    check_instances(config, hierarchy.as_ref(), &mut report);
    check_paths(config, &mut report);
    check_templates(config, hierarchy.as_ref(), &mut report);

    let base_url_ok = !config.deploy.api_base_url.trim().is_empty();
    report.add_check("API base URL is set", base_url_ok);
    if !base_url_ok {
        report.add_error("deploy.api_base_url is empty".to_string());
    }
    if config.deploy.request_timeout_secs == 0 {
        report.add_error("deploy.request_timeout_secs must be positive".to_string());
    }

    report
}

fn check_instances(config: &DeployConfig, hierarchy: Option<&Hierarchy>, report: &mut ConfigReport) {
    let mut ids = HashSet::new();
    let mut bindings = HashSet::new();
    let mut unique = true;
    for instance in &config.instances {
        if !ids.insert(instance.id.as_str()) {
            unique = false;
            report.add_error(format!("Instance id '{}' is defined more than once", instance.id));
        }
        let binding = (
            instance.hierarchy_level_name.as_str(),
            instance.hierarchy_level_value.as_str(),
        );
        if !bindings.insert(binding) {
            unique = false;
            report.add_error(format!(
                "More than one instance is bound to {}={}",
                binding.0, binding.1
            ));
        }
        if let Some(hierarchy) = hierarchy {
            // Resolution only ever uses the top level
            let top = hierarchy.top().map(|l| l.name.as_str());
            if top != Some(instance.hierarchy_level_name.as_str()) {
                report.add_warning(format!(
                    "Instance '{}' is bound to level '{}', which is not the top level; it will never be resolved",
                    instance.id, instance.hierarchy_level_name
                ));
            }
        }
    }
    report.add_check("Instance ids and bindings are unique", unique);
}

fn check_paths(config: &DeployConfig, report: &mut ConfigReport) {
    let known: HashSet<&str> = config.instances.iter().map(|i| i.id.as_str()).collect();
    let mut all_known = true;
    let mut seen = HashSet::new();
    for entry in &config.paths {
        if !known.contains(entry.instance_id.as_str()) {
            all_known = false;
            report.add_error(format!(
                "Path for {} side references unknown instance '{}'",
                entry.side, entry.instance_id
            ));
        }
        if !seen.insert((entry.instance_id.as_str(), entry.side)) {
            report.add_warning(format!(
                "Duplicate {} path for instance '{}'; the last one wins",
                entry.side, entry.instance_id
            ));
        }
        if entry.to_path_config().segments.is_empty() {
            report.add_error(format!(
                "Path for instance '{}' ({}) is empty",
                entry.instance_id, entry.side
            ));
        }
    }
    report.add_check("Path configs reference known instances", all_known);
}

fn check_templates(config: &DeployConfig, hierarchy: Option<&Hierarchy>, report: &mut ConfigReport) {
    let mut ids = HashSet::new();
    for template in &config.templates {
        if !ids.insert(template.id) {
            report.add_error(format!("Template id {} is defined more than once", template.id));
        }
    }

    let Some(hierarchy) = hierarchy else {
        return;
    };
    let template = config.deploy.name_template.as_str();
    let known = NameTemplate::placeholders(hierarchy.len());
    for placeholder in placeholders_in(template) {
        if !known.iter().any(|k| k == placeholder) {
            report.add_warning(format!(
                "Name template placeholder {} is not recognized and will be kept verbatim",
                placeholder
            ));
        }
    }
}

fn placeholders_in(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        match rest[start..].find('}') {
            Some(end) => {
                found.push(&rest[start..start + end + 1]);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    found
}
