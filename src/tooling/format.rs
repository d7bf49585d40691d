//! Text rendering for CLI output.

use crate::config::ConfigReport;
use crate::deploy::{BatchResult, ConflictContext, PreparedTarget};
use crate::hierarchy::Hierarchy;
use crate::instance::InstanceDescriptor;
use crate::naming::NameTemplate;
use crate::path::CandidatePath;
use comfy_table::presets::{UTF8_BORDERS_ONLY, UTF8_FULL};
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn slash_path(segments: &[String]) -> String {
    if segments.is_empty() {
        "-".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

pub fn format_levels_text(hierarchy: &Hierarchy) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Hierarchy"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Level", "Order", "Placeholder"]);
    for (index, level) in hierarchy.levels().iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            level.name.clone(),
            level.order.to_string(),
            format!("{{{}_hierarchy_value}}", index + 1),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str("Also available: ");
    out.push_str(&NameTemplate::placeholders(0).join(", "));
    out.push('\n');
    out
}

pub fn format_instances_text(instances: &[InstanceDescriptor]) -> String {
    if instances.is_empty() {
        return "No instances configured.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Instance", "Level", "Value", "URL", "TLS verify"]);
    for instance in instances {
        table.add_row(vec![
            instance.id.clone(),
            instance.hierarchy_level_name.clone(),
            instance.hierarchy_level_value.clone(),
            instance.connection.base_url.clone(),
            if instance.connection.verify_tls { "yes" } else { "no" }.to_string(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_report_text(report: &ConfigReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Configuration"));
    for (description, passed) in &report.checks {
        let mark = if *passed {
            format!("{}", "ok".green())
        } else {
            format!("{}", "FAIL".red())
        };
        out.push_str(&format!("  [{}] {}\n", mark, description));
    }
    for warning in &report.warnings {
        out.push_str(&format!("  {} {}\n", "warning:".yellow(), warning));
    }
    for error in &report.errors {
        out.push_str(&format!("  {} {}\n", "error:".red(), error));
    }
    out
}

pub fn format_plan_text(prepared: &[PreparedTarget]) -> String {
    if prepared.is_empty() {
        return "Nothing to deploy: no active flow has a template.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Target", "Instance", "Parent", "Name", "Template", "Attribute", "Ready",
    ]);
    for entry in prepared {
        let target = &entry.target;
        let parent = match (&target.resolved_container_id, &target.parent_path) {
            (Some(id), _) => format!("{} ({})", slash_path(&target.container_path), id),
            (None, Some(path)) => format!("{} (new)", slash_path(path)),
            (None, None) => "-".to_string(),
        };
        table.add_row(vec![
            target.label(),
            target.instance_id.clone().unwrap_or_else(|| "-".to_string()),
            parent,
            target.generated_name.clone(),
            target
                .template_name
                .clone()
                .or_else(|| target.template_id.map(|id| id.to_string()))
                .unwrap_or_else(|| "-".to_string()),
            target.hierarchy_attribute.clone().unwrap_or_else(|| "-".to_string()),
            if entry.is_ready() { "yes" } else { "no" }.to_string(),
        ]);
    }
    let mut out = format!("{}\n", table);
    let issues: Vec<_> = prepared
        .iter()
        .flat_map(|p| p.issues.iter().map(move |issue| (p.target.label(), issue)))
        .collect();
    if !issues.is_empty() {
        out.push('\n');
        for (label, issue) in issues {
            out.push_str(&format!("  {} {}: {}\n", "note:".yellow(), label, issue));
        }
    }
    out
}

pub fn format_conflict_text(context: &ConflictContext) -> String {
    let existing = &context.existing_container;
    format!(
        "{} {} on {}\n  existing: {} ({})\n  running: {}, stopped: {}, version control: {}\n  {}\n",
        "Conflict:".red().bold(),
        context.pending_target.label(),
        context.instance_id,
        existing.name,
        existing.id,
        existing.running_count,
        existing.stopped_count,
        if existing.has_version_control { "yes" } else { "no" },
        context.message
    )
}

pub fn format_batch_text(result: &BatchResult) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Target", "Result", "Process group", "Resolution", "Error"]);
    for outcome in &result.outcomes {
        let status = if outcome.success {
            format!("{}", "ok".green())
        } else {
            format!("{}", "failed".red())
        };
        let group = match (&outcome.result_name, &outcome.result_id) {
            (Some(name), Some(id)) => format!("{} ({})", name, id),
            (None, Some(id)) => id.clone(),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            outcome.target.label(),
            status,
            group,
            outcome
                .resolution
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            outcome.error.clone().unwrap_or_default(),
        ]);
    }
    for target in &result.abandoned {
        table.add_row(vec![
            target.label(),
            format!("{}", "abandoned".yellow()),
            "-".to_string(),
            "-".to_string(),
            String::new(),
        ]);
    }

    let mut out = format!("{}\n\n", table);
    out.push_str(&format!(
        "{} succeeded, {} failed, {} abandoned{}\n",
        result.succeeded(),
        result.failed(),
        result.abandoned.len(),
        if result.cancelled { " (cancelled)" } else { "" }
    ));
    out
}

pub fn format_selection_text(
    selected: Option<&CandidatePath>,
    synthesized: &[String],
    level: Option<&str>,
) -> String {
    match selected {
        Some(candidate) => format!(
            "Selected {} ({})\nHierarchy attribute: {}\n",
            candidate.display(),
            candidate.container_id,
            level.unwrap_or("-")
        ),
        None => format!(
            "No existing process group matched; a new one would be created under {}\n",
            slash_path(synthesized)
        ),
    }
}
