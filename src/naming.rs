//! Name Template Engine
//!
//! Renders the display name of a deployed process group from a placeholder
//! template and the flow's hierarchy values in level order.
//!
//! Placeholders (case-sensitive):
//! - `{first_hierarchy_value}`: first value
//! - `{last_hierarchy_value}`: last value
//! - `{N_hierarchy_value}`: the N-th value, 1-indexed
//!
//! Anything else, including `{N_hierarchy_value}` with N out of range, is
//! left as written.

use serde::{Deserialize, Serialize};

pub const FIRST_PLACEHOLDER: &str = "{first_hierarchy_value}";
pub const LAST_PLACEHOLDER: &str = "{last_hierarchy_value}";

/// Render `template` against `ordered_values`.
///
/// With no values at all, `{first_*}` and `{last_*}` are left in place
/// rather than replaced with empty strings.
pub fn render_name(template: &str, ordered_values: &[String]) -> String {
    let mut name = template.to_string();

    if let (Some(first), Some(last)) = (ordered_values.first(), ordered_values.last()) {
        name = name.replace(FIRST_PLACEHOLDER, first);
        name = name.replace(LAST_PLACEHOLDER, last);
    }

    for (index, value) in ordered_values.iter().enumerate() {
        let placeholder = format!("{{{}_hierarchy_value}}", index + 1);
        name = name.replace(&placeholder, value);
    }

    name
}

/// Configured name template with its fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameTemplate(String);

impl Default for NameTemplate {
    fn default() -> Self {
        Self(LAST_PLACEHOLDER.to_string())
    }
}

impl NameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        if template.trim().is_empty() {
            Self::default()
        } else {
            Self(template)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, ordered_values: &[String]) -> String {
        render_name(&self.0, ordered_values)
    }

    /// Placeholders recognized for a hierarchy of `level_count` levels.
    pub fn placeholders(level_count: usize) -> Vec<String> {
        let mut placeholders = vec![FIRST_PLACEHOLDER.to_string(), LAST_PLACEHOLDER.to_string()];
        placeholders.extend((1..=level_count).map(|n| format!("{{{}_hierarchy_value}}", n)));
        placeholders
    }
}
