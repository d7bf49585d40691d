//! Hierarchy-Attribute Calculator

use crate::hierarchy::Hierarchy;
use crate::path::config::PathConfig;

/// Hierarchy level represented by `full_path`, measured from the base path.
///
/// The base path stands for level 0, so a path `k` segments deeper than the
/// base maps to level index `k`. Offsets outside `1..len` yield `None`: the
/// attribute is advisory and a miss simply leaves it off the request.
pub fn calculate_level<'a>(
    full_path: &[String],
    config: &PathConfig,
    hierarchy: &'a Hierarchy,
) -> Option<&'a str> {
    let depth_offset = full_path.len() as isize - config.depth() as isize;
    if depth_offset <= 0 || depth_offset as usize >= hierarchy.len() {
        return None;
    }
    hierarchy
        .level_at(depth_offset as usize)
        .map(|level| level.name.as_str())
}
