//! Path Auto-Selection Engine
//!
//! A candidate matches when it starts with the configured prefix exactly and
//! the flow's infix values occur after that prefix in order, possibly
//! separated by unrelated segments (an ordered subsequence, not a contiguous
//! run). Real trees interleave organizational groups created for other flows,
//! so contiguous matching would miss valid placements.
//!
//! When several candidates match, the first one in listing order wins. The
//! listing order is whatever the instance returned and is not guaranteed to
//! be stable between calls; this is logged, not corrected.

use crate::hierarchy::{FlowRecord, Hierarchy};
use crate::path::config::PathConfigSet;
use crate::path::listing::CandidatePath;
use crate::types::Side;
use tracing::{debug, warn};

/// Positions at which each infix value was matched, or `None` if the candidate fails.
///
/// Positions index into `segments` and are strictly increasing.
pub fn match_positions(segments: &[String], prefix: &[String], infix: &[String]) -> Option<Vec<usize>> {
    if segments.len() < prefix.len() {
        return None;
    }
    if segments[..prefix.len()] != *prefix {
        return None;
    }

    let mut cursor = prefix.len();
    let mut positions = Vec::with_capacity(infix.len());
    for wanted in infix {
        let offset = segments[cursor..].iter().position(|s| s == wanted)?;
        let found = cursor + offset;
        positions.push(found);
        cursor = found + 1;
    }
    Some(positions)
}

pub fn matches_prefix_and_infix(segments: &[String], prefix: &[String], infix: &[String]) -> bool {
    match_positions(segments, prefix, infix).is_some()
}

/// First candidate, in the given order, satisfying prefix and infix.
pub fn select_matching_path<'a>(
    prefix: &[String],
    infix: &[String],
    candidates: &'a [CandidatePath],
) -> Option<&'a CandidatePath> {
    let mut matching = candidates
        .iter()
        .filter(|candidate| matches_prefix_and_infix(&candidate.segments, prefix, infix));
    let selected = matching.next()?;
    let others = matching.count();
    if others > 0 {
        warn!(
            selected = %selected.display(),
            other_matches = others,
            "Several container paths match; taking the first in listing order"
        );
    }
    Some(selected)
}

/// Select an existing container for one side of a flow on an instance.
///
/// Returns `None` when no base path is configured for `(instance_id, side)`,
/// when there are no candidates, or when none matches. The caller then creates
/// a new container at [`synthesize_path`].
pub fn auto_select_path<'a>(
    hierarchy: &Hierarchy,
    flow: &FlowRecord,
    side: Side,
    instance_id: &str,
    configs: &PathConfigSet,
    available: &'a [CandidatePath],
) -> Option<&'a CandidatePath> {
    let Some(config) = configs.get(instance_id, side) else {
        debug!(instance_id, side = %side, "No base path configured");
        return None;
    };
    let infix = hierarchy.infix_values(flow, side);
    let selected = select_matching_path(&config.segments, &infix, available);
    debug!(
        flow_id = %flow.id,
        side = %side,
        instance_id,
        prefix = %config.display(),
        infix = ?infix,
        selected = ?selected.map(|c| c.display()),
        "Auto-selected container path"
    );
    selected
}

/// Path at which a container is created when nothing matched: `prefix + infix`.
pub fn synthesize_path(prefix: &[String], infix: &[String]) -> Vec<String> {
    prefix.iter().chain(infix.iter()).cloned().collect()
}
