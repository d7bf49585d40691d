//! Container path reasoning.
//!
//! Everything here works on root-first segment lists. Listings from the
//! remote side are normalized on the way in (`listing`), configured base
//! paths are parsed once (`config`), and the matching (`select`) and level
//! derivation (`level`) never see any other ordering.

pub mod config;
pub mod level;
pub mod listing;
pub mod select;

pub use config::{split_path, PathConfig, PathConfigSet};
pub use level::calculate_level;
pub use listing::{CandidatePath, ContainerNode, ProcessGroupListing};
pub use select::{
    auto_select_path, match_positions, matches_prefix_and_infix, select_matching_path,
    synthesize_path,
};
