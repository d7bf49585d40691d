//! Hierarchy Model
//!
//! The ordered chain of named attribute levels (for example `DC → O → OU → CN`)
//! and the flow records that carry a value for every level on both sides.
//! Level 0 selects the managed instance, the last level is the flow's own
//! identity, and everything in between is placement inside the instance.

pub mod flow;
pub mod levels;

pub use flow::{load_flows, FlowRecord, SideValues};
pub use levels::{Hierarchy, HierarchyLevel};
