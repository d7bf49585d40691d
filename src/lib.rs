//! flowdeploy: Hierarchical Flow Deployment
//!
//! Deploys templated flows into process groups on managed instances. Each
//! flow carries per-level hierarchy values for its source and destination
//! side; those values pick the instance (top level), the parent container
//! (base path plus intermediate levels), the hierarchy attribute and the
//! display name. Deployments run strictly one at a time and a naming
//! conflict suspends the batch until the caller chooses how to resolve it.

pub mod cache;
pub mod client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod hierarchy;
pub mod instance;
pub mod logging;
pub mod naming;
pub mod path;
pub mod tooling;
pub mod types;
