//! Source composition for `DeployConfig`.

pub mod merge_policy;
pub mod service;
