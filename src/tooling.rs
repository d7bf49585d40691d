//! Command-line surface over the deployment library.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
