//! Instance Resolver
//!
//! Maps a `(hierarchy level name, level value)` pair onto the managed instance
//! that serves it. A miss is an ordinary outcome, not an error.

pub mod registry;
pub mod repository;
pub mod resolver;

pub use registry::InstanceRegistry;
pub use repository::{ConfigInstanceRepository, InstanceRepository};
pub use resolver::{resolve_instance, ConnectionInfo, InstanceDescriptor};
