//! Deployment
//!
//! Preparation turns `(flow, side)` pairs into deployment targets by running
//! the hierarchy, instance, path, attribute and naming steps in that order.
//! The orchestrator then submits targets one at a time and suspends the whole
//! batch on a naming conflict until the caller picks a resolution.

pub mod client;
pub mod conflict;
pub mod orchestrator;
pub mod prepare;
pub mod request;
pub mod result;
pub mod target;

pub use client::DeploymentClient;
pub use conflict::{ConflictAction, ConflictContext};
pub use orchestrator::{BatchProgress, DeploymentOrchestrator, OrchestratorState};
pub use prepare::{PreparationContext, PreparedTarget, TargetPreparer, TemplateDescriptor};
pub use request::{DeployFlags, DeploymentRequest, DeploymentResponse, ExistingProcessGroup};
pub use result::{BatchResult, TargetOutcome};
pub use target::DeploymentTarget;
