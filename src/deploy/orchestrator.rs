//! Deployment Orchestrator
//!
//! Submits targets strictly one at a time. A naming conflict suspends the
//! whole batch with a single pending `ConflictContext`; nothing further is
//! submitted until `resolve_conflict` or `cancel` is called. Other failures,
//! including validation and transport failures, are recorded and the batch
//! moves on. Nothing is retried automatically.
//!
//! ```text
//! Idle ─run_batch─▶ Running ─conflict─▶ Suspended ─resolve_conflict─▶ Resolving
//!                     │  ▲                  │                             │
//!                     │  └──────────────────┼─────────────────────────────┘
//!                     ▼                     ▼ cancel
//!                 Completed ◀───────────────┘
//! ```

use crate::deploy::client::DeploymentClient;
use crate::deploy::conflict::{ConflictAction, ConflictContext};
use crate::deploy::request::{DeployFlags, DeploymentRequest};
use crate::deploy::result::{BatchResult, TargetOutcome};
use crate::deploy::target::DeploymentTarget;
use crate::error::{ApiError, RemoteError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Idle,
    Running,
    Suspended,
    Resolving,
    Completed,
}

/// Where a batch stands after `run_batch` or `resolve_conflict` returns
#[derive(Debug, Clone)]
pub enum BatchProgress {
    /// Waiting for a resolution of this conflict
    Suspended(ConflictContext),
    Completed(BatchResult),
}

pub struct DeploymentOrchestrator {
    client: Arc<dyn DeploymentClient>,
    flags: DeployFlags,
    state: OrchestratorState,
    queue: VecDeque<DeploymentTarget>,
    outcomes: Vec<TargetOutcome>,
    conflict: Option<ConflictContext>,
    started_at: Option<DateTime<Utc>>,
}

impl DeploymentOrchestrator {
    pub fn new(client: Arc<dyn DeploymentClient>, flags: DeployFlags) -> Self {
        Self {
            client,
            flags,
            state: OrchestratorState::Idle,
            queue: VecDeque::new(),
            outcomes: Vec::new(),
            conflict: None,
            started_at: None,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn pending_conflict(&self) -> Option<&ConflictContext> {
        self.conflict.as_ref()
    }

    /// Outcomes recorded so far in the current batch.
    pub fn outcomes(&self) -> &[TargetOutcome] {
        &self.outcomes
    }

    /// Targets not yet submitted, excluding a suspended one.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Start a batch and run it until it completes or suspends.
    pub async fn run_batch(
        &mut self,
        targets: Vec<DeploymentTarget>,
    ) -> Result<BatchProgress, ApiError> {
        match self.state {
            OrchestratorState::Running
            | OrchestratorState::Suspended
            | OrchestratorState::Resolving => {
                return Err(ApiError::InvalidState(format!(
                    "Cannot start a batch while another is {:?}",
                    self.state
                )));
            }
            OrchestratorState::Idle | OrchestratorState::Completed => {}
        }

        info!(targets = targets.len(), "Starting deployment batch");
        self.queue = targets.into();
        self.outcomes.clear();
        self.conflict = None;
        self.started_at = Some(Utc::now());
        self.state = OrchestratorState::Running;
        Ok(self.drive().await)
    }

    /// Apply the caller's choice to the pending conflict, then continue the batch.
    ///
    /// An action the conflict does not allow leaves it pending.
    pub async fn resolve_conflict(
        &mut self,
        action: ConflictAction,
    ) -> Result<BatchProgress, ApiError> {
        if self.state != OrchestratorState::Suspended {
            return Err(ApiError::InvalidState(format!(
                "No conflict to resolve (state {:?})",
                self.state
            )));
        }
        let allowed = match &self.conflict {
            Some(context) => context.allows(action),
            None => {
                return Err(ApiError::InvalidState(
                    "Suspended without a pending conflict".to_string(),
                ))
            }
        };
        if !allowed {
            return Err(ApiError::InvalidResolution(format!(
                "{} requires a version-controlled process group",
                action
            )));
        }
        let Some(context) = self.conflict.take() else {
            return Err(ApiError::InvalidState(
                "Suspended without a pending conflict".to_string(),
            ));
        };

        self.state = OrchestratorState::Resolving;
        info!(
            deployment = %context.pending_target.label(),
            existing_id = %context.existing_container.id,
            action = %action,
            "Resolving deployment conflict"
        );

        let outcome = match action {
            ConflictAction::DeployAnyway => self.deploy_anyway(&context).await,
            ConflictAction::DeleteAndDeploy => self.delete_and_deploy(&context).await,
            ConflictAction::UpdateVersion => self.update_version(&context).await,
        }
        .with_resolution(action);

        self.outcomes.push(outcome);
        self.state = OrchestratorState::Running;
        Ok(self.drive().await)
    }

    /// Abandon the batch: the suspended target and everything after it.
    pub fn cancel(&mut self) -> Result<BatchResult, ApiError> {
        if self.state != OrchestratorState::Suspended {
            return Err(ApiError::InvalidState(format!(
                "Nothing to cancel (state {:?})",
                self.state
            )));
        }
        let mut abandoned = Vec::new();
        if let Some(context) = self.conflict.take() {
            abandoned.push(context.pending_target);
        }
        abandoned.extend(self.queue.drain(..));
        warn!(abandoned = abandoned.len(), "Deployment batch cancelled");
        Ok(self.finish(abandoned, true))
    }

    /// Drop all batch state and return to idle.
    pub fn reset(&mut self) {
        debug!(state = ?self.state, "Resetting orchestrator");
        self.queue.clear();
        self.outcomes.clear();
        self.conflict = None;
        self.started_at = None;
        self.state = OrchestratorState::Idle;
    }

    async fn drive(&mut self) -> BatchProgress {
        while let Some(target) = self.queue.pop_front() {
            let (instance_id, request) = match target.to_request(self.flags) {
                Ok(prepared) => prepared,
                Err(e) => {
                    warn!(deployment = %target.label(), error = %e, "Target failed validation");
                    self.outcomes
                        .push(TargetOutcome::failed(target, e.to_string(), None));
                    continue;
                }
            };

            debug!(
                deployment = %target.label(),
                instance_id = %instance_id,
                parent = %request.parent_label(),
                name = ?request.process_group_name,
                "Submitting deployment"
            );

            match self.client.deploy(&instance_id, &request).await {
                Ok(response) => {
                    info!(
                        deployment = %target.label(),
                        process_group_id = %response.process_group_id,
                        "Deployment succeeded"
                    );
                    let name = response
                        .process_group_name
                        .or_else(|| request.process_group_name.clone());
                    self.outcomes.push(TargetOutcome::succeeded(
                        target,
                        response.process_group_id,
                        name,
                    ));
                }
                Err(e) => match e.existing_process_group() {
                    Some(existing) => {
                        warn!(
                            deployment = %target.label(),
                            existing_id = %existing.id,
                            existing_name = %existing.name,
                            "Process group already exists; batch suspended"
                        );
                        let context = ConflictContext {
                            existing_container: existing,
                            pending_request: request,
                            pending_target: target,
                            instance_id,
                            message: e.message,
                        };
                        self.conflict = Some(context.clone());
                        self.state = OrchestratorState::Suspended;
                        return BatchProgress::Suspended(context);
                    }
                    None => {
                        warn!(deployment = %target.label(), error = %e, "Deployment failed");
                        self.outcomes.push(remote_failure(target, &e, None));
                    }
                },
            }
        }

        BatchProgress::Completed(self.finish(Vec::new(), false))
    }

    fn finish(&mut self, abandoned: Vec<DeploymentTarget>, cancelled: bool) -> BatchResult {
        self.state = OrchestratorState::Completed;
        let result = BatchResult {
            outcomes: std::mem::take(&mut self.outcomes),
            abandoned,
            cancelled,
            started_at: self.started_at.take().unwrap_or_else(Utc::now),
            finished_at: Utc::now(),
        };
        info!(
            succeeded = result.succeeded(),
            failed = result.failed(),
            abandoned = result.abandoned.len(),
            "Deployment batch finished"
        );
        result
    }

    async fn submit(&self, context: &ConflictContext, request: &DeploymentRequest) -> TargetOutcome {
        let target = context.pending_target.clone();
        match self.client.deploy(&context.instance_id, request).await {
            Ok(response) => {
                let name = response
                    .process_group_name
                    .or_else(|| request.process_group_name.clone());
                TargetOutcome::succeeded(target, response.process_group_id, name)
            }
            Err(e) => {
                warn!(deployment = %target.label(), error = %e, "Resubmission failed");
                remote_failure(target, &e, None)
            }
        }
    }

    async fn deploy_anyway(&self, context: &ConflictContext) -> TargetOutcome {
        let request = context.pending_request.without_name();
        self.submit(context, &request).await
    }

    async fn delete_and_deploy(&self, context: &ConflictContext) -> TargetOutcome {
        let existing = &context.existing_container;
        if let Err(e) = self
            .client
            .delete_process_group(&context.instance_id, &existing.id)
            .await
        {
            warn!(
                deployment = %context.pending_target.label(),
                existing_id = %existing.id,
                error = %e,
                "Deleting existing process group failed; not resubmitting"
            );
            return remote_failure(
                context.pending_target.clone(),
                &e,
                Some("Failed to delete existing process group"),
            );
        }
        self.submit(context, &context.pending_request).await
    }

    async fn update_version(&self, context: &ConflictContext) -> TargetOutcome {
        let existing = &context.existing_container;
        let version = context.pending_request.version;
        match self
            .client
            .update_version(&context.instance_id, &existing.id, version)
            .await
        {
            Ok(()) => {
                info!(
                    existing_id = %existing.id,
                    version = ?version,
                    "Updated existing process group version"
                );
                TargetOutcome::succeeded(
                    context.pending_target.clone(),
                    existing.id.clone(),
                    Some(existing.name.clone()),
                )
            }
            Err(e) => remote_failure(
                context.pending_target.clone(),
                &e,
                Some("Failed to update process group version"),
            ),
        }
    }
}

fn remote_failure(target: DeploymentTarget, error: &RemoteError, prefix: Option<&str>) -> TargetOutcome {
    let message = match prefix {
        Some(prefix) => format!("{}: {}", prefix, error.message),
        None => error.message.clone(),
    };
    TargetOutcome::failed(target, message, Some(error.kind))
}
