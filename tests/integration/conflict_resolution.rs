use super::support::{conflict, label, ready_target, Call, ScriptedClient};
use flowdeploy::deploy::{
    BatchProgress, ConflictAction, DeployFlags, DeploymentOrchestrator, OrchestratorState,
};
use flowdeploy::error::{ApiError, RemoteError, RemoteErrorKind};
use std::sync::Arc;

/// Orchestrator suspended on target B of [A, B, C].
async fn suspended_on_b(client: &Arc<ScriptedClient>) -> DeploymentOrchestrator {
    let mut orchestrator = DeploymentOrchestrator::new(client.clone(), DeployFlags::default());
    let mut b = ready_target("B");
    b.version = Some(3);
    let progress = orchestrator
        .run_batch(vec![ready_target("A"), b, ready_target("C")])
        .await
        .unwrap();
    assert!(matches!(progress, BatchProgress::Suspended(_)));
    orchestrator
}

#[tokio::test]
async fn deploy_anyway_resubmits_without_name() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false))),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    orchestrator
        .resolve_conflict(ConflictAction::DeployAnyway)
        .await
        .unwrap();

    let deploys = client.deploy_calls();
    assert_eq!(
        deploys[2],
        Call::Deploy {
            instance_id: "nifi-1".to_string(),
            name: None,
            parent: "pg-parent".to_string(),
        }
    );
}

#[tokio::test]
async fn delete_and_deploy_resubmits_original_request() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false))),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    let BatchProgress::Completed(result) = orchestrator
        .resolve_conflict(ConflictAction::DeleteAndDeploy)
        .await
        .unwrap()
    else {
        panic!("batch should complete");
    };

    let calls = client.calls();
    assert_eq!(
        calls[2],
        Call::Delete {
            instance_id: "nifi-1".to_string(),
            group_id: "pg-existing".to_string(),
        }
    );
    assert!(matches!(&calls[3], Call::Deploy { name: Some(n), .. } if n == "B"));
    let b = result.outcome_for(&label("B")).unwrap();
    assert!(b.success);
    assert_eq!(b.resolution, Some(ConflictAction::DeleteAndDeploy));
}

#[tokio::test]
async fn failed_delete_never_resubmits() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false)))
            .failing_delete(RemoteError::remote("permission denied").with_status(403)),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    let BatchProgress::Completed(result) = orchestrator
        .resolve_conflict(ConflictAction::DeleteAndDeploy)
        .await
        .unwrap()
    else {
        panic!("batch should complete");
    };

    let b = result.outcome_for(&label("B")).unwrap();
    assert!(!b.success);
    assert_eq!(
        b.error.as_deref(),
        Some("Failed to delete existing process group: permission denied")
    );
    assert_eq!(b.error_kind, Some(RemoteErrorKind::Remote));

    // A, B (conflict), then C only: B was not resubmitted
    let deploys = client.deploy_calls();
    assert_eq!(deploys.len(), 3);
    assert!(matches!(&deploys[2], Call::Deploy { name: Some(n), .. } if n == "C"));
    assert!(result.outcome_for(&label("C")).unwrap().success);
}

#[tokio::test]
async fn update_version_requires_version_control() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false))),
    );
    let mut orchestrator = suspended_on_b(&client).await;

    let context = orchestrator.pending_conflict().unwrap();
    assert!(!context.available_actions().contains(&ConflictAction::UpdateVersion));

    let rejected = orchestrator
        .resolve_conflict(ConflictAction::UpdateVersion)
        .await;
    assert!(matches!(rejected, Err(ApiError::InvalidResolution(_))));
    assert_eq!(orchestrator.state(), OrchestratorState::Suspended);
    assert!(orchestrator.pending_conflict().is_some());
    assert_eq!(
        client.count(|c| matches!(c, Call::UpdateVersion { .. })),
        0
    );

    // Still resolvable with an allowed action
    let progress = orchestrator
        .resolve_conflict(ConflictAction::DeployAnyway)
        .await
        .unwrap();
    assert!(matches!(progress, BatchProgress::Completed(_)));
}

#[tokio::test]
async fn update_version_updates_existing_group_only() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(true))),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    let BatchProgress::Completed(result) = orchestrator
        .resolve_conflict(ConflictAction::UpdateVersion)
        .await
        .unwrap()
    else {
        panic!("batch should complete");
    };

    assert!(client.calls().contains(&Call::UpdateVersion {
        instance_id: "nifi-1".to_string(),
        group_id: "pg-existing".to_string(),
        version: Some(3),
    }));
    // A, B (conflict), C: no new container for B
    assert_eq!(client.deploy_calls().len(), 3);

    let b = result.outcome_for(&label("B")).unwrap();
    assert!(b.success);
    assert_eq!(b.result_id.as_deref(), Some("pg-existing"));
    assert_eq!(b.result_name.as_deref(), Some("B"));
    assert_eq!(b.resolution, Some(ConflictAction::UpdateVersion));
}

#[tokio::test]
async fn failed_version_update_is_recorded() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(true)))
            .failing_update(RemoteError::transport("timed out")),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    let BatchProgress::Completed(result) = orchestrator
        .resolve_conflict(ConflictAction::UpdateVersion)
        .await
        .unwrap()
    else {
        panic!("batch should complete");
    };
    let b = result.outcome_for(&label("B")).unwrap();
    assert!(!b.success);
    assert_eq!(b.error_kind, Some(RemoteErrorKind::Transport));
}

#[tokio::test]
async fn second_conflict_during_resolution_is_a_failure() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false)))
            .then_deploy(Err(conflict(false))),
    );
    let mut orchestrator = suspended_on_b(&client).await;
    let progress = orchestrator
        .resolve_conflict(ConflictAction::DeployAnyway)
        .await
        .unwrap();
    let BatchProgress::Completed(result) = progress else {
        panic!("resolution never suspends again");
    };
    let b = result.outcome_for(&label("B")).unwrap();
    assert!(!b.success);
    assert_eq!(b.error_kind, Some(RemoteErrorKind::Conflict));
    assert!(result.outcome_for(&label("C")).unwrap().success);
}
