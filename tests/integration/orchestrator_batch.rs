use super::support::{conflict, label, ready_target, success, Call, ScriptedClient};
use flowdeploy::deploy::{
    BatchProgress, ConflictAction, DeployFlags, DeploymentOrchestrator, DeploymentTarget,
    OrchestratorState,
};
use flowdeploy::error::{ApiError, RemoteError, RemoteErrorKind};
use flowdeploy::types::Side;
use std::sync::Arc;

fn orchestrator(client: &Arc<ScriptedClient>) -> DeploymentOrchestrator {
    DeploymentOrchestrator::new(client.clone(), DeployFlags::default())
}

fn abc() -> Vec<DeploymentTarget> {
    vec![ready_target("A"), ready_target("B"), ready_target("C")]
}

#[tokio::test]
async fn sequential_batch_completes_in_order() {
    let client = Arc::new(ScriptedClient::new());
    let mut orchestrator = orchestrator(&client);

    let progress = orchestrator.run_batch(abc()).await.unwrap();
    let BatchProgress::Completed(result) = progress else {
        panic!("batch should complete");
    };

    assert_eq!(result.succeeded(), 3);
    assert_eq!(result.failed(), 0);
    assert!(!result.cancelled);
    assert!(result.started_at <= result.finished_at);
    let names: Vec<_> = client
        .deploy_calls()
        .into_iter()
        .map(|c| match c {
            Call::Deploy { name, .. } => name,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(
        names,
        vec![Some("A".to_string()), Some("B".to_string()), Some("C".to_string())]
    );
    assert_eq!(orchestrator.state(), OrchestratorState::Completed);
}

#[tokio::test]
async fn conflict_suspends_before_next_target() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(false))),
    );
    let mut orchestrator = orchestrator(&client);

    let progress = orchestrator.run_batch(abc()).await.unwrap();
    let BatchProgress::Suspended(context) = progress else {
        panic!("batch should suspend on B");
    };

    assert_eq!(context.pending_target.label(), label("B"));
    assert_eq!(context.existing_container.id, "pg-existing");
    assert_eq!(context.instance_id, "nifi-1");
    assert_eq!(orchestrator.state(), OrchestratorState::Suspended);
    assert_eq!(orchestrator.outcomes().len(), 1);
    assert!(orchestrator.outcomes()[0].success);
    assert_eq!(orchestrator.remaining(), 1);
    assert_eq!(client.deploy_calls().len(), 2, "C must not be submitted yet");
    assert!(orchestrator.pending_conflict().is_some());

    let progress = orchestrator
        .resolve_conflict(ConflictAction::DeployAnyway)
        .await
        .unwrap();
    let BatchProgress::Completed(result) = progress else {
        panic!("batch should complete after resolution");
    };
    assert_eq!(result.total(), 3);
    assert_eq!(result.succeeded(), 3);
    let b = result.outcome_for(&label("B")).unwrap();
    assert_eq!(b.resolution, Some(ConflictAction::DeployAnyway));
    assert_eq!(client.deploy_calls().len(), 4);
    assert!(orchestrator.pending_conflict().is_none());
}

#[tokio::test]
async fn validation_failure_is_recorded_and_batch_continues() {
    let client = Arc::new(ScriptedClient::new());
    let mut orchestrator = orchestrator(&client);

    let mut no_instance = DeploymentTarget::new("X", Side::Destination);
    no_instance.template_id = Some(7);
    no_instance.resolved_container_id = Some("pg".to_string());
    let mut no_container = ready_target("Y");
    no_container.resolved_container_id = None;

    let progress = orchestrator
        .run_batch(vec![no_instance, no_container, ready_target("Z")])
        .await
        .unwrap();
    let BatchProgress::Completed(result) = progress else {
        panic!("validation failures never suspend");
    };

    assert_eq!(result.failed(), 2);
    assert_eq!(result.succeeded(), 1);
    let x = result.outcome_for("X/destination").unwrap();
    assert!(!x.success);
    assert_eq!(x.error_kind, None);
    assert!(x.error.as_deref().unwrap().contains("No instance"));
    assert_eq!(client.deploy_calls().len(), 1);
}

#[tokio::test]
async fn remote_and_transport_failures_do_not_suspend() {
    let plain_409 = RemoteError::from_response(409, r#"{"detail": "duplicate"}"#);
    let client = Arc::new(
        ScriptedClient::new()
            .then_deploy(Err(plain_409))
            .then_deploy(Err(RemoteError::transport("connection refused"))),
    );
    let mut orchestrator = orchestrator(&client);

    let progress = orchestrator.run_batch(abc()).await.unwrap();
    let BatchProgress::Completed(result) = progress else {
        panic!("only conflicts with an existing group suspend");
    };

    let a = result.outcome_for(&label("A")).unwrap();
    assert_eq!(a.error_kind, Some(RemoteErrorKind::Remote));
    assert_eq!(a.error.as_deref(), Some("duplicate"));
    let b = result.outcome_for(&label("B")).unwrap();
    assert_eq!(b.error_kind, Some(RemoteErrorKind::Transport));
    assert!(result.outcome_for(&label("C")).unwrap().success);
}

#[tokio::test]
async fn invalid_state_transitions() {
    let client = Arc::new(ScriptedClient::new().then_deploy(Err(conflict(false))));
    let mut orchestrator = orchestrator(&client);

    assert!(matches!(
        orchestrator.resolve_conflict(ConflictAction::DeployAnyway).await,
        Err(ApiError::InvalidState(_))
    ));
    assert!(matches!(orchestrator.cancel(), Err(ApiError::InvalidState(_))));

    orchestrator.run_batch(abc()).await.unwrap();
    assert!(matches!(
        orchestrator.run_batch(abc()).await,
        Err(ApiError::InvalidState(_))
    ));
    assert_eq!(orchestrator.state(), OrchestratorState::Suspended);
}

#[tokio::test]
async fn cancel_abandons_pending_and_remaining() {
    let client = Arc::new(
        ScriptedClient::new()
            .then_succeed()
            .then_deploy(Err(conflict(true))),
    );
    let mut orchestrator = orchestrator(&client);
    orchestrator.run_batch(abc()).await.unwrap();

    let result = orchestrator.cancel().unwrap();
    assert!(result.cancelled);
    assert_eq!(result.outcomes.len(), 1);
    let abandoned: Vec<_> = result.abandoned.iter().map(|t| t.label()).collect();
    assert_eq!(abandoned, vec![label("B"), label("C")]);
    assert_eq!(orchestrator.state(), OrchestratorState::Completed);
    assert_eq!(client.deploy_calls().len(), 2);

    // A finished batch can be followed by a new one
    let progress = orchestrator.run_batch(vec![ready_target("D")]).await.unwrap();
    assert!(matches!(progress, BatchProgress::Completed(r) if r.succeeded() == 1));
}

#[tokio::test]
async fn reset_returns_to_idle() {
    let client = Arc::new(ScriptedClient::new().then_deploy(Err(conflict(false))));
    let mut orchestrator = orchestrator(&client);
    orchestrator.run_batch(abc()).await.unwrap();

    orchestrator.reset();
    assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    assert!(orchestrator.pending_conflict().is_none());
    assert_eq!(orchestrator.remaining(), 0);

    let progress = orchestrator.run_batch(vec![ready_target("E")]).await.unwrap();
    assert!(matches!(progress, BatchProgress::Completed(_)));
}

#[tokio::test]
async fn response_name_is_preferred_over_requested_name() {
    let client = Arc::new(
        ScriptedClient::new().then_deploy(Ok(success("pg-9", Some("A (1)".to_string())))),
    );
    let mut orchestrator = orchestrator(&client);
    let BatchProgress::Completed(result) =
        orchestrator.run_batch(vec![ready_target("A")]).await.unwrap()
    else {
        panic!("batch should complete");
    };
    let a = &result.outcomes[0];
    assert_eq!(a.result_id.as_deref(), Some("pg-9"));
    assert_eq!(a.result_name.as_deref(), Some("A (1)"));
}
