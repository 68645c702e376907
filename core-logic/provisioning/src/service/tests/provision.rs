use provisioner_clients::fixture::DEFAULT_RUNTIME_ID;
use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::DbError;
use provisioner_errors::ErrComponent;
use provisioner_errors::ErrReason;
use provisioner_errors::ErrorCode;
use provisioner_models::api::KymaConfigInput;
use provisioner_models::api::OperationKind;
use provisioner_models::OperationStage;
use provisioner_models::OperationState;
use provisioner_models::OperationType;
use provisioner_store::FixtureOp;

use super::provision_input;
use super::Fixtures;

#[tokio::test]
async fn provision_runtime() {
    let context = Context::fixture();
    let mut fixtures = Fixtures::new();
    let status = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", Some("sub-account"))
        .await
        .expect("provisioning to start");

    assert!(!status.id.is_empty());
    assert_eq!(status.runtime_id.as_deref(), Some(DEFAULT_RUNTIME_ID));
    assert_eq!(status.operation, OperationKind::Provision);
    assert_eq!(status.state, OperationState::InProgress);

    let cluster = fixtures
        .store
        .cluster(DEFAULT_RUNTIME_ID)
        .expect("cluster to be stored");
    assert_eq!(cluster.tenant, "tenant");
    assert_eq!(cluster.sub_account_id.as_deref(), Some("sub-account"));
    let config = fixtures
        .store
        .gardener_config(DEFAULT_RUNTIME_ID)
        .expect("provider configuration to be stored");
    assert_eq!(config.cluster_id, DEFAULT_RUNTIME_ID);
    assert_eq!(config.kubernetes_version, "1.16");

    let operations = fixtures.store.operations();
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].id, status.id);
    assert_eq!(operations[0].op_type, OperationType::Provision);
    assert_eq!(operations[0].stage, OperationStage::WaitingForClusterDomain);
    assert_eq!(fixtures.store.commits(), 1);

    let calls = fixtures.provisioner.provision_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.id, DEFAULT_RUNTIME_ID);
    assert_eq!(calls[0].1, status.id);

    assert_eq!(
        fixtures.queued(),
        vec![("provisioning".to_string(), status.id.clone())],
    );
    assert!(fixtures.registry.delete_calls().is_empty());
}

#[tokio::test]
async fn provision_runtime_with_installation() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    let mut input = provision_input();
    input.kyma_config = Some(KymaConfigInput {
        version: "1.12".into(),
        ..Default::default()
    });
    fixtures
        .service
        .provision_runtime(&context, &input, "tenant", None)
        .await
        .expect("provisioning to start");

    let kyma_config = fixtures
        .store
        .kyma_config(DEFAULT_RUNTIME_ID)
        .expect("installation configuration to be stored");
    assert_eq!(kyma_config.cluster_id, DEFAULT_RUNTIME_ID);
    assert_eq!(kyma_config.release.version, "1.12");
}

#[tokio::test]
async fn invalid_input_has_no_side_effects() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    let mut input = provision_input();
    input.cluster_config.gardener_config.provider_specific_config = Default::default();
    let error = fixtures
        .service
        .provision_runtime(&context, &input, "tenant", None)
        .await
        .expect_err("invalid input to be rejected");

    assert_eq!(error.code(), ErrorCode::BadRequest);
    assert!(fixtures.registry.create_calls().is_empty());
    assert_eq!(fixtures.store.transactions(), 0);
}

#[tokio::test]
async fn commit_failure_releases_runtime() {
    let context = Context::fixture();
    let mut fixtures = Fixtures::new();
    fixtures.store.fail_on(
        FixtureOp::Commit,
        DbError::internal("Failed to commit transaction: error"),
    );
    let error = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect_err("provisioning to fail");

    assert_eq!(error, AppError::from(DbError::internal("Failed to commit transaction: error")));
    assert_eq!(
        fixtures.registry.delete_calls(),
        vec![(DEFAULT_RUNTIME_ID.to_string(), "tenant".to_string())],
    );
    assert!(fixtures.store.operations().is_empty());
    assert!(fixtures.store.cluster(DEFAULT_RUNTIME_ID).is_none());
    assert!(fixtures.queued().is_empty());
}

#[tokio::test]
async fn transaction_failure_releases_runtime() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    fixtures
        .store
        .fail_on(FixtureOp::OpenTransaction, DbError::internal("db down"));
    let error = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect_err("provisioning to fail");

    assert_eq!(error.message(), "Failed to start database transaction: db down");
    assert_eq!(error.component(), ErrComponent::Db);
    assert_eq!(fixtures.registry.delete_calls().len(), 1);
    assert!(fixtures.provisioner.provision_calls().is_empty());
}

#[tokio::test]
async fn provisioner_failure_releases_runtime() {
    let context = Context::fixture();
    let mut fixtures = Fixtures::new();
    fixtures.provisioner.fail_provision(
        AppError::internal("quota exceeded")
            .with_origin(ErrComponent::CloudBackend, ErrReason::CloudBackendInternal),
    );
    let error = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect_err("provisioning to fail");

    assert!(error.message().contains("Failed to start provisioning"));
    assert_eq!(error.code(), ErrorCode::Internal);
    assert_eq!(error.component(), ErrComponent::CloudBackend);
    assert_eq!(
        fixtures.registry.delete_calls(),
        vec![(DEFAULT_RUNTIME_ID.to_string(), "tenant".to_string())],
    );
    assert_eq!(fixtures.store.rollbacks(), 1);
    assert_eq!(fixtures.store.commits(), 0);
    assert!(fixtures.store.operations().is_empty());
    assert!(fixtures.queued().is_empty());
}

#[tokio::test]
async fn release_failure_keeps_original_error() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    fixtures
        .provisioner
        .fail_provision(AppError::internal("quota exceeded"));
    fixtures
        .registry
        .fail_delete(AppError::internal("registry unavailable"));
    let error = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect_err("provisioning to fail");

    assert_eq!(error.message(), "Failed to start provisioning: quota exceeded");
    assert_eq!(fixtures.registry.delete_calls().len(), 1);
}

#[tokio::test]
async fn registration_is_retried() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    fixtures
        .registry
        .push_create(Err(AppError::internal("conflict")));
    fixtures.registry.push_create(Ok("second-id".into()));
    let status = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect("provisioning to start");

    assert_eq!(status.runtime_id.as_deref(), Some("second-id"));
    assert_eq!(fixtures.registry.create_calls().len(), 2);
    assert!(fixtures.store.cluster("second-id").is_some());
    assert_eq!(fixtures.store.operations().len(), 1);
    assert_eq!(fixtures.store.transactions(), 1);
}

#[tokio::test]
async fn registration_retries_are_bounded() {
    let context = Context::fixture();
    let mut conf = super::conf();
    conf.registration.max_retries = 1;
    let fixtures = Fixtures::with_conf(conf);
    fixtures
        .registry
        .push_create(Err(AppError::internal("conflict")));
    fixtures
        .registry
        .push_create(Err(AppError::internal("still conflicting")));
    let error = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect_err("registration to fail");

    assert_eq!(error.message(), "Failed to register Runtime: still conflicting");
    assert_eq!(error.code(), ErrorCode::Internal);
    assert_eq!(error.component(), ErrComponent::Registry);
    assert_eq!(error.reason(), ErrReason::RegistryInternal);
    assert_eq!(fixtures.registry.create_calls().len(), 2);
    assert!(fixtures.registry.delete_calls().is_empty());
    assert_eq!(fixtures.store.transactions(), 0);
}

#[tokio::test]
async fn enqueue_failure_is_not_an_error() {
    let context = Context::fixture();
    let fixtures = Fixtures::new();
    fixtures.tasks.fail_submissions(true);
    let status = fixtures
        .service
        .provision_runtime(&context, &provision_input(), "tenant", None)
        .await
        .expect("provisioning to start");

    assert_eq!(fixtures.store.operations()[0].id, status.id);
    assert!(fixtures.registry.delete_calls().is_empty());
}
