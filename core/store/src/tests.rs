//! Unit tests for the Store interface, sessions and transactions.
use provisioner_context::Context;
use provisioner_errors::DbError;
use provisioner_models::Cluster;
use provisioner_models::Operation;
use provisioner_models::OperationStage;
use provisioner_models::OperationType;

use crate::persist::InsertAdministrators;
use crate::persist::UpdateGardenerConfig;
use crate::query::GetCluster;
use crate::query::GetLastOperation;
use crate::query::GetOperation;
use crate::FixtureOp;
use crate::Store;
use crate::StoreFixture;

fn registered_cluster(id: &str) -> Cluster {
    let mut cluster = Cluster::fixture();
    cluster.assign_id(id);
    cluster
}

#[tokio::test]
async fn read_write_session_persists_immediately() {
    let context = Context::fixture();
    let store = Store::fixture();
    let session = store.read_write_session();
    let operation = Operation::start(
        "runtime",
        OperationType::Deprovision,
        OperationStage::DeprovisionCluster,
        "Deprovisioning started",
    );
    session
        .persist(&context, operation.clone())
        .await
        .expect("operation persist to be ok");

    let found = store
        .read_session()
        .query(&context, GetOperation::from(operation.id.as_str()))
        .await
        .expect("operation query to be ok");
    assert_eq!(found, operation);
}

#[tokio::test]
async fn get_cluster_not_found() {
    let context = Context::fixture();
    let store = Store::fixture();
    let error = store
        .read_session()
        .query(&context, GetCluster::from("missing"))
        .await
        .expect_err("cluster query to fail");
    assert!(matches!(error, DbError::NotFound(_)));
}

#[tokio::test]
async fn get_last_operation_picks_latest() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    let mut first = Operation::start(
        "runtime",
        OperationType::Provision,
        OperationStage::WaitingForClusterDomain,
        "",
    );
    first.start_timestamp -= time::Duration::minutes(5);
    let second = Operation::start(
        "runtime",
        OperationType::UpgradeShoot,
        OperationStage::WaitingForShootNewVersion,
        "",
    );
    let other = Operation::start(
        "other",
        OperationType::Provision,
        OperationStage::WaitingForClusterDomain,
        "",
    );
    fixture.seed_operation(second.clone());
    fixture.seed_operation(first);
    fixture.seed_operation(other);

    let store = Store::from(fixture);
    let last = store
        .read_session()
        .query(&context, GetLastOperation::from("runtime"))
        .await
        .expect("last operation query to be ok");
    assert_eq!(last, second);
}

#[tokio::test]
async fn transaction_commit_publishes_writes() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    let store = Store::from(fixture.clone());
    let cluster = registered_cluster("runtime");

    let mut tx = store.transaction(&context).await.expect("transaction to open");
    tx.persist(&context, cluster.clone()).await.expect("cluster insert");
    tx.persist(&context, cluster.cluster_config.clone())
        .await
        .expect("gardener config insert");
    assert!(fixture.cluster("runtime").is_none());

    let staged = tx
        .query(&context, GetCluster::from("runtime"))
        .await
        .expect("transaction to read its own writes");
    assert_eq!(staged.id, "runtime");

    tx.commit(&context).await.expect("commit to succeed");
    assert!(fixture.cluster("runtime").is_some());
    assert_eq!(fixture.commits(), 1);
    assert_eq!(fixture.rollbacks(), 0);
}

#[tokio::test]
async fn transaction_dropped_rolls_back() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    let store = Store::from(fixture.clone());
    {
        let mut tx = store.transaction(&context).await.expect("transaction to open");
        tx.persist(&context, registered_cluster("runtime"))
            .await
            .expect("cluster insert");
    }
    assert!(fixture.cluster("runtime").is_none());
    assert_eq!(fixture.rollbacks(), 1);
    assert_eq!(fixture.commits(), 0);
}

#[tokio::test]
async fn transaction_failed_commit_rolls_back() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    fixture.fail_on(
        FixtureOp::Commit,
        DbError::internal("Failed to commit transaction: error"),
    );
    let store = Store::from(fixture.clone());

    let mut tx = store.transaction(&context).await.expect("transaction to open");
    tx.persist(&context, registered_cluster("runtime"))
        .await
        .expect("cluster insert");
    let error = tx.commit(&context).await.expect_err("commit to fail");

    assert_eq!(
        error,
        DbError::internal("Failed to commit transaction: error")
    );
    assert!(fixture.cluster("runtime").is_none());
    assert_eq!(fixture.rollbacks(), 1);
}

#[tokio::test]
async fn transaction_explicit_rollback() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    let store = Store::from(fixture.clone());
    let tx = store.transaction(&context).await.expect("transaction to open");
    tx.rollback_unless_committed();
    assert_eq!(fixture.transactions(), 1);
    assert_eq!(fixture.rollbacks(), 1);
}

#[tokio::test]
async fn update_gardener_config_in_place() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    fixture.seed_cluster(registered_cluster("runtime"));
    let store = Store::from(fixture.clone());

    let mut config = fixture.gardener_config("runtime").expect("seeded config");
    config.kubernetes_version = "1.20".into();
    let mut tx = store.transaction(&context).await.expect("transaction to open");
    tx.persist(&context, UpdateGardenerConfig(config))
        .await
        .expect("config update");
    tx.persist(
        &context,
        InsertAdministrators {
            runtime_id: "runtime".into(),
            administrators: vec!["new@example.com".into()],
        },
    )
    .await
    .expect("administrators insert");
    tx.commit(&context).await.expect("commit to succeed");

    let cluster = store
        .read_session()
        .query(&context, GetCluster::from("runtime"))
        .await
        .expect("cluster query to be ok");
    assert_eq!(cluster.cluster_config.kubernetes_version, "1.20");
    assert_eq!(cluster.administrators, vec!["new@example.com".to_string()]);
}

#[tokio::test]
async fn update_missing_gardener_config_fails() {
    let context = Context::fixture();
    let store = Store::fixture();
    let config = registered_cluster("runtime").cluster_config;
    let error = store
        .read_write_session()
        .persist(&context, UpdateGardenerConfig(config))
        .await
        .expect_err("config update to fail");
    assert!(matches!(error, DbError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_operation_rejected() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    let operation = Operation::start(
        "runtime",
        OperationType::Provision,
        OperationStage::WaitingForClusterDomain,
        "",
    );
    fixture.seed_operation(operation.clone());
    let store = Store::from(fixture);
    let error = store
        .read_write_session()
        .persist(&context, operation)
        .await
        .expect_err("duplicate insert to fail");
    assert!(matches!(error, DbError::AlreadyExists(_)));
}

#[tokio::test]
async fn fixture_injects_query_failures() {
    let context = Context::fixture();
    let fixture = StoreFixture::default();
    fixture.seed_cluster(registered_cluster("runtime"));
    fixture.fail_on(FixtureOp::GetCluster, DbError::internal("error"));
    let store = Store::from(fixture);
    let error = store
        .read_session()
        .query(&context, GetCluster::from("runtime"))
        .await
        .expect_err("cluster query to fail");
    assert_eq!(error, DbError::internal("error"));
}
