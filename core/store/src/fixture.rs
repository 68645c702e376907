//! In-memory implementation of [`Store`](super::Store) for unit tests.
//!
//! The fixture can be instructed to fail specific operations and records what
//! happens to transactions so tests can assert on the store interactions.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use provisioner_context::Context;
use provisioner_errors::DbError;
use provisioner_models::Cluster;
use provisioner_models::GardenerConfig;
use provisioner_models::KymaConfig;
use provisioner_models::Operation;

use super::memory::MemoryStore;
use super::PersistOps;
use super::PersistResponses;
use super::QueryOps;
use super::QueryResponses;
use super::Result;
use super::StoreBackend;
use super::TransactionBackend;

/// Store operations the fixture can be instructed to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FixtureOp {
    Commit,
    GetCluster,
    GetLastOperation,
    GetOperation,
    InsertAdministrators,
    InsertCluster,
    InsertGardenerConfig,
    InsertKymaConfig,
    InsertOperation,
    OpenTransaction,
    UpdateGardenerConfig,
}

impl From<&QueryOps> for FixtureOp {
    fn from(value: &QueryOps) -> Self {
        match value {
            QueryOps::Cluster(_) => FixtureOp::GetCluster,
            QueryOps::LastOperation(_) => FixtureOp::GetLastOperation,
            QueryOps::Operation(_) => FixtureOp::GetOperation,
        }
    }
}

impl From<&PersistOps> for FixtureOp {
    fn from(value: &PersistOps) -> Self {
        match value {
            PersistOps::Administrators(_) => FixtureOp::InsertAdministrators,
            PersistOps::Cluster(_) => FixtureOp::InsertCluster,
            PersistOps::GardenerConfig(_) => FixtureOp::InsertGardenerConfig,
            PersistOps::KymaConfig(_) => FixtureOp::InsertKymaConfig,
            PersistOps::Operation(_) => FixtureOp::InsertOperation,
            PersistOps::UpdateGardenerConfig(_) => FixtureOp::UpdateGardenerConfig,
        }
    }
}

/// In-memory implementation of a mock [`Store`](super::Store) for unit tests.
#[derive(Clone, Default)]
pub struct StoreFixture {
    /// Shared in-memory records to mock the DB with.
    memory: MemoryStore,

    /// Shared failure injection and interaction tracking state.
    inner: Arc<Mutex<StoreFixtureState>>,
}

impl StoreFixture {
    /// Lock and access the shared inner state.
    fn access(&self) -> MutexGuard<'_, StoreFixtureState> {
        self.inner
            .lock()
            .expect("StoreFixture::inner state lock poisoned")
    }

    /// Fail all future requests for the given operation with the given error.
    pub fn fail_on(&self, op: FixtureOp, error: DbError) {
        self.access().failures.insert(op, error);
    }

    /// Insert a cluster and its configurations directly into the store.
    pub fn seed_cluster(&self, cluster: Cluster) {
        let mut memory = self.memory.access();
        memory
            .administrators
            .insert(cluster.id.clone(), cluster.administrators.clone());
        memory
            .gardener_configs
            .insert(cluster.id.clone(), cluster.cluster_config.clone());
        if let Some(kyma_config) = cluster.kyma_config.clone() {
            memory.kyma_configs.insert(cluster.id.clone(), kyma_config);
        }
        memory.clusters.insert(cluster.id.clone(), cluster);
    }

    /// Insert an operation directly into the store.
    pub fn seed_operation(&self, operation: Operation) {
        self.memory.access().operations.push(operation);
    }

    /// Administrators currently stored for a runtime.
    pub fn administrators(&self, runtime_id: &str) -> Option<Vec<String>> {
        self.memory.access().administrators.get(runtime_id).cloned()
    }

    /// Cluster record currently stored for a runtime, without configurations.
    pub fn cluster(&self, runtime_id: &str) -> Option<Cluster> {
        self.memory.access().clusters.get(runtime_id).cloned()
    }

    /// Provider configuration currently stored for a runtime.
    pub fn gardener_config(&self, runtime_id: &str) -> Option<GardenerConfig> {
        self.memory.access().gardener_configs.get(runtime_id).cloned()
    }

    /// Installation configuration currently stored for a runtime.
    pub fn kyma_config(&self, runtime_id: &str) -> Option<KymaConfig> {
        self.memory.access().kyma_configs.get(runtime_id).cloned()
    }

    /// All operations currently stored, in insertion order.
    pub fn operations(&self) -> Vec<Operation> {
        self.memory.access().operations.clone()
    }

    /// Number of transactions successfully committed.
    pub fn commits(&self) -> usize {
        self.access().commits
    }

    /// Number of transactions rolled back.
    pub fn rollbacks(&self) -> usize {
        self.access().rollbacks
    }

    /// Number of transactions opened.
    pub fn transactions(&self) -> usize {
        self.access().transactions
    }

    /// Number of persist requests received, within or outside transactions.
    pub fn writes(&self) -> usize {
        self.access().writes
    }

    /// Check if the operation should fail and return the error to fail with.
    fn check(&self, op: FixtureOp) -> Result<()> {
        match self.access().failures.get(&op) {
            None => Ok(()),
            Some(error) => Err(error.clone()),
        }
    }
}

#[async_trait::async_trait]
impl StoreBackend for StoreFixture {
    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses> {
        self.check(FixtureOp::from(&op))?;
        self.memory.query(context, op).await
    }

    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses> {
        self.access().writes += 1;
        self.check(FixtureOp::from(&op))?;
        self.memory.persist(context, op).await
    }

    async fn transaction(&self, context: &Context) -> Result<Box<dyn TransactionBackend>> {
        self.check(FixtureOp::OpenTransaction)?;
        let inner = self.memory.transaction(context).await?;
        self.access().transactions += 1;
        let transaction = FixtureTransaction {
            fixture: self.clone(),
            inner,
        };
        Ok(Box::new(transaction))
    }
}

/// Transaction wrapper injecting failures and tracking outcomes.
struct FixtureTransaction {
    fixture: StoreFixture,
    inner: Box<dyn TransactionBackend>,
}

#[async_trait::async_trait]
impl TransactionBackend for FixtureTransaction {
    async fn commit(&mut self, context: &Context) -> Result<()> {
        self.fixture.check(FixtureOp::Commit)?;
        self.inner.commit(context).await?;
        self.fixture.access().commits += 1;
        Ok(())
    }

    async fn query(&mut self, context: &Context, op: QueryOps) -> Result<QueryResponses> {
        self.fixture.check(FixtureOp::from(&op))?;
        self.inner.query(context, op).await
    }

    async fn persist(&mut self, context: &Context, op: PersistOps) -> Result<PersistResponses> {
        self.fixture.access().writes += 1;
        self.fixture.check(FixtureOp::from(&op))?;
        self.inner.persist(context, op).await
    }

    fn rollback(&mut self) {
        self.inner.rollback();
        self.fixture.access().rollbacks += 1;
    }
}

/// Container for the shared fixture state.
#[derive(Default)]
struct StoreFixtureState {
    commits: usize,
    failures: HashMap<FixtureOp, DbError>,
    rollbacks: usize,
    transactions: usize,
    writes: usize,
}
