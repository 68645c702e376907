//! In-memory implementation of the [`Store`](super::Store).
//!
//! Records live in process memory only and are lost on restart.
//! Useful for single process deployments, demos and as the base for test fixtures.
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

use super::PersistOps;
use super::PersistResponses;
use super::QueryOps;
use super::QueryResponses;
use super::Result;
use super::StoreBackend;
use super::TransactionBackend;

/// In-memory [`StoreBackend`] with support for transactions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Lock and access the shared state.
    pub(crate) fn access(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .expect("MemoryStore::state lock poisoned")
    }
}

#[async_trait::async_trait]
impl StoreBackend for MemoryStore {
    async fn query(&self, _: &Context, op: QueryOps) -> Result<QueryResponses> {
        self.access().query(op)
    }

    async fn persist(&self, _: &Context, op: PersistOps) -> Result<PersistResponses> {
        self.access().apply(op)
    }

    async fn transaction(&self, _: &Context) -> Result<Box<dyn TransactionBackend>> {
        let view = self.access().clone();
        let transaction = MemoryTransaction {
            shared: self.state.clone(),
            staged: Vec::new(),
            view,
        };
        Ok(Box::new(transaction))
    }
}

/// Transaction staging changes until commit.
///
/// Staged changes are validated against a snapshot of the store when persisted
/// and re-applied to the latest store state on commit.
struct MemoryTransaction {
    shared: Arc<Mutex<MemoryState>>,
    staged: Vec<PersistOps>,
    view: MemoryState,
}

#[async_trait::async_trait]
impl TransactionBackend for MemoryTransaction {
    async fn commit(&mut self, _: &Context) -> Result<()> {
        let mut shared = self
            .shared
            .lock()
            .expect("MemoryStore::state lock poisoned");
        let mut next = shared.clone();
        for op in self.staged.drain(..) {
            next.apply(op).map_err(|error| {
                DbError::internal(format!("Failed to commit transaction: {}", error))
            })?;
        }
        *shared = next;
        Ok(())
    }

    async fn query(&mut self, _: &Context, op: QueryOps) -> Result<QueryResponses> {
        self.view.query(op)
    }

    async fn persist(&mut self, _: &Context, op: PersistOps) -> Result<PersistResponses> {
        let response = self.view.apply(op.clone())?;
        self.staged.push(op);
        Ok(response)
    }

    fn rollback(&mut self) {
        self.staged.clear();
    }
}

/// Container for the records stored in memory.
#[derive(Clone, Default)]
pub(crate) struct MemoryState {
    /// Runtime administrators by runtime ID.
    pub(crate) administrators: HashMap<String, Vec<String>>,

    /// Cluster records by runtime ID.
    pub(crate) clusters: HashMap<String, Cluster>,

    /// Provider configurations by runtime ID.
    pub(crate) gardener_configs: HashMap<String, GardenerConfig>,

    /// Installation configurations by runtime ID.
    pub(crate) kyma_configs: HashMap<String, KymaConfig>,

    /// Operations in the order they were inserted.
    pub(crate) operations: Vec<Operation>,
}

impl MemoryState {
    /// Apply a persist operation to the state.
    pub(crate) fn apply(&mut self, op: PersistOps) -> Result<PersistResponses> {
        match op {
            PersistOps::Administrators(admins) => {
                if !self.clusters.contains_key(&admins.runtime_id) {
                    let message = format!("cluster with runtime ID {} not found", admins.runtime_id);
                    return Err(DbError::not_found(message));
                }
                self.administrators
                    .insert(admins.runtime_id, admins.administrators);
            }
            PersistOps::Cluster(cluster) => {
                if self.clusters.contains_key(&cluster.id) {
                    let message = format!("cluster with runtime ID {} already exists", cluster.id);
                    return Err(DbError::already_exists(message));
                }
                self.administrators
                    .insert(cluster.id.clone(), cluster.administrators.clone());
                self.clusters.insert(cluster.id.clone(), cluster);
            }
            PersistOps::GardenerConfig(config) => {
                if self.gardener_configs.contains_key(&config.cluster_id) {
                    let message = format!(
                        "provider configuration for runtime ID {} already exists",
                        config.cluster_id,
                    );
                    return Err(DbError::already_exists(message));
                }
                self.gardener_configs
                    .insert(config.cluster_id.clone(), config);
            }
            PersistOps::KymaConfig(config) => {
                self.kyma_configs.insert(config.cluster_id.clone(), config);
            }
            PersistOps::Operation(operation) => {
                if self.operations.iter().any(|known| known.id == operation.id) {
                    let message = format!("operation {} already exists", operation.id);
                    return Err(DbError::already_exists(message));
                }
                self.operations.push(operation);
            }
            PersistOps::UpdateGardenerConfig(update) => {
                let config = update.0;
                match self.gardener_configs.get_mut(&config.cluster_id) {
                    None => {
                        let message = format!(
                            "provider configuration for runtime ID {} not found",
                            config.cluster_id,
                        );
                        return Err(DbError::not_found(message));
                    }
                    Some(current) => *current = config,
                }
            }
        };
        Ok(PersistResponses::Success)
    }

    /// Execute a query operation against the state.
    pub(crate) fn query(&self, op: QueryOps) -> Result<QueryResponses> {
        match op {
            QueryOps::Cluster(lookup) => {
                let mut cluster = match self.clusters.get(&lookup.runtime_id) {
                    Some(cluster) => cluster.clone(),
                    None => {
                        let message =
                            format!("cluster with runtime ID {} not found", lookup.runtime_id);
                        return Err(DbError::not_found(message));
                    }
                };
                if let Some(config) = self.gardener_configs.get(&cluster.id) {
                    cluster.cluster_config = config.clone();
                }
                if let Some(config) = self.kyma_configs.get(&cluster.id) {
                    cluster.kyma_config = Some(config.clone());
                }
                if let Some(admins) = self.administrators.get(&cluster.id) {
                    cluster.administrators = admins.clone();
                }
                Ok(QueryResponses::Cluster(cluster))
            }
            QueryOps::LastOperation(lookup) => {
                let operation = self
                    .operations
                    .iter()
                    .filter(|operation| operation.cluster_id == lookup.runtime_id)
                    .max_by_key(|operation| operation.start_timestamp);
                match operation {
                    Some(operation) => Ok(QueryResponses::Operation(operation.clone())),
                    None => {
                        let message =
                            format!("no operations found for runtime ID {}", lookup.runtime_id);
                        Err(DbError::not_found(message))
                    }
                }
            }
            QueryOps::Operation(lookup) => {
                let operation = self
                    .operations
                    .iter()
                    .find(|operation| operation.id == lookup.operation_id);
                match operation {
                    Some(operation) => Ok(QueryResponses::Operation(operation.clone())),
                    None => {
                        let message = format!("operation {} not found", lookup.operation_id);
                        Err(DbError::not_found(message))
                    }
                }
            }
        }
    }
}
