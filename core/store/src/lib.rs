//! Transactional persistent storage for clusters, their configurations and operations.
//!
//! ## Sessions
//!
//! Access to the [`Store`] happens through sessions, each limiting what callers can do:
//!
//! - [`ReadSession`]s can only query records.
//! - [`ReadWriteSession`]s can query and persist records, with each write applied immediately.
//! - [`Transaction`]s can query and persist records but writes are only visible to others
//!   once [`Transaction::commit`] succeeds.
//!
//! A [`Transaction`] that is dropped without being committed is rolled back.
//! This guarantees no transaction is left open on any exit path of the caller:
//!
//! ```ignore
//! let mut tx = store.transaction(&context).await?;
//! tx.persist(&context, cluster).await?;
//! provisioner.provision_cluster(&context, &cluster, &operation_id).await?; // Rollback on error.
//! tx.commit(&context).await?;
//! ```
//!
//! ## Operations
//!
//! Operations are grouped into a small set of methods that accept different data and
//! return different data. This is implemented with a combination of an internal (sealed)
//! `trait` and enums:
//!
//! ```ignore
//! use provisioner_store::query::GetLastOperation;
//!
//! let session = store.read_session(&context);
//! let operation = session.query(&context, GetLastOperation::from("runtime-id")).await?;
//! ```
//!
//! ### Backend implementations
//!
//! Backend implementations receive a wrapping `enum` type for the operation group to implement.
//! Backends must ensure the returned type matches what the requested operation expects.
//! If they fail to do so the [`Store`] interface will panic while converting types.
//!
//! Lookups of records that do not exist fail with [`DbError::NotFound`].
use std::sync::Arc;

use provisioner_context::Context;
use provisioner_errors::DbError;

pub mod memory;
pub mod persist;
pub mod query;

#[cfg(any(test, feature = "test-fixture"))]
mod fixture;
#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::FixtureOp;
#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::StoreFixture;

#[cfg(test)]
mod tests;

use self::persist::PersistOp;
use self::persist::PersistOps;
use self::persist::PersistResponses;
use self::query::QueryOp;
use self::query::QueryOps;
use self::query::QueryResponses;

/// Result of store operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Query and persist provisioner state with a database.
#[derive(Clone)]
pub struct Store {
    /// Runtime configured implementation of the persistent store.
    inner: Arc<dyn StoreBackend>,
}

impl Store {
    /// Open a session that can only query records.
    pub fn read_session(&self) -> ReadSession {
        ReadSession {
            inner: self.inner.clone(),
        }
    }

    /// Open a session that can query records and persist them without a transaction.
    pub fn read_write_session(&self) -> ReadWriteSession {
        ReadWriteSession {
            inner: self.inner.clone(),
        }
    }

    /// Open a session within a new transaction.
    pub async fn transaction(&self, context: &Context) -> Result<Transaction> {
        let inner = self.inner.transaction(context).await?;
        Ok(Transaction {
            committed: false,
            inner,
            logger: context.logger.clone(),
        })
    }
}

impl<T> From<T> for Store
where
    T: StoreBackend + 'static,
{
    fn from(value: T) -> Self {
        Store {
            inner: Arc::new(value),
        }
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl Store {
    /// Initialise a new store backend fixture for unit tests.
    pub fn fixture() -> Self {
        let inner = StoreFixture::default();
        Self::from(inner)
    }
}

/// Session to query records from the persistent store.
#[derive(Clone)]
pub struct ReadSession {
    inner: Arc<dyn StoreBackend>,
}

impl ReadSession {
    /// Query records from the persistent store.
    pub async fn query<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: QueryOp,
    {
        let op: QueryOps = op.into();
        let response = self.inner.query(context, op).await;
        response.map(O::Response::from)
    }
}

/// Session to query and persist records without a transaction.
#[derive(Clone)]
pub struct ReadWriteSession {
    inner: Arc<dyn StoreBackend>,
}

impl ReadWriteSession {
    /// Query records from the persistent store.
    pub async fn query<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: QueryOp,
    {
        let op: QueryOps = op.into();
        let response = self.inner.query(context, op).await;
        response.map(O::Response::from)
    }

    /// Persist records to the persistent store.
    pub async fn persist<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: PersistOp,
    {
        let op: PersistOps = op.into();
        let response = self.inner.persist(context, op).await;
        response.map(O::Response::from)
    }
}

/// Session to query and persist records within a transaction.
///
/// The transaction is rolled back when dropped unless [`Transaction::commit`] succeeded.
pub struct Transaction {
    committed: bool,
    inner: Box<dyn TransactionBackend>,
    logger: slog::Logger,
}

impl Transaction {
    /// Make all changes persisted within the transaction visible to others.
    ///
    /// The transaction is rolled back if the commit fails.
    pub async fn commit(mut self, context: &Context) -> Result<()> {
        self.inner.commit(context).await?;
        self.committed = true;
        Ok(())
    }

    /// Query records, including changes persisted earlier in the transaction.
    pub async fn query<O>(&mut self, context: &Context, op: O) -> Result<O::Response>
    where
        O: QueryOp,
    {
        let op: QueryOps = op.into();
        let response = self.inner.query(context, op).await;
        response.map(O::Response::from)
    }

    /// Persist records as part of the transaction.
    pub async fn persist<O>(&mut self, context: &Context, op: O) -> Result<O::Response>
    where
        O: PersistOp,
    {
        let op: PersistOps = op.into();
        let response = self.inner.persist(context, op).await;
        response.map(O::Response::from)
    }

    /// Discard all changes persisted within the transaction, if it was not committed.
    pub fn rollback_unless_committed(self) {
        // Rollback happens on drop.
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        slog::debug!(self.logger, "Rolling back uncommitted store transaction");
        self.inner.rollback();
    }
}

/// Operations implemented by persistent stores supported by the provisioner.
#[async_trait::async_trait]
pub trait StoreBackend: Send + Sync {
    /// Query records from the persistent store.
    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses>;

    /// Persist records to the persistent store, outside of any transaction.
    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses>;

    /// Begin a new transaction.
    async fn transaction(&self, context: &Context) -> Result<Box<dyn TransactionBackend>>;
}

/// Operations implemented by persistent store transactions.
#[async_trait::async_trait]
pub trait TransactionBackend: Send + Sync {
    /// Make all changes persisted within the transaction visible to others.
    async fn commit(&mut self, context: &Context) -> Result<()>;

    /// Query records, including changes persisted earlier in the transaction.
    async fn query(&mut self, context: &Context, op: QueryOps) -> Result<QueryResponses>;

    /// Persist records as part of the transaction.
    async fn persist(&mut self, context: &Context, op: PersistOps) -> Result<PersistResponses>;

    /// Discard all changes persisted within the transaction.
    ///
    /// Called at most once, only for transactions that were never successfully committed.
    fn rollback(&mut self);
}
