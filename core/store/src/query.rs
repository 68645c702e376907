//! Provisioner persistent store operations to query records.
use provisioner_models::Cluster;
use provisioner_models::Operation;

use self::seal::SealQueryOp;

/// Internal trait to enable query operations on the persistent store.
pub trait QueryOp: Into<QueryOps> + SealQueryOp {
    /// Type returned by the matching query operation.
    type Response: From<QueryResponses>;
}

/// List of all query operations the persistent store must implement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryOps {
    /// Query a cluster, with its configurations and administrators, by runtime ID.
    Cluster(GetCluster),

    /// Query the most recently started operation for a runtime ID.
    LastOperation(GetLastOperation),

    /// Query an operation by ID.
    Operation(GetOperation),
}

/// List of all responses from query operations.
pub enum QueryResponses {
    /// Return a [`Cluster`] matching the query.
    Cluster(Cluster),

    /// Return an [`Operation`] matching the query.
    Operation(Operation),
}

// --- High level query operations --- //
/// Lookup a [`Cluster`] record by runtime ID.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetCluster {
    pub runtime_id: String,
}
impl From<&str> for GetCluster {
    fn from(value: &str) -> Self {
        let runtime_id = value.to_string();
        GetCluster { runtime_id }
    }
}
impl From<String> for GetCluster {
    fn from(runtime_id: String) -> Self {
        GetCluster { runtime_id }
    }
}

/// Lookup the most recently started [`Operation`] of a runtime.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetLastOperation {
    pub runtime_id: String,
}
impl From<&str> for GetLastOperation {
    fn from(value: &str) -> Self {
        let runtime_id = value.to_string();
        GetLastOperation { runtime_id }
    }
}
impl From<String> for GetLastOperation {
    fn from(runtime_id: String) -> Self {
        GetLastOperation { runtime_id }
    }
}

/// Lookup an [`Operation`] record by ID.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GetOperation {
    pub operation_id: String,
}
impl From<&str> for GetOperation {
    fn from(value: &str) -> Self {
        let operation_id = value.to_string();
        GetOperation { operation_id }
    }
}
impl From<String> for GetOperation {
    fn from(operation_id: String) -> Self {
        GetOperation { operation_id }
    }
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`QueryOp`](super::QueryOp) trait.
    pub trait SealQueryOp {}
}

// --- Implement QueryOp and super traits on types for transparent operations --- //
impl SealQueryOp for GetCluster {}
impl QueryOp for GetCluster {
    type Response = Cluster;
}
impl From<GetCluster> for QueryOps {
    fn from(value: GetCluster) -> Self {
        QueryOps::Cluster(value)
    }
}

impl SealQueryOp for GetLastOperation {}
impl QueryOp for GetLastOperation {
    type Response = Operation;
}
impl From<GetLastOperation> for QueryOps {
    fn from(value: GetLastOperation) -> Self {
        QueryOps::LastOperation(value)
    }
}

impl SealQueryOp for GetOperation {}
impl QueryOp for GetOperation {
    type Response = Operation;
}
impl From<GetOperation> for QueryOps {
    fn from(value: GetOperation) -> Self {
        QueryOps::Operation(value)
    }
}

// --- Implement QueryResponses conversions on return types for transparent operations --- //
impl From<QueryResponses> for Cluster {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Cluster(cluster) => cluster,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
impl From<QueryResponses> for Operation {
    fn from(value: QueryResponses) -> Self {
        match value {
            QueryResponses::Operation(operation) => operation,
            _ => panic!("unexpected result type for the given query operation"),
        }
    }
}
