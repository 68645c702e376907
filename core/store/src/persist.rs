//! Provisioner persistent store operations to persist records.
use provisioner_models::Cluster;
use provisioner_models::GardenerConfig;
use provisioner_models::KymaConfig;
use provisioner_models::Operation;

use self::seal::SealPersistOp;

/// Internal trait to enable persist operations on the persistent store.
pub trait PersistOp: Into<PersistOps> + SealPersistOp {
    /// Type returned by the matching persist operation.
    type Response: From<PersistResponses>;
}

/// List of all persist operations the persistent store must implement.
#[derive(Clone, Debug, PartialEq)]
pub enum PersistOps {
    /// Replace the list of administrators of a runtime.
    Administrators(InsertAdministrators),

    /// Insert a new cluster record, along with its administrators.
    ///
    /// Provider and installation configurations are inserted with their own operations.
    Cluster(Cluster),

    /// Insert a new provider configuration record.
    GardenerConfig(GardenerConfig),

    /// Insert a new installation configuration record.
    KymaConfig(KymaConfig),

    /// Insert a new operation record.
    Operation(Operation),

    /// Update the provider configuration of a cluster in place.
    UpdateGardenerConfig(UpdateGardenerConfig),
}

/// List of all responses from persist operations.
pub enum PersistResponses {
    /// The operation completed successfully and does not return data.
    Success,
}

// --- High level persist operations --- //
/// Replace the list of administrators of a runtime.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsertAdministrators {
    pub runtime_id: String,
    pub administrators: Vec<String>,
}

/// Update an existing provider configuration, identified by its cluster ID.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateGardenerConfig(pub GardenerConfig);

// --- Create internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`PersistOp`](super::PersistOp) trait.
    pub trait SealPersistOp {}
}

// --- Implement PersistOp and super traits on types for transparent operations --- //
impl PersistOp for Cluster {
    type Response = ();
}
impl SealPersistOp for Cluster {}
impl From<Cluster> for PersistOps {
    fn from(value: Cluster) -> Self {
        PersistOps::Cluster(value)
    }
}

impl PersistOp for GardenerConfig {
    type Response = ();
}
impl SealPersistOp for GardenerConfig {}
impl From<GardenerConfig> for PersistOps {
    fn from(value: GardenerConfig) -> Self {
        PersistOps::GardenerConfig(value)
    }
}

impl PersistOp for InsertAdministrators {
    type Response = ();
}
impl SealPersistOp for InsertAdministrators {}
impl From<InsertAdministrators> for PersistOps {
    fn from(value: InsertAdministrators) -> Self {
        PersistOps::Administrators(value)
    }
}

impl PersistOp for KymaConfig {
    type Response = ();
}
impl SealPersistOp for KymaConfig {}
impl From<KymaConfig> for PersistOps {
    fn from(value: KymaConfig) -> Self {
        PersistOps::KymaConfig(value)
    }
}

impl PersistOp for Operation {
    type Response = ();
}
impl SealPersistOp for Operation {}
impl From<Operation> for PersistOps {
    fn from(value: Operation) -> Self {
        PersistOps::Operation(value)
    }
}

impl PersistOp for UpdateGardenerConfig {
    type Response = ();
}
impl SealPersistOp for UpdateGardenerConfig {}
impl From<UpdateGardenerConfig> for PersistOps {
    fn from(value: UpdateGardenerConfig) -> Self {
        PersistOps::UpdateGardenerConfig(value)
    }
}

// --- Implement PersistResponses conversions on return types for transparent operations --- //
impl From<PersistResponses> for () {
    fn from(value: PersistResponses) -> Self {
        match value {
            PersistResponses::Success => (),
        }
    }
}
