//! Data model for managed Kubernetes clusters and the operations performed on them.
//!
//! - [`Cluster`]: identity and configuration of one managed cluster (a runtime).
//! - [`GardenerConfig`]: cloud provider specific desired state of a cluster.
//! - [`KymaConfig`]: optional installation configuration for a cluster.
//! - [`Operation`]: a tracked unit of asynchronous work against a cluster.
//!
//! The [`api`] module holds the request and status representations exchanged with callers.
pub mod api;

mod cluster;
mod gardener;
mod kyma;
mod operation;

pub use self::cluster::Cluster;
pub use self::cluster::PENDING_RUNTIME_ID;
pub use self::gardener::AwsProviderConfig;
pub use self::gardener::AwsZone;
pub use self::gardener::AzureProviderConfig;
pub use self::gardener::DnsConfig;
pub use self::gardener::DnsProvider;
pub use self::gardener::GardenerConfig;
pub use self::gardener::GcpProviderConfig;
pub use self::gardener::OidcConfig;
pub use self::gardener::OpenStackProviderConfig;
pub use self::gardener::ProviderConfig;
pub use self::gardener::ProviderKind;
pub use self::kyma::ConfigEntry;
pub use self::kyma::KymaComponentConfig;
pub use self::kyma::KymaConfig;
pub use self::kyma::KymaProfile;
pub use self::kyma::Release;
pub use self::operation::LastError;
pub use self::operation::Operation;
pub use self::operation::OperationStage;
pub use self::operation::OperationState;
pub use self::operation::OperationType;
