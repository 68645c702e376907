//! Clients to the external systems coordinated by the provisioning flows.
//!
//! - [`RuntimeRegistry`]: assigns and revokes the logical identity of runtimes.
//! - [`ClusterProvisioner`]: starts provisioning, deprovisioning and upgrades on the cloud backend.
//! - [`ShootStateProvider`]: reports the live state of provisioned clusters.
//!
//! Each client wraps a backend trait object so concrete transports can be selected at runtime.
//! Errors from all clients are [`AppError`](provisioner_errors::AppError)s attributed to
//! the component that failed.
mod provisioner;
mod registry;
mod shoot;

#[cfg(any(test, feature = "test-fixture"))]
pub mod fixture;

pub use self::provisioner::ClusterProvisioner;
pub use self::provisioner::ProvisionerBackend;
pub use self::registry::RegistryBackend;
pub use self::registry::RuntimeRegistry;
pub use self::shoot::ShootState;
pub use self::shoot::ShootStateBackend;
pub use self::shoot::ShootStateProvider;
