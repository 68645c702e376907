//! Orchestration of runtime provisioning, deprovisioning and upgrades.
//!
//! The [`ProvisioningService`] turns a single high level request into a durable operation
//! while keeping three systems of record consistent:
//!
//! - The runtime registry, owning the logical identity of runtimes.
//! - The operation store, the local source of truth for clusters and operations.
//! - The operation queues, driving the out of process stage executor.
//!
//! There is no distributed transaction across these systems.
//! Instead flows order their calls so the most reversible action happens first,
//! wrap store changes and cloud backend calls into one store transaction,
//! and release registered runtimes when a later step fails.
//!
//! Once an operation is committed, queueing it is best effort: failures are logged
//! and counted but do not fail the request.
pub mod convert;
pub mod locks;
pub mod queues;
pub mod retry;

mod service;
mod telemetry;

pub use self::service::Collaborators;
pub use self::service::ProvisioningService;
pub use self::telemetry::register_metrics;
