//! Orchestration of the provisioning flows across the registry, store and operation queues.
use provisioner_clients::ClusterProvisioner;
use provisioner_clients::RuntimeRegistry;
use provisioner_clients::ShootStateProvider;
use provisioner_conf::Conf;
use provisioner_conf::RegistrationRetryConf;
use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::AppResult;
use provisioner_models::api::OperationStatus;
use provisioner_models::api::ProvisionRuntimeInput;
use provisioner_models::api::RuntimeStatus;
use provisioner_models::api::UpgradeShootInput;
use provisioner_models::Operation;
use provisioner_store::Store;
use provisioner_tasks::submit::Tasks;
use replisdk::utils::error::slog::ErrorAttributes;

use crate::convert::InputConverter;
use crate::locks::RuntimeLockGuard;
use crate::locks::RuntimeLocks;
use crate::queues::EnqueueOperation;
use crate::queues::OperationQueue;
use crate::telemetry::COMPENSATION_COUNT;
use crate::telemetry::COMPENSATION_ERR;
use crate::telemetry::ENQUEUE_ERR;
use crate::telemetry::FLOW_COUNT;
use crate::telemetry::FLOW_ERR;

mod deprovision;
mod provision;
mod status;
mod upgrade;

#[cfg(test)]
mod tests;

const FLOW_DEPROVISION: &str = "deprovision_runtime";
const FLOW_OPERATION_STATUS: &str = "runtime_operation_status";
const FLOW_PROVISION: &str = "provision_runtime";
const FLOW_RUNTIME_STATUS: &str = "runtime_status";
const FLOW_UPGRADE_SHOOT: &str = "upgrade_gardener_shoot";

/// External systems the provisioning flows coordinate.
#[derive(Clone)]
pub struct Collaborators {
    /// Cloud backend creating, upgrading and deleting clusters.
    pub provisioner: ClusterProvisioner,

    /// Registry owning the logical identity of runtimes.
    pub registry: RuntimeRegistry,

    /// Live state of provisioned shoot clusters.
    pub shoot_state: ShootStateProvider,

    /// Durable store of clusters and operations.
    pub store: Store,

    /// Operation queues drained by the stage executor.
    pub tasks: Tasks,
}

/// Turn provisioning requests into durable operations.
///
/// The service holds no state across calls besides its configuration and the per-runtime
/// locks: every flow re-reads the records it needs from the store.
#[derive(Clone)]
pub struct ProvisioningService {
    clients: Collaborators,
    converter: InputConverter,
    locks: RuntimeLocks,
    registration: RegistrationRetryConf,
    serialise_runtime_operations: bool,
}

impl ProvisioningService {
    pub fn new(conf: &Conf, clients: Collaborators) -> ProvisioningService {
        ProvisioningService {
            clients,
            converter: InputConverter::new(conf.converter.clone()),
            locks: RuntimeLocks::default(),
            registration: conf.registration.clone(),
            serialise_runtime_operations: conf.locking.serialise_runtime_operations,
        }
    }

    /// Register a new runtime and start provisioning its cluster.
    ///
    /// The registered runtime is released again if the provisioning operation
    /// could not be durably recorded.
    pub async fn provision_runtime(
        &self,
        context: &Context,
        input: &ProvisionRuntimeInput,
        tenant: &str,
        sub_account_id: Option<&str>,
    ) -> AppResult<OperationStatus> {
        let context = flow_context(context, FLOW_PROVISION);
        let context = context.derive().tenant(tenant).build();
        let result = self
            .provision(&context, input, tenant, sub_account_id)
            .await;
        flow_result(&context, FLOW_PROVISION, result)
    }

    /// Start deprovisioning of a runtime and return the ID of the new operation.
    pub async fn deprovision_runtime(
        &self,
        context: &Context,
        runtime_id: &str,
    ) -> AppResult<String> {
        let context = flow_context(context, FLOW_DEPROVISION);
        let context = context
            .derive()
            .log_values(slog::o!("runtime_id" => runtime_id.to_string()))
            .build();
        let result = self.deprovision(&context, runtime_id).await;
        flow_result(&context, FLOW_DEPROVISION, result)
    }

    /// Start an upgrade of the shoot cluster backing a runtime.
    pub async fn upgrade_gardener_shoot(
        &self,
        context: &Context,
        runtime_id: &str,
        input: &UpgradeShootInput,
    ) -> AppResult<OperationStatus> {
        let context = flow_context(context, FLOW_UPGRADE_SHOOT);
        let context = context
            .derive()
            .log_values(slog::o!("runtime_id" => runtime_id.to_string()))
            .build();
        let result = self.upgrade_shoot(&context, runtime_id, input).await;
        flow_result(&context, FLOW_UPGRADE_SHOOT, result)
    }

    /// Status of an operation.
    pub async fn runtime_operation_status(
        &self,
        context: &Context,
        operation_id: &str,
    ) -> AppResult<OperationStatus> {
        let context = flow_context(context, FLOW_OPERATION_STATUS);
        let context = context
            .derive()
            .log_values(slog::o!("operation_id" => operation_id.to_string()))
            .build();
        let result = self.operation_status(&context, operation_id).await;
        flow_result(&context, FLOW_OPERATION_STATUS, result)
    }

    /// Status of a runtime: its last operation and its current configuration.
    pub async fn runtime_status(
        &self,
        context: &Context,
        runtime_id: &str,
    ) -> AppResult<RuntimeStatus> {
        let context = flow_context(context, FLOW_RUNTIME_STATUS);
        let context = context
            .derive()
            .log_values(slog::o!("runtime_id" => runtime_id.to_string()))
            .build();
        let result = self.status(&context, runtime_id).await;
        flow_result(&context, FLOW_RUNTIME_STATUS, result)
    }
}

impl ProvisioningService {
    /// Submit an operation onto its queue.
    ///
    /// The operation is already committed when this is called so failures are logged
    /// and counted but not returned.
    async fn enqueue(&self, context: &Context, queue: OperationQueue, operation_id: &str) {
        let request = EnqueueOperation::new(queue, operation_id);
        if let Err(error) = self.clients.tasks.submit(context, request).await {
            ENQUEUE_ERR
                .with_label_values(&[&queue.queue().queue])
                .inc();
            slog::error!(
                context.logger, "Failed to enqueue committed operation, it will not progress";
                "operation_id" => operation_id,
                "queue" => &queue.queue().queue,
                ErrorAttributes::from(&error),
            );
        }
    }

    /// Wait for exclusive access to the runtime, if operations on runtimes are serialised.
    async fn lock_runtime(&self, context: &Context, runtime_id: &str) -> Option<RuntimeLockGuard> {
        if !self.serialise_runtime_operations {
            return None;
        }
        slog::debug!(context.logger, "Waiting for exclusive access to runtime");
        let guard = self.locks.lock(runtime_id).await;
        Some(guard)
    }

    /// Release a registered runtime after a failed provisioning attempt.
    ///
    /// Failures are logged but not returned so they never replace the error that
    /// caused the release.
    async fn release_runtime(&self, context: &Context, runtime_id: &str, tenant: &str) {
        COMPENSATION_COUNT.inc();
        slog::debug!(context.logger, "Releasing registered runtime");
        let result = self
            .clients
            .registry
            .delete_runtime(context, runtime_id, tenant)
            .await;
        if let Err(error) = result {
            COMPENSATION_ERR.inc();
            let error = anyhow::Error::from(error);
            slog::warn!(
                context.logger, "Failed to release registered runtime";
                ErrorAttributes::from(&error),
            );
        }
    }
}

/// Derive the context for a flow and count the request.
fn flow_context(context: &Context, flow: &'static str) -> Context {
    FLOW_COUNT.with_label_values(&[flow]).inc();
    context
        .derive()
        .log_trace()
        .log_values(slog::o!("flow" => flow))
        .build()
}

/// Count and log failed flows.
fn flow_result<T>(context: &Context, flow: &'static str, result: AppResult<T>) -> AppResult<T> {
    if let Err(error) = &result {
        FLOW_ERR.with_label_values(&[flow]).inc();
        slog::info!(
            context.logger, "Provisioning flow failed";
            "code" => ?error.code(),
            "component" => %error.component(),
            "reason" => %error.reason(),
            "error" => %error,
        );
    }
    result
}

/// Reject new operations on runtimes with an operation that did not complete yet.
fn ensure_no_operation_in_progress(last: &Operation, action: &str) -> AppResult<()> {
    if last.state.is_final() {
        return Ok(());
    }
    let message = format!("cannot start {}, previous one is in progress", action);
    Err(AppError::bad_request(message))
}

/// Report a failed collaborator call as an internal error of the given step.
///
/// The component and reason of the cause are preserved.
fn step_error(step: &str, cause: AppError) -> AppError {
    let message = format!("{}: {}", step, cause.message());
    AppError::internal(message).with_origin(cause.component(), cause.reason())
}
