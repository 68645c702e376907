//! Register a new runtime and start provisioning its cluster.
use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::ErrComponent;
use provisioner_errors::ErrReason;
use provisioner_errors::AppResult;
use provisioner_models::api::OperationStatus;
use provisioner_models::api::ProvisionRuntimeInput;
use provisioner_models::Cluster;
use provisioner_models::Operation;
use provisioner_models::OperationStage;
use provisioner_models::OperationType;

use super::step_error;
use super::ProvisioningService;
use crate::convert::operation_status;
use crate::queues::OperationQueue;
use crate::retry::Backoff;

impl ProvisioningService {
    pub(super) async fn provision(
        &self,
        context: &Context,
        input: &ProvisionRuntimeInput,
        tenant: &str,
        sub_account_id: Option<&str>,
    ) -> AppResult<OperationStatus> {
        let mut cluster =
            self.converter
                .provisioning_input_to_cluster(input, tenant, sub_account_id)?;
        let runtime_id = self.register_runtime(context, input, tenant).await?;
        let context = context
            .derive()
            .log_values(slog::o!("runtime_id" => runtime_id.clone()))
            .build();
        cluster.assign_id(runtime_id.as_str());

        // Anything failing from here on must release the registered runtime.
        let operation = match self.start_provisioning(&context, &cluster).await {
            Ok(operation) => operation,
            Err(error) => {
                self.release_runtime(&context, &runtime_id, tenant).await;
                return Err(error);
            }
        };

        self.enqueue(&context, OperationQueue::Provisioning, &operation.id)
            .await;
        slog::info!(
            context.logger, "Runtime provisioning started";
            "operation_id" => &operation.id,
        );
        Ok(operation_status(&operation))
    }

    /// Register the runtime, retrying failed attempts with increasing delays.
    async fn register_runtime(
        &self,
        context: &Context,
        input: &ProvisionRuntimeInput,
        tenant: &str,
    ) -> AppResult<String> {
        let mut backoff = Backoff::new(&self.registration);
        loop {
            let result = self
                .clients
                .registry
                .create_runtime(context, &input.runtime_input, tenant)
                .await;
            match result {
                Ok(runtime_id) => return Ok(runtime_id),
                Err(error) => {
                    if let Err(error) = backoff.retry(context, error).await {
                        let message = format!("Failed to register Runtime: {}", error.message());
                        let error = AppError::internal(message)
                            .with_origin(ErrComponent::Registry, ErrReason::RegistryInternal);
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Record the cluster and its provisioning operation, then ask for the cluster.
    ///
    /// All records are written in one transaction, committed only once the cloud backend
    /// accepted the request. Returning early rolls the transaction back.
    async fn start_provisioning(&self, context: &Context, cluster: &Cluster) -> AppResult<Operation> {
        let mut tx = self
            .clients
            .store
            .transaction(context)
            .await
            .map_err(|error| AppError::from(error).append("Failed to start database transaction"))?;

        tx.persist(context, cluster.clone()).await?;
        tx.persist(context, cluster.cluster_config.clone()).await?;
        if let Some(kyma_config) = &cluster.kyma_config {
            tx.persist(context, kyma_config.clone()).await?;
        }
        let operation = Operation::start(
            cluster.id.as_str(),
            OperationType::Provision,
            OperationStage::WaitingForClusterDomain,
            "Provisioning started",
        );
        tx.persist(context, operation.clone()).await?;
        slog::debug!(
            context.logger, "Provisioning records staged";
            "operation_id" => &operation.id,
        );

        self.clients
            .provisioner
            .provision_cluster(context, cluster, &operation.id)
            .await
            .map_err(|error| step_error("Failed to start provisioning", error))?;

        tx.commit(context).await?;
        Ok(operation)
    }
}
