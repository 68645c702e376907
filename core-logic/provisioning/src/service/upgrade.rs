//! Start an upgrade of the shoot cluster backing a runtime.
use std::cmp::Ordering;

use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::ErrComponent;
use provisioner_errors::ErrReason;
use provisioner_errors::AppResult;
use provisioner_models::api::OperationStatus;
use provisioner_models::api::UpgradeShootInput;
use provisioner_models::OperationStage;
use provisioner_models::OperationType;
use provisioner_store::persist::InsertAdministrators;
use provisioner_store::persist::UpdateGardenerConfig;
use provisioner_store::query::GetCluster;
use provisioner_store::query::GetLastOperation;

use super::ensure_no_operation_in_progress;
use super::step_error;
use super::ProvisioningService;
use crate::convert::operation_status;
use crate::convert::parse_kubernetes_version;
use crate::queues::OperationQueue;

impl ProvisioningService {
    pub(super) async fn upgrade_shoot(
        &self,
        context: &Context,
        runtime_id: &str,
        input: &UpgradeShootInput,
    ) -> AppResult<OperationStatus> {
        let _lock = self.lock_runtime(context, runtime_id).await;
        let session = self.clients.store.read_session();

        let last = session
            .query(context, GetLastOperation::from(runtime_id))
            .await?;
        ensure_no_operation_in_progress(&last, "upgrade")?;
        let cluster = session.query(context, GetCluster::from(runtime_id)).await?;
        let mut config = self
            .converter
            .upgrade_shoot_input_to_gardener_config(&input.gardener_config, &cluster.cluster_config)?;

        // Do not move the version away from what the live cluster already runs.
        let shoot = self
            .clients
            .shoot_state
            .get(context, runtime_id, &cluster.tenant)
            .await
            .map_err(|error| step_error("Failed to get shoot state", error))?;
        let live_version = parse_kubernetes_version(&shoot.kubernetes_version).map_err(|error| {
            let cause =
                error.with_origin(ErrComponent::CloudBackend, ErrReason::CloudBackendInternal);
            step_error("Failed to get shoot state", cause)
        })?;
        let target_version = parse_kubernetes_version(&config.kubernetes_version)?;
        if live_version.cmp(&target_version) != Ordering::Less {
            slog::debug!(
                context.logger, "Shoot already runs the requested Kubernetes version";
                "shoot_version" => &shoot.kubernetes_version,
                "requested_version" => &config.kubernetes_version,
            );
            config.kubernetes_version = shoot.kubernetes_version;
        }

        let mut tx = self
            .clients
            .store
            .transaction(context)
            .await
            .map_err(|error| AppError::from(error).append("Failed to start database transaction"))?;
        tx.persist(context, UpdateGardenerConfig(config.clone()))
            .await?;
        let administrators = input
            .administrators
            .clone()
            .unwrap_or_else(|| cluster.administrators.clone());
        let admins = InsertAdministrators {
            runtime_id: runtime_id.to_string(),
            administrators,
        };
        tx.persist(context, admins).await?;

        let operation = self
            .clients
            .provisioner
            .operation_started(
                context,
                runtime_id,
                OperationType::UpgradeShoot,
                OperationStage::WaitingForShootNewVersion,
                None,
            )
            .await
            .map_err(|error| step_error("Failed to start shoot upgrade operation", error))?;
        tx.persist(context, operation.clone()).await?;

        // The runtime identity is untouched so rolling back the transaction is enough.
        self.clients
            .provisioner
            .upgrade_cluster(context, runtime_id, &config)
            .await
            .map_err(|error| step_error("Failed to upgrade cluster", error))?;
        tx.commit(context).await?;

        self.enqueue(context, OperationQueue::UpgradeShoot, &operation.id)
            .await;
        slog::info!(
            context.logger, "Shoot upgrade started";
            "operation_id" => &operation.id,
            "kubernetes_version" => &config.kubernetes_version,
        );
        Ok(operation_status(&operation))
    }
}
