//! Start deprovisioning of a runtime's cluster.
use uuid::Uuid;

use provisioner_context::Context;
use provisioner_errors::AppResult;
use provisioner_store::query::GetCluster;
use provisioner_store::query::GetLastOperation;

use super::ensure_no_operation_in_progress;
use super::step_error;
use super::ProvisioningService;
use crate::queues::OperationQueue;

impl ProvisioningService {
    pub(super) async fn deprovision(&self, context: &Context, runtime_id: &str) -> AppResult<String> {
        let _lock = self.lock_runtime(context, runtime_id).await;
        let session = self.clients.store.read_write_session();

        let last = session
            .query(context, GetLastOperation::from(runtime_id))
            .await?;
        ensure_no_operation_in_progress(&last, "deprovisioning")?;
        let cluster = session.query(context, GetCluster::from(runtime_id)).await?;

        // The cloud backend picks the kind of deprovisioning operation to record.
        let operation_id = Uuid::new_v4().to_string();
        let operation = self
            .clients
            .provisioner
            .deprovision_cluster(context, &cluster, &operation_id)
            .await
            .map_err(|error| step_error("Failed to start deprovisioning", error))?;
        session.persist(context, operation.clone()).await?;

        self.enqueue(context, OperationQueue::Deprovisioning, &operation.id)
            .await;
        slog::info!(
            context.logger, "Runtime deprovisioning started";
            "operation_id" => &operation.id,
            "operation_type" => %operation.op_type,
        );
        Ok(operation.id)
    }
}
