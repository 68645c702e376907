//! Read only status flows.
use provisioner_context::Context;
use provisioner_errors::AppResult;
use provisioner_models::api::OperationStatus;
use provisioner_models::api::RuntimeStatus;
use provisioner_store::query::GetCluster;
use provisioner_store::query::GetLastOperation;
use provisioner_store::query::GetOperation;

use super::ProvisioningService;
use crate::convert;

impl ProvisioningService {
    pub(super) async fn operation_status(
        &self,
        context: &Context,
        operation_id: &str,
    ) -> AppResult<OperationStatus> {
        let session = self.clients.store.read_session();
        let operation = session
            .query(context, GetOperation::from(operation_id))
            .await?;
        Ok(convert::operation_status(&operation))
    }

    pub(super) async fn status(&self, context: &Context, runtime_id: &str) -> AppResult<RuntimeStatus> {
        let session = self.clients.store.read_session();
        let last = session
            .query(context, GetLastOperation::from(runtime_id))
            .await?;
        let cluster = session
            .query(context, GetCluster::from(last.cluster_id.as_str()))
            .await?;
        Ok(convert::runtime_status(&last, &cluster))
    }
}
