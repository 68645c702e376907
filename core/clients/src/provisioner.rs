//! Client to the cloud backend provisioning clusters.
use std::sync::Arc;

use provisioner_context::Context;
use provisioner_errors::AppResult;
use provisioner_models::Cluster;
use provisioner_models::GardenerConfig;
use provisioner_models::Operation;
use provisioner_models::OperationStage;
use provisioner_models::OperationType;

/// Start asynchronous cluster work on the cloud backend.
#[derive(Clone)]
pub struct ClusterProvisioner {
    backend: Arc<dyn ProvisionerBackend>,
}

impl ClusterProvisioner {
    /// Begin provisioning of the cluster.
    ///
    /// The operation ID is used by the backend to correlate its work and must not be empty.
    pub async fn provision_cluster(
        &self,
        context: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<()> {
        self.backend
            .provision_cluster(context, cluster, operation_id)
            .await
    }

    /// Begin deprovisioning of the cluster.
    ///
    /// The backend decides the type of the returned operation based on the cluster state.
    pub async fn deprovision_cluster(
        &self,
        context: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<Operation> {
        self.backend
            .deprovision_cluster(context, cluster, operation_id)
            .await
    }

    /// Begin upgrading the cluster to the given configuration.
    pub async fn upgrade_cluster(
        &self,
        context: &Context,
        runtime_id: &str,
        config: &GardenerConfig,
    ) -> AppResult<()> {
        self.backend
            .upgrade_cluster(context, runtime_id, config)
            .await
    }

    /// Build the operation record tracking work about to start on a runtime.
    pub async fn operation_started(
        &self,
        context: &Context,
        runtime_id: &str,
        op_type: OperationType,
        stage: OperationStage,
        message: Option<String>,
    ) -> AppResult<Operation> {
        self.backend
            .operation_started(context, runtime_id, op_type, stage, message)
            .await
    }
}

impl<T> From<T> for ClusterProvisioner
where
    T: ProvisionerBackend + 'static,
{
    fn from(value: T) -> Self {
        ClusterProvisioner {
            backend: Arc::new(value),
        }
    }
}

/// Interface to cloud provisioning backends.
#[async_trait::async_trait]
pub trait ProvisionerBackend: Send + Sync {
    /// Begin provisioning of the cluster.
    async fn provision_cluster(
        &self,
        context: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<()>;

    /// Begin deprovisioning of the cluster and return the operation tracking it.
    async fn deprovision_cluster(
        &self,
        context: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<Operation>;

    /// Begin upgrading the cluster to the given configuration.
    async fn upgrade_cluster(
        &self,
        context: &Context,
        runtime_id: &str,
        config: &GardenerConfig,
    ) -> AppResult<()>;

    /// Build the operation record tracking work about to start on a runtime.
    async fn operation_started(
        &self,
        context: &Context,
        runtime_id: &str,
        op_type: OperationType,
        stage: OperationStage,
        message: Option<String>,
    ) -> AppResult<Operation>;
}
