//! Client to the cloud backend reporting the live state of clusters.
use std::sync::Arc;

use provisioner_context::Context;
use provisioner_errors::AppResult;

/// Live state of a provisioned cluster as reported by the cloud backend.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShootState {
    /// Kubernetes version the cluster is currently running.
    pub kubernetes_version: String,
}

/// Fetch the live state of provisioned clusters.
#[derive(Clone)]
pub struct ShootStateProvider {
    backend: Arc<dyn ShootStateBackend>,
}

impl ShootStateProvider {
    /// Fetch the live state of a runtime's cluster.
    pub async fn get(&self, context: &Context, runtime_id: &str, tenant: &str) -> AppResult<ShootState> {
        self.backend.get(context, runtime_id, tenant).await
    }
}

impl<T> From<T> for ShootStateProvider
where
    T: ShootStateBackend + 'static,
{
    fn from(value: T) -> Self {
        ShootStateProvider {
            backend: Arc::new(value),
        }
    }
}

/// Interface to cluster state reporting backends.
#[async_trait::async_trait]
pub trait ShootStateBackend: Send + Sync {
    /// Fetch the live state of a runtime's cluster.
    async fn get(&self, context: &Context, runtime_id: &str, tenant: &str) -> AppResult<ShootState>;
}
