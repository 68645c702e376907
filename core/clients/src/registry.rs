//! Client to the runtime registry owning the logical identity of runtimes.
use std::sync::Arc;

use provisioner_context::Context;
use provisioner_errors::AppResult;
use provisioner_models::api::RuntimeInput;

/// Assign and revoke runtime identities with the registry.
#[derive(Clone)]
pub struct RuntimeRegistry {
    backend: Arc<dyn RegistryBackend>,
}

impl RuntimeRegistry {
    /// Register a new runtime for the tenant and return the identity assigned to it.
    ///
    /// Registration is not guaranteed to be idempotent.
    pub async fn create_runtime(
        &self,
        context: &Context,
        input: &RuntimeInput,
        tenant: &str,
    ) -> AppResult<String> {
        self.backend.create_runtime(context, input, tenant).await
    }

    /// Release a runtime identity previously assigned to the tenant.
    pub async fn delete_runtime(&self, context: &Context, id: &str, tenant: &str) -> AppResult<()> {
        self.backend.delete_runtime(context, id, tenant).await
    }
}

impl<T> From<T> for RuntimeRegistry
where
    T: RegistryBackend + 'static,
{
    fn from(value: T) -> Self {
        RuntimeRegistry {
            backend: Arc::new(value),
        }
    }
}

/// Interface to runtime registry implementations.
#[async_trait::async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Register a new runtime for the tenant and return the identity assigned to it.
    async fn create_runtime(
        &self,
        context: &Context,
        input: &RuntimeInput,
        tenant: &str,
    ) -> AppResult<String>;

    /// Release a runtime identity previously assigned to the tenant.
    async fn delete_runtime(&self, context: &Context, id: &str, tenant: &str) -> AppResult<()>;
}
