//! Scripted client implementations for unit tests.
//!
//! Fixtures are cheap to clone and share their state so tests can keep a handle
//! to inspect recorded calls after handing a clone to the code under test.
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use provisioner_context::Context;
use provisioner_errors::AppError;
use provisioner_errors::AppResult;
use provisioner_models::api::RuntimeInput;
use provisioner_models::Cluster;
use provisioner_models::GardenerConfig;
use provisioner_models::Operation;
use provisioner_models::OperationStage;
use provisioner_models::OperationType;

use crate::ProvisionerBackend;
use crate::RegistryBackend;
use crate::ShootState;
use crate::ShootStateBackend;

/// Runtime ID assigned by the [`RegistryFixture`] when no response is scripted.
pub const DEFAULT_RUNTIME_ID: &str = "184ccdf2-59e4-44b7-b553-6cb296af5ea0";

// --- Runtime registry --- //
/// Runtime registry replying with scripted responses and recording calls.
#[derive(Clone, Default)]
pub struct RegistryFixture {
    state: Arc<Mutex<RegistryFixtureState>>,
}

#[derive(Default)]
struct RegistryFixtureState {
    create_calls: Vec<(RuntimeInput, String)>,
    create_responses: VecDeque<AppResult<String>>,
    delete_calls: Vec<(String, String)>,
    delete_error: Option<AppError>,
}

impl RegistryFixture {
    fn access(&self) -> MutexGuard<'_, RegistryFixtureState> {
        self.state
            .lock()
            .expect("RegistryFixture::state lock poisoned")
    }

    /// Calls received to register runtimes, as `(input, tenant)` pairs.
    pub fn create_calls(&self) -> Vec<(RuntimeInput, String)> {
        self.access().create_calls.clone()
    }

    /// Calls received to release runtimes, as `(id, tenant)` pairs.
    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.access().delete_calls.clone()
    }

    /// Fail all future runtime release requests.
    pub fn fail_delete(&self, error: AppError) {
        self.access().delete_error = Some(error);
    }

    /// Script the response to the next unscripted registration request.
    pub fn push_create(&self, response: AppResult<String>) {
        self.access().create_responses.push_back(response);
    }
}

#[async_trait::async_trait]
impl RegistryBackend for RegistryFixture {
    async fn create_runtime(
        &self,
        _: &Context,
        input: &RuntimeInput,
        tenant: &str,
    ) -> AppResult<String> {
        let mut state = self.access();
        state.create_calls.push((input.clone(), tenant.to_string()));
        state
            .create_responses
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_RUNTIME_ID.to_string()))
    }

    async fn delete_runtime(&self, _: &Context, id: &str, tenant: &str) -> AppResult<()> {
        let mut state = self.access();
        state
            .delete_calls
            .push((id.to_string(), tenant.to_string()));
        match &state.delete_error {
            None => Ok(()),
            Some(error) => Err(error.clone()),
        }
    }
}

// --- Cluster provisioner --- //
/// Cluster provisioner accepting all requests unless instructed otherwise.
///
/// Deprovisioning returns an operation of type [`OperationType::Deprovision`] for clusters
/// with an active installation and [`OperationType::DeprovisionNoInstall`] otherwise.
#[derive(Clone, Default)]
pub struct ProvisionerFixture {
    state: Arc<Mutex<ProvisionerFixtureState>>,
}

#[derive(Default)]
struct ProvisionerFixtureState {
    deprovision_calls: Vec<(String, String)>,
    deprovision_error: Option<AppError>,
    operation_started_calls: Vec<(String, OperationType, OperationStage)>,
    operation_started_error: Option<AppError>,
    provision_calls: Vec<(Cluster, String)>,
    provision_error: Option<AppError>,
    upgrade_calls: Vec<(String, GardenerConfig)>,
    upgrade_error: Option<AppError>,
}

impl ProvisionerFixture {
    fn access(&self) -> MutexGuard<'_, ProvisionerFixtureState> {
        self.state
            .lock()
            .expect("ProvisionerFixture::state lock poisoned")
    }

    /// Calls received to deprovision clusters, as `(runtime_id, operation_id)` pairs.
    pub fn deprovision_calls(&self) -> Vec<(String, String)> {
        self.access().deprovision_calls.clone()
    }

    /// Fail all future deprovision requests.
    pub fn fail_deprovision(&self, error: AppError) {
        self.access().deprovision_error = Some(error);
    }

    /// Fail all future requests to build started operations.
    pub fn fail_operation_started(&self, error: AppError) {
        self.access().operation_started_error = Some(error);
    }

    /// Fail all future provision requests.
    pub fn fail_provision(&self, error: AppError) {
        self.access().provision_error = Some(error);
    }

    /// Fail all future upgrade requests.
    pub fn fail_upgrade(&self, error: AppError) {
        self.access().upgrade_error = Some(error);
    }

    /// Requests received to build started operations.
    pub fn operation_started_calls(&self) -> Vec<(String, OperationType, OperationStage)> {
        self.access().operation_started_calls.clone()
    }

    /// Calls received to provision clusters, as `(cluster, operation_id)` pairs.
    pub fn provision_calls(&self) -> Vec<(Cluster, String)> {
        self.access().provision_calls.clone()
    }

    /// Calls received to upgrade clusters, as `(runtime_id, config)` pairs.
    pub fn upgrade_calls(&self) -> Vec<(String, GardenerConfig)> {
        self.access().upgrade_calls.clone()
    }
}

#[async_trait::async_trait]
impl ProvisionerBackend for ProvisionerFixture {
    async fn provision_cluster(
        &self,
        _: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<()> {
        let mut state = self.access();
        state
            .provision_calls
            .push((cluster.clone(), operation_id.to_string()));
        match &state.provision_error {
            None => Ok(()),
            Some(error) => Err(error.clone()),
        }
    }

    async fn deprovision_cluster(
        &self,
        _: &Context,
        cluster: &Cluster,
        operation_id: &str,
    ) -> AppResult<Operation> {
        // Let concurrent callers interleave as they would around a remote call.
        tokio::task::yield_now().await;
        let mut state = self.access();
        state
            .deprovision_calls
            .push((cluster.id.clone(), operation_id.to_string()));
        if let Some(error) = &state.deprovision_error {
            return Err(error.clone());
        }
        let op_type = match cluster.active_kyma_config_id {
            Some(_) => OperationType::Deprovision,
            None => OperationType::DeprovisionNoInstall,
        };
        let operation = Operation::start_with_id(
            operation_id,
            &cluster.id,
            op_type,
            OperationStage::DeprovisionCluster,
            "Deprovisioning started",
        );
        Ok(operation)
    }

    async fn upgrade_cluster(
        &self,
        _: &Context,
        runtime_id: &str,
        config: &GardenerConfig,
    ) -> AppResult<()> {
        let mut state = self.access();
        state
            .upgrade_calls
            .push((runtime_id.to_string(), config.clone()));
        match &state.upgrade_error {
            None => Ok(()),
            Some(error) => Err(error.clone()),
        }
    }

    async fn operation_started(
        &self,
        _: &Context,
        runtime_id: &str,
        op_type: OperationType,
        stage: OperationStage,
        message: Option<String>,
    ) -> AppResult<Operation> {
        let mut state = self.access();
        state
            .operation_started_calls
            .push((runtime_id.to_string(), op_type, stage));
        if let Some(error) = &state.operation_started_error {
            return Err(error.clone());
        }
        let message = message.unwrap_or_else(|| "Operation started".to_string());
        Ok(Operation::start(runtime_id, op_type, stage, message))
    }
}

// --- Shoot state --- //
/// Shoot state provider reporting a configurable live state.
#[derive(Clone)]
pub struct ShootStateFixture {
    state: Arc<Mutex<ShootStateFixtureState>>,
}

struct ShootStateFixtureState {
    calls: Vec<(String, String)>,
    response: AppResult<ShootState>,
}

impl ShootStateFixture {
    fn access(&self) -> MutexGuard<'_, ShootStateFixtureState> {
        self.state
            .lock()
            .expect("ShootStateFixture::state lock poisoned")
    }

    /// Report clusters running the given Kubernetes version.
    pub fn new<S: Into<String>>(kubernetes_version: S) -> ShootStateFixture {
        let response = Ok(ShootState {
            kubernetes_version: kubernetes_version.into(),
        });
        let state = ShootStateFixtureState {
            calls: Vec::new(),
            response,
        };
        ShootStateFixture {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Calls received to fetch live state, as `(runtime_id, tenant)` pairs.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.access().calls.clone()
    }

    /// Fail all future requests.
    pub fn fail(&self, error: AppError) {
        self.access().response = Err(error);
    }
}

#[async_trait::async_trait]
impl ShootStateBackend for ShootStateFixture {
    async fn get(&self, _: &Context, runtime_id: &str, tenant: &str) -> AppResult<ShootState> {
        let mut state = self.access();
        state
            .calls
            .push((runtime_id.to_string(), tenant.to_string()));
        state.response.clone()
    }
}
