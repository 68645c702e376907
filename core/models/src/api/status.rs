//! Status representations returned to callers.
use serde::Deserialize;
use serde::Serialize;

use crate::DnsConfig;
use crate::OidcConfig;
use crate::OperationState;
use crate::ProviderConfig;

/// Externally visible kind of an operation.
///
/// Internal variants that only differ in installation handling collapse into their base kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Deprovision,
    Hibernate,
    Provision,
    ReconnectRuntime,
    Upgrade,
    UpgradeShoot,
}

/// Status of an operation as reported to callers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// ID of the operation, never empty.
    pub id: String,

    /// Kind of operation.
    pub operation: OperationKind,

    /// Lifecycle state of the operation.
    pub state: OperationState,

    #[serde(default)]
    pub message: Option<String>,

    /// Runtime the operation acts on, if one was assigned by the registry.
    #[serde(default)]
    pub runtime_id: Option<String>,

    #[serde(default)]
    pub last_error: Option<LastErrorStatus>,
}

/// Details of the error that failed an operation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LastErrorStatus {
    pub component: String,
    pub message: String,
    pub reason: String,
}

/// Status of a runtime: its last operation and current configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub last_operation_status: OperationStatus,
    pub runtime_configuration: RuntimeConfig,
}

/// Current configuration of a runtime.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub cluster_config: ClusterConfigStatus,

    /// Version of the installation requested for the runtime, if any.
    #[serde(default)]
    pub kyma_version: Option<String>,

    /// Kubeconfig to access the cluster, once available.
    #[serde(default)]
    pub kubeconfig: Option<String>,
}

/// Cluster configuration as reported to callers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfigStatus {
    pub name: String,
    pub project_name: String,
    pub kubernetes_version: String,
    pub region: String,
    pub target_secret: String,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub licence_type: Option<String>,
    pub machine_type: String,
    #[serde(default)]
    pub machine_image: Option<String>,
    #[serde(default)]
    pub machine_image_version: Option<String>,
    #[serde(default)]
    pub disk_type: Option<String>,
    #[serde(default)]
    pub volume_size_gb: Option<u32>,
    pub worker_cidr: String,
    pub autoscaler_min: u32,
    pub autoscaler_max: u32,
    pub max_surge: u32,
    pub max_unavailable: u32,
    pub enable_kubernetes_version_auto_update: bool,
    pub enable_machine_image_version_auto_update: bool,
    pub allow_privileged_containers: bool,
    #[serde(default)]
    pub exposure_class_name: Option<String>,
    #[serde(default)]
    pub oidc_config: Option<OidcConfig>,
    #[serde(default)]
    pub dns_config: Option<DnsConfig>,
    pub provider_specific_config: ProviderConfig,
}
