//! Requests submitted to the provisioning flows.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::KymaProfile;

/// Request to provision a new runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRuntimeInput {
    /// Registration details of the runtime.
    pub runtime_input: RuntimeInput,

    /// Desired cluster configuration.
    pub cluster_config: ClusterConfigInput,

    /// Optional installation to perform once the cluster is created.
    #[serde(default)]
    pub kyma_config: Option<KymaConfigInput>,
}

/// Registration details of a runtime, as submitted to the runtime registry.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RuntimeInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Desired cluster configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfigInput {
    pub gardener_config: GardenerConfigInput,
    #[serde(default)]
    pub administrators: Vec<String>,
}

/// Gardener shoot cluster configuration request.
///
/// Optional flags are defaulted by the input conversion logic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenerConfigInput {
    /// Shoot name; generated when not provided.
    #[serde(default)]
    pub name: Option<String>,
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
    #[serde(default)]
    pub enable_kubernetes_version_auto_update: Option<bool>,
    #[serde(default)]
    pub enable_machine_image_version_auto_update: Option<bool>,
    #[serde(default)]
    pub allow_privileged_containers: Option<bool>,
    #[serde(default)]
    pub exposure_class_name: Option<String>,
    pub provider_specific_config: ProviderSpecificInput,
    #[serde(default)]
    pub oidc_config: Option<OidcConfigInput>,
    #[serde(default)]
    pub dns_config: Option<DnsConfigInput>,
}

/// Provider specific configuration: exactly one of the fields must be set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpecificInput {
    #[serde(default)]
    pub aws_config: Option<AwsProviderInput>,
    #[serde(default)]
    pub azure_config: Option<AzureProviderInput>,
    #[serde(default)]
    pub gcp_config: Option<GcpProviderInput>,
    #[serde(default)]
    pub open_stack_config: Option<OpenStackProviderInput>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AwsProviderInput {
    pub vpc_cidr: String,
    pub zones: Vec<AwsZoneInput>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AwsZoneInput {
    pub name: String,
    pub internal_cidr: String,
    pub public_cidr: String,
    pub worker_cidr: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AzureProviderInput {
    pub vnet_cidr: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub enable_nat_gateway: Option<bool>,
    #[serde(default)]
    pub idle_connection_timeout_minutes: Option<u32>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GcpProviderInput {
    pub zones: Vec<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OpenStackProviderInput {
    pub zones: Vec<String>,
    pub floating_pool_name: String,
    pub cloud_profile_name: String,
    pub load_balancer_provider: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OidcConfigInput {
    pub client_id: String,
    pub groups_claim: String,
    pub issuer_url: String,
    pub signing_algs: Vec<String>,
    pub username_claim: String,
    pub username_prefix: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DnsConfigInput {
    pub domain: String,
    pub providers: Vec<DnsProviderInput>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DnsProviderInput {
    pub domains_include: Vec<String>,
    pub primary: bool,
    pub secret_name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
}

/// Installation requested on a new runtime.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KymaConfigInput {
    pub version: String,
    #[serde(default)]
    pub profile: Option<KymaProfile>,
    pub components: Vec<ComponentConfigurationInput>,
    #[serde(default)]
    pub configuration: Vec<ConfigEntryInput>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfigurationInput {
    pub component: String,
    pub namespace: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub configuration: Vec<ConfigEntryInput>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntryInput {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub secret: Option<bool>,
}

/// Request to upgrade the Gardener shoot cluster of an existing runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeShootInput {
    pub gardener_config: GardenerUpgradeInput,

    /// Replace the runtime administrators; existing ones are kept when not set.
    #[serde(default)]
    pub administrators: Option<Vec<String>>,
}

/// Changes to apply to a shoot cluster configuration; unset fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GardenerUpgradeInput {
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub machine_image: Option<String>,
    #[serde(default)]
    pub machine_image_version: Option<String>,
    #[serde(default)]
    pub disk_type: Option<String>,
    #[serde(default)]
    pub volume_size_gb: Option<u32>,
    #[serde(default)]
    pub autoscaler_min: Option<u32>,
    #[serde(default)]
    pub autoscaler_max: Option<u32>,
    #[serde(default)]
    pub max_surge: Option<u32>,
    #[serde(default)]
    pub max_unavailable: Option<u32>,
    #[serde(default)]
    pub enable_kubernetes_version_auto_update: Option<bool>,
    #[serde(default)]
    pub enable_machine_image_version_auto_update: Option<bool>,
    #[serde(default)]
    pub exposure_class_name: Option<String>,
    #[serde(default)]
    pub provider_specific_config: Option<ProviderSpecificInput>,
    #[serde(default)]
    pub oidc_config: Option<OidcConfigInput>,
}
