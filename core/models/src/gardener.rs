//! Cloud provider specific desired state of a cluster.
use serde::Deserialize;
use serde::Serialize;

/// Provider configuration of a cluster provisioned through Gardener.
///
/// The record is owned by its [`Cluster`](crate::Cluster) and replaced wholesale on upgrade.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GardenerConfig {
    /// Identifier of the provider configuration record.
    pub id: String,

    /// Runtime the configuration belongs to.
    pub cluster_id: String,

    /// Name of the Gardener shoot cluster.
    pub name: String,

    /// Gardener project the shoot cluster is created in.
    pub project_name: String,

    /// Kubernetes version requested for the cluster.
    pub kubernetes_version: String,

    /// Cloud region the cluster is deployed to.
    pub region: String,

    /// Name of the Gardener secret with the cloud provider credentials.
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

    #[serde(default)]
    pub allow_privileged_containers: bool,

    #[serde(default)]
    pub exposure_class_name: Option<String>,

    /// OpenID Connect configuration for the cluster API server.
    #[serde(default)]
    pub oidc_config: Option<OidcConfig>,

    /// Custom DNS configuration for the cluster.
    #[serde(default)]
    pub dns_config: Option<DnsConfig>,

    /// Provider specific configuration.
    pub provider: ProviderConfig,
}

impl GardenerConfig {
    /// Kind of cloud provider the cluster is deployed to.
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl GardenerConfig {
    /// Provider configuration with sensible values for unit tests.
    pub fn fixture(provider: ProviderConfig) -> GardenerConfig {
        GardenerConfig {
            id: "gardener-config-id".into(),
            cluster_id: crate::PENDING_RUNTIME_ID.into(),
            name: "c-1a2b3c4".into(),
            project_name: "gardener-project".into(),
            kubernetes_version: "1.19".into(),
            region: "europe-west1".into(),
            target_secret: "secret".into(),
            seed: None,
            purpose: Some("evaluation".into()),
            licence_type: Some("license".into()),
            machine_type: "n1-standard-4".into(),
            machine_image: None,
            machine_image_version: None,
            disk_type: Some("pd-standard".into()),
            volume_size_gb: Some(50),
            worker_cidr: "10.250.0.0/19".into(),
            autoscaler_min: 1,
            autoscaler_max: 5,
            max_surge: 1,
            max_unavailable: 1,
            enable_kubernetes_version_auto_update: false,
            enable_machine_image_version_auto_update: false,
            allow_privileged_containers: false,
            exposure_class_name: None,
            oidc_config: None,
            dns_config: None,
            provider,
        }
    }
}

/// Supported cloud providers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Azure,
    Gcp,
    OpenStack,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Gcp => write!(f, "gcp"),
            Self::OpenStack => write!(f, "openstack"),
        }
    }
}

/// Provider specific section of a [`GardenerConfig`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Aws(AwsProviderConfig),
    Azure(AzureProviderConfig),
    Gcp(GcpProviderConfig),
    OpenStack(OpenStackProviderConfig),
}

impl ProviderConfig {
    /// Kind of cloud provider this configuration is for.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Aws(_) => ProviderKind::Aws,
            Self::Azure(_) => ProviderKind::Azure,
            Self::Gcp(_) => ProviderKind::Gcp,
            Self::OpenStack(_) => ProviderKind::OpenStack,
        }
    }

    /// Names of the availability zones the cluster workers are spread across.
    pub fn zones(&self) -> Vec<String> {
        match self {
            Self::Aws(config) => config.zones.iter().map(|zone| zone.name.clone()).collect(),
            Self::Azure(config) => config.zones.clone(),
            Self::Gcp(config) => config.zones.clone(),
            Self::OpenStack(config) => config.zones.clone(),
        }
    }
}

/// AWS specific cluster configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AwsProviderConfig {
    pub vpc_cidr: String,
    pub zones: Vec<AwsZone>,
}

/// AWS availability zone and the network ranges allocated in it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AwsZone {
    pub name: String,
    pub internal_cidr: String,
    pub public_cidr: String,
    pub worker_cidr: String,
}

/// Azure specific cluster configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AzureProviderConfig {
    pub vnet_cidr: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub enable_nat_gateway: bool,
    #[serde(default)]
    pub idle_connection_timeout_minutes: Option<u32>,
}

/// GCP specific cluster configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GcpProviderConfig {
    pub zones: Vec<String>,
}

/// OpenStack specific cluster configuration.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OpenStackProviderConfig {
    pub zones: Vec<String>,
    pub floating_pool_name: String,
    pub cloud_profile_name: String,
    pub load_balancer_provider: String,
}

/// OpenID Connect configuration of the cluster API server.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OidcConfig {
    pub client_id: String,
    pub groups_claim: String,
    pub issuer_url: String,
    pub signing_algs: Vec<String>,
    pub username_claim: String,
    pub username_prefix: String,
}

/// Custom DNS configuration of the cluster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DnsConfig {
    pub domain: String,
    pub providers: Vec<DnsProvider>,
}

/// DNS provider able to manage records for the cluster domains.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DnsProvider {
    pub domains_include: Vec<String>,
    pub primary: bool,
    pub secret_name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
}

#[cfg(test)]
mod tests {
    use super::AwsProviderConfig;
    use super::AwsZone;
    use super::ProviderConfig;
    use super::ProviderKind;

    #[test]
    fn aws_zones_names() {
        let provider = ProviderConfig::Aws(AwsProviderConfig {
            vpc_cidr: "10.250.0.0/16".into(),
            zones: vec![AwsZone {
                name: "eu-central-1a".into(),
                internal_cidr: "10.250.112.0/22".into(),
                public_cidr: "10.250.96.0/22".into(),
                worker_cidr: "10.250.0.0/19".into(),
            }],
        });
        assert_eq!(provider.kind(), ProviderKind::Aws);
        assert_eq!(provider.zones(), vec!["eu-central-1a".to_string()]);
    }

    #[test]
    fn provider_config_is_tagged() {
        let provider = ProviderConfig::Gcp(super::GcpProviderConfig {
            zones: vec!["europe-west1-b".into()],
        });
        let encoded = serde_json::to_value(&provider).unwrap();
        assert_eq!(
            encoded,
            serde_json::json!({"kind": "gcp", "zones": ["europe-west1-b"]}),
        );
    }
}
