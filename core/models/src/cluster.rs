//! Identity and configuration of a managed Kubernetes cluster.
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::GardenerConfig;
use crate::KymaConfig;

/// Placeholder identity of clusters not yet registered with the runtime registry.
pub const PENDING_RUNTIME_ID: &str = "";

/// Identity and desired/actual configuration of one managed Kubernetes cluster.
///
/// The cluster ID is assigned by the runtime registry and never changes afterwards.
/// It is the join key across all other records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Runtime identity assigned by the registry.
    pub id: String,

    /// Currently active installation configuration, if the installation was ever completed.
    #[serde(default)]
    pub active_kyma_config_id: Option<String>,

    /// Users granted administrator access to the cluster.
    #[serde(default)]
    pub administrators: Vec<String>,

    /// Cloud provider configuration of the cluster.
    pub cluster_config: GardenerConfig,

    /// Time the cluster record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_timestamp: OffsetDateTime,

    /// Deprovisioned clusters are flagged rather than deleted.
    #[serde(default)]
    pub deleted: bool,

    /// Kubeconfig to access the cluster, once provisioning progressed far enough.
    #[serde(default)]
    pub kubeconfig: Option<String>,

    /// Requested installation configuration, if any.
    #[serde(default)]
    pub kyma_config: Option<KymaConfig>,

    /// Sub-account the cluster belongs to, if any.
    #[serde(default)]
    pub sub_account_id: Option<String>,

    /// Tenant owning the cluster.
    pub tenant: String,
}

impl Cluster {
    /// Stamp the registry assigned runtime ID onto the cluster and all the records it owns.
    pub fn assign_id<S: Into<String>>(&mut self, runtime_id: S) {
        let runtime_id = runtime_id.into();
        self.cluster_config.cluster_id = runtime_id.clone();
        if let Some(kyma_config) = self.kyma_config.as_mut() {
            kyma_config.cluster_id = runtime_id.clone();
        }
        self.id = runtime_id;
    }

    /// Check if the runtime registry assigned an identity to this cluster.
    #[cfg(test)]
    pub fn is_registered(&self) -> bool {
        self.id != PENDING_RUNTIME_ID
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl Cluster {
    /// Unregistered GCP cluster with an installation configuration, for unit tests.
    pub fn fixture() -> Cluster {
        let provider = crate::ProviderConfig::Gcp(crate::GcpProviderConfig {
            zones: vec!["europe-west1-a".into()],
        });
        Cluster {
            id: PENDING_RUNTIME_ID.into(),
            active_kyma_config_id: None,
            administrators: vec!["admin@example.com".into()],
            cluster_config: GardenerConfig::fixture(provider),
            creation_timestamp: OffsetDateTime::now_utc(),
            deleted: false,
            kubeconfig: None,
            kyma_config: Some(KymaConfig {
                id: "kyma-config".into(),
                active: false,
                cluster_id: PENDING_RUNTIME_ID.into(),
                components: Vec::new(),
                global_configuration: Vec::new(),
                profile: None,
                release: crate::Release {
                    id: "release".into(),
                    version: "2.0.0".into(),
                },
            }),
            sub_account_id: None,
            tenant: "tenant".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cluster;

    #[test]
    fn assign_id_propagates() {
        let mut cluster = Cluster::fixture();
        assert!(!cluster.is_registered());
        cluster.assign_id("runtime");
        assert!(cluster.is_registered());
        assert_eq!(cluster.id, "runtime");
        assert_eq!(cluster.cluster_config.cluster_id, "runtime");
        assert_eq!(cluster.kyma_config.unwrap().cluster_id, "runtime");
    }
}
