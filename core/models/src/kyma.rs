//! Installation configuration applied to clusters once provisioned.
use serde::Deserialize;
use serde::Serialize;

/// Installation configuration requested for a cluster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KymaConfig {
    pub id: String,

    /// The configuration is the one currently installed on the cluster.
    #[serde(default)]
    pub active: bool,

    /// Runtime the configuration belongs to.
    pub cluster_id: String,

    /// Components to install, in installation order.
    pub components: Vec<KymaComponentConfig>,

    /// Configuration entries shared by all components.
    #[serde(default)]
    pub global_configuration: Vec<ConfigEntry>,

    #[serde(default)]
    pub profile: Option<KymaProfile>,

    /// Release of the installation to apply.
    pub release: Release,
}

/// Installation release version.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub version: String,
}

/// Resource profile used to size installed components.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum KymaProfile {
    #[serde(rename = "EVALUATION")]
    Evaluation,
    #[serde(rename = "PRODUCTION")]
    Production,
}

/// Configuration of a single installed component.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct KymaComponentConfig {
    pub id: String,
    pub component: String,
    pub namespace: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub configuration: Vec<ConfigEntry>,
    /// Position of the component in the installation order.
    pub order: usize,
}

/// A single configuration key/value pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    /// The value is sensitive and must be stored as a secret.
    #[serde(default)]
    pub secret: bool,
}
