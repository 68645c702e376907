//! Data object storing the provisioner's configuration.
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Global configuration for the provisioner process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conf {
    /// Defaults applied while converting provisioning requests.
    #[serde(default)]
    pub converter: ConverterConf,

    /// Serialisation of flows acting on the same runtime.
    #[serde(default)]
    pub locking: LockingConf,

    /// Retry policy for runtime registration with the registry.
    #[serde(default)]
    pub registration: RegistrationRetryConf,
}

/// Defaults applied while converting provisioning requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConf {
    /// Enable Kubernetes version auto-updates for requests that do not specify it.
    #[serde(default)]
    pub default_enable_kubernetes_version_auto_update: bool,

    /// Enable machine image version auto-updates for requests that do not specify it.
    #[serde(default)]
    pub default_enable_machine_image_version_auto_update: bool,

    /// Gardener project new shoot clusters are created in.
    #[serde(default = "ConverterConf::default_gardener_project")]
    pub gardener_project: String,
}

impl Default for ConverterConf {
    fn default() -> Self {
        ConverterConf {
            default_enable_kubernetes_version_auto_update: false,
            default_enable_machine_image_version_auto_update: false,
            gardener_project: ConverterConf::default_gardener_project(),
        }
    }
}

impl ConverterConf {
    fn default_gardener_project() -> String {
        "gardener-project".into()
    }
}

/// Serialisation of flows acting on the same runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockingConf {
    /// Deprovision and upgrade flows for the same runtime wait for each other.
    ///
    /// Only flows within the same process are serialised.
    #[serde(default = "LockingConf::default_serialise_runtime_operations")]
    pub serialise_runtime_operations: bool,
}

impl Default for LockingConf {
    fn default() -> Self {
        LockingConf {
            serialise_runtime_operations: LockingConf::default_serialise_runtime_operations(),
        }
    }
}

impl LockingConf {
    fn default_serialise_runtime_operations() -> bool {
        true
    }
}

/// Retry policy for runtime registration with the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRetryConf {
    /// Maximum time, in milliseconds, to wait between attempts.
    #[serde(default = "RegistrationRetryConf::default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Maximum number of retries after the first attempt fails.
    #[serde(default = "RegistrationRetryConf::default_max_retries")]
    pub max_retries: u16,

    /// Backoff multiplier applied to the delay after each failed attempt.
    #[serde(default = "RegistrationRetryConf::default_multiplier")]
    pub multiplier: u32,

    /// Initial delay, in milliseconds, to wait before the first retry.
    #[serde(default = "RegistrationRetryConf::default_start_delay_ms")]
    pub start_delay_ms: u64,
}

impl Default for RegistrationRetryConf {
    fn default() -> Self {
        RegistrationRetryConf {
            max_delay_ms: RegistrationRetryConf::default_max_delay_ms(),
            max_retries: RegistrationRetryConf::default_max_retries(),
            multiplier: RegistrationRetryConf::default_multiplier(),
            start_delay_ms: RegistrationRetryConf::default_start_delay_ms(),
        }
    }
}

impl RegistrationRetryConf {
    fn default_max_delay_ms() -> u64 {
        5000
    }

    fn default_max_retries() -> u16 {
        3
    }

    fn default_multiplier() -> u32 {
        2
    }

    fn default_start_delay_ms() -> u64 {
        200
    }

    /// Maximum delay between attempts.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Delay before the first retry.
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::Conf;

    #[test]
    fn empty_document_uses_defaults() {
        let conf: Conf = serde_yaml::from_str("{}").expect("empty conf to decode");
        assert_eq!(conf, Conf::default());
        assert_eq!(conf.registration.max_retries, 3);
        assert_eq!(conf.registration.start_delay_ms, 200);
        assert!(conf.locking.serialise_runtime_operations);
        assert_eq!(conf.converter.gardener_project, "gardener-project");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let conf: Conf = serde_yaml::from_str(
            r#"
converter:
  gardener_project: my-project
  default_enable_kubernetes_version_auto_update: true
registration:
  max_retries: 1
"#,
        )
        .expect("conf to decode");
        assert_eq!(conf.converter.gardener_project, "my-project");
        assert!(conf.converter.default_enable_kubernetes_version_auto_update);
        assert!(!conf.converter.default_enable_machine_image_version_auto_update);
        assert_eq!(conf.registration.max_retries, 1);
        assert_eq!(conf.registration.multiplier, 2);
        assert_eq!(conf.registration.max_delay_ms, 5000);
    }
}
