//! Request and status representations exchanged with callers of the provisioning flows.
mod input;
mod status;

pub use self::input::AwsProviderInput;
pub use self::input::AwsZoneInput;
pub use self::input::AzureProviderInput;
pub use self::input::ClusterConfigInput;
pub use self::input::ComponentConfigurationInput;
pub use self::input::ConfigEntryInput;
pub use self::input::DnsConfigInput;
pub use self::input::DnsProviderInput;
pub use self::input::GardenerConfigInput;
pub use self::input::GardenerUpgradeInput;
pub use self::input::GcpProviderInput;
pub use self::input::KymaConfigInput;
pub use self::input::OidcConfigInput;
pub use self::input::OpenStackProviderInput;
pub use self::input::ProviderSpecificInput;
pub use self::input::ProvisionRuntimeInput;
pub use self::input::RuntimeInput;
pub use self::input::UpgradeShootInput;
pub use self::status::ClusterConfigStatus;
pub use self::status::LastErrorStatus;
pub use self::status::OperationKind;
pub use self::status::OperationStatus;
pub use self::status::RuntimeConfig;
pub use self::status::RuntimeStatus;
