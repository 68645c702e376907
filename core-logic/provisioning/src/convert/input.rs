//! Validate provisioning requests and convert them into the internal data model.
use std::cmp::Ordering;

use time::OffsetDateTime;
use uuid::Uuid;

use provisioner_conf::ConverterConf;
use provisioner_errors::AppError;
use provisioner_errors::AppResult;
use provisioner_models::api::ComponentConfigurationInput;
use provisioner_models::api::ConfigEntryInput;
use provisioner_models::api::DnsConfigInput;
use provisioner_models::api::GardenerConfigInput;
use provisioner_models::api::GardenerUpgradeInput;
use provisioner_models::api::KymaConfigInput;
use provisioner_models::api::OidcConfigInput;
use provisioner_models::api::ProviderSpecificInput;
use provisioner_models::api::ProvisionRuntimeInput;
use provisioner_models::AwsProviderConfig;
use provisioner_models::AwsZone;
use provisioner_models::AzureProviderConfig;
use provisioner_models::Cluster;
use provisioner_models::ConfigEntry;
use provisioner_models::DnsConfig;
use provisioner_models::DnsProvider;
use provisioner_models::GardenerConfig;
use provisioner_models::GcpProviderConfig;
use provisioner_models::KymaComponentConfig;
use provisioner_models::KymaConfig;
use provisioner_models::OidcConfig;
use provisioner_models::OpenStackProviderConfig;
use provisioner_models::ProviderConfig;
use provisioner_models::Release;
use provisioner_models::PENDING_RUNTIME_ID;

/// Prefix of generated shoot cluster names.
const CLUSTER_NAME_PREFIX: &str = "c-";

/// Number of random hex characters in generated shoot cluster names.
const CLUSTER_NAME_RANDOM_LEN: usize = 7;

/// Convert requests into the internal data model, applying configured defaults.
///
/// Conversion errors are caller errors and are reported as bad requests.
#[derive(Clone, Debug)]
pub struct InputConverter {
    conf: ConverterConf,
}

impl InputConverter {
    pub fn new(conf: ConverterConf) -> InputConverter {
        InputConverter { conf }
    }

    /// Convert a provisioning request into an unregistered [`Cluster`].
    ///
    /// The cluster and the configurations it owns carry the [`PENDING_RUNTIME_ID`] until
    /// [`Cluster::assign_id`] is called with the identity assigned by the registry.
    pub fn provisioning_input_to_cluster(
        &self,
        input: &ProvisionRuntimeInput,
        tenant: &str,
        sub_account_id: Option<&str>,
    ) -> AppResult<Cluster> {
        let cluster_config = self.gardener_config(&input.cluster_config.gardener_config)?;
        let kyma_config = input.kyma_config.as_ref().map(kyma_config);
        let cluster = Cluster {
            id: PENDING_RUNTIME_ID.to_string(),
            active_kyma_config_id: None,
            administrators: input.cluster_config.administrators.clone(),
            cluster_config,
            creation_timestamp: OffsetDateTime::now_utc(),
            deleted: false,
            kubeconfig: None,
            kyma_config,
            sub_account_id: sub_account_id.map(String::from),
            tenant: tenant.to_string(),
        };
        Ok(cluster)
    }

    /// Merge a shoot upgrade request over the current provider configuration.
    ///
    /// Identity, name and project of the configuration are never changed.
    pub fn upgrade_shoot_input_to_gardener_config(
        &self,
        input: &GardenerUpgradeInput,
        current: &GardenerConfig,
    ) -> AppResult<GardenerConfig> {
        let mut config = current.clone();

        if let Some(version) = &input.kubernetes_version {
            let order = super::compare_kubernetes_versions(version, &current.kubernetes_version)?;
            if order == Ordering::Less {
                let message = format!(
                    "downgrade of Kubernetes version from {} to {} is not supported",
                    current.kubernetes_version, version,
                );
                return Err(AppError::bad_request(message));
            }
            config.kubernetes_version = version.clone();
        }
        if let Some(provider) = &input.provider_specific_config {
            let provider = provider_config(provider)?;
            check_provider_update(&current.provider, &provider)?;
            config.provider = provider;
        }

        if input.purpose.is_some() {
            config.purpose = input.purpose.clone();
        }
        if let Some(machine_type) = &input.machine_type {
            config.machine_type = machine_type.clone();
        }
        if input.machine_image.is_some() {
            config.machine_image = input.machine_image.clone();
        }
        if input.machine_image_version.is_some() {
            config.machine_image_version = input.machine_image_version.clone();
        }
        if input.disk_type.is_some() {
            config.disk_type = input.disk_type.clone();
        }
        if input.volume_size_gb.is_some() {
            config.volume_size_gb = input.volume_size_gb;
        }
        if let Some(min) = input.autoscaler_min {
            config.autoscaler_min = min;
        }
        if let Some(max) = input.autoscaler_max {
            config.autoscaler_max = max;
        }
        if let Some(surge) = input.max_surge {
            config.max_surge = surge;
        }
        if let Some(unavailable) = input.max_unavailable {
            config.max_unavailable = unavailable;
        }
        if let Some(enable) = input.enable_kubernetes_version_auto_update {
            config.enable_kubernetes_version_auto_update = enable;
        }
        if let Some(enable) = input.enable_machine_image_version_auto_update {
            config.enable_machine_image_version_auto_update = enable;
        }
        if input.exposure_class_name.is_some() {
            config.exposure_class_name = input.exposure_class_name.clone();
        }
        if let Some(oidc) = &input.oidc_config {
            config.oidc_config = Some(oidc_config(oidc));
        }

        check_autoscaler(config.autoscaler_min, config.autoscaler_max)?;
        Ok(config)
    }

    fn gardener_config(&self, input: &GardenerConfigInput) -> AppResult<GardenerConfig> {
        if input.kubernetes_version.trim().is_empty() {
            return Err(AppError::bad_request("Kubernetes version is required"));
        }
        super::parse_kubernetes_version(&input.kubernetes_version)?;
        if input.region.trim().is_empty() {
            return Err(AppError::bad_request("region is required"));
        }
        check_autoscaler(input.autoscaler_min, input.autoscaler_max)?;
        let provider = provider_config(&input.provider_specific_config)?;

        let name = match &input.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => cluster_name(),
        };
        let enable_kubernetes_version_auto_update = input
            .enable_kubernetes_version_auto_update
            .unwrap_or(self.conf.default_enable_kubernetes_version_auto_update);
        let enable_machine_image_version_auto_update = input
            .enable_machine_image_version_auto_update
            .unwrap_or(self.conf.default_enable_machine_image_version_auto_update);

        let config = GardenerConfig {
            id: Uuid::new_v4().to_string(),
            cluster_id: PENDING_RUNTIME_ID.to_string(),
            name,
            project_name: self.conf.gardener_project.clone(),
            kubernetes_version: input.kubernetes_version.clone(),
            region: input.region.clone(),
            target_secret: input.target_secret.clone(),
            seed: input.seed.clone(),
            purpose: input.purpose.clone(),
            licence_type: input.licence_type.clone(),
            machine_type: input.machine_type.clone(),
            machine_image: input.machine_image.clone(),
            machine_image_version: input.machine_image_version.clone(),
            disk_type: input.disk_type.clone(),
            volume_size_gb: input.volume_size_gb,
            worker_cidr: input.worker_cidr.clone(),
            autoscaler_min: input.autoscaler_min,
            autoscaler_max: input.autoscaler_max,
            max_surge: input.max_surge,
            max_unavailable: input.max_unavailable,
            enable_kubernetes_version_auto_update,
            enable_machine_image_version_auto_update,
            allow_privileged_containers: input.allow_privileged_containers.unwrap_or(false),
            exposure_class_name: input.exposure_class_name.clone(),
            oidc_config: input.oidc_config.as_ref().map(oidc_config),
            dns_config: input.dns_config.as_ref().map(dns_config),
            provider,
        };
        Ok(config)
    }
}

/// Generate a random shoot cluster name.
fn cluster_name() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", CLUSTER_NAME_PREFIX, &random[..CLUSTER_NAME_RANDOM_LEN])
}

fn check_autoscaler(min: u32, max: u32) -> AppResult<()> {
    if min > max {
        let message = format!(
            "autoscaler minimum ({}) must not be greater than the maximum ({})",
            min, max,
        );
        return Err(AppError::bad_request(message));
    }
    Ok(())
}

/// Provider updates must keep the provider and all the zones already in use.
fn check_provider_update(current: &ProviderConfig, update: &ProviderConfig) -> AppResult<()> {
    if current.kind() != update.kind() {
        let message = format!(
            "provider specific configuration for {} does not match the cluster provider {}",
            update.kind(),
            current.kind(),
        );
        return Err(AppError::bad_request(message));
    }
    let zones = update.zones();
    if let Some(zone) = current.zones().into_iter().find(|zone| !zones.contains(zone)) {
        let message = format!("zone {} can not be removed from the cluster", zone);
        return Err(AppError::bad_request(message));
    }
    Ok(())
}

fn provider_config(input: &ProviderSpecificInput) -> AppResult<ProviderConfig> {
    let mut configs = Vec::new();
    if let Some(aws) = &input.aws_config {
        let zones = aws
            .zones
            .iter()
            .map(|zone| AwsZone {
                name: zone.name.clone(),
                internal_cidr: zone.internal_cidr.clone(),
                public_cidr: zone.public_cidr.clone(),
                worker_cidr: zone.worker_cidr.clone(),
            })
            .collect();
        configs.push(ProviderConfig::Aws(AwsProviderConfig {
            vpc_cidr: aws.vpc_cidr.clone(),
            zones,
        }));
    }
    if let Some(azure) = &input.azure_config {
        configs.push(ProviderConfig::Azure(AzureProviderConfig {
            vnet_cidr: azure.vnet_cidr.clone(),
            zones: azure.zones.clone(),
            enable_nat_gateway: azure.enable_nat_gateway.unwrap_or(false),
            idle_connection_timeout_minutes: azure.idle_connection_timeout_minutes,
        }));
    }
    if let Some(gcp) = &input.gcp_config {
        configs.push(ProviderConfig::Gcp(GcpProviderConfig {
            zones: gcp.zones.clone(),
        }));
    }
    if let Some(openstack) = &input.open_stack_config {
        configs.push(ProviderConfig::OpenStack(OpenStackProviderConfig {
            zones: openstack.zones.clone(),
            floating_pool_name: openstack.floating_pool_name.clone(),
            cloud_profile_name: openstack.cloud_profile_name.clone(),
            load_balancer_provider: openstack.load_balancer_provider.clone(),
        }));
    }

    match configs.len() {
        0 => Err(AppError::bad_request(
            "provider specific configuration is required",
        )),
        1 => Ok(configs.remove(0)),
        _ => Err(AppError::bad_request(
            "only one provider specific configuration can be set",
        )),
    }
}

fn oidc_config(input: &OidcConfigInput) -> OidcConfig {
    OidcConfig {
        client_id: input.client_id.clone(),
        groups_claim: input.groups_claim.clone(),
        issuer_url: input.issuer_url.clone(),
        signing_algs: input.signing_algs.clone(),
        username_claim: input.username_claim.clone(),
        username_prefix: input.username_prefix.clone(),
    }
}

fn dns_config(input: &DnsConfigInput) -> DnsConfig {
    let providers = input
        .providers
        .iter()
        .map(|provider| DnsProvider {
            domains_include: provider.domains_include.clone(),
            primary: provider.primary,
            secret_name: provider.secret_name.clone(),
            provider_type: provider.provider_type.clone(),
        })
        .collect();
    DnsConfig {
        domain: input.domain.clone(),
        providers,
    }
}

fn kyma_config(input: &KymaConfigInput) -> KymaConfig {
    let components = input
        .components
        .iter()
        .enumerate()
        .map(|(order, component)| kyma_component(order, component))
        .collect();
    KymaConfig {
        id: Uuid::new_v4().to_string(),
        active: false,
        cluster_id: PENDING_RUNTIME_ID.to_string(),
        components,
        global_configuration: config_entries(&input.configuration),
        profile: input.profile,
        release: Release {
            id: Uuid::new_v4().to_string(),
            version: input.version.clone(),
        },
    }
}

fn kyma_component(order: usize, input: &ComponentConfigurationInput) -> KymaComponentConfig {
    KymaComponentConfig {
        id: Uuid::new_v4().to_string(),
        component: input.component.clone(),
        namespace: input.namespace.clone(),
        source_url: input.source_url.clone(),
        configuration: config_entries(&input.configuration),
        order,
    }
}

fn config_entries(input: &[ConfigEntryInput]) -> Vec<ConfigEntry> {
    input
        .iter()
        .map(|entry| ConfigEntry {
            key: entry.key.clone(),
            value: entry.value.clone(),
            secret: entry.secret.unwrap_or(false),
        })
        .collect()
}
