//! Report internal records back to callers.
use provisioner_models::api::ClusterConfigStatus;
use provisioner_models::api::LastErrorStatus;
use provisioner_models::api::OperationKind;
use provisioner_models::api::OperationStatus;
use provisioner_models::api::RuntimeConfig;
use provisioner_models::api::RuntimeStatus;
use provisioner_models::Cluster;
use provisioner_models::GardenerConfig;
use provisioner_models::Operation;
use provisioner_models::OperationType;

/// Map an internal operation type to the kind reported to callers.
pub fn operation_kind(op_type: OperationType) -> OperationKind {
    match op_type {
        OperationType::Deprovision | OperationType::DeprovisionNoInstall => {
            OperationKind::Deprovision
        }
        OperationType::Hibernate => OperationKind::Hibernate,
        OperationType::Provision | OperationType::ProvisionNoInstall => OperationKind::Provision,
        OperationType::ReconnectRuntime => OperationKind::ReconnectRuntime,
        OperationType::Upgrade => OperationKind::Upgrade,
        OperationType::UpgradeShoot => OperationKind::UpgradeShoot,
    }
}

/// Status of an operation as reported to callers.
pub fn operation_status(operation: &Operation) -> OperationStatus {
    let message = Some(operation.message.clone()).filter(|message| !message.is_empty());
    let runtime_id = Some(operation.cluster_id.clone()).filter(|id| !id.is_empty());
    let last_error = operation.last_error.as_ref().map(|error| LastErrorStatus {
        component: error.component.clone(),
        message: error.message.clone(),
        reason: error.reason.clone(),
    });
    OperationStatus {
        id: operation.id.clone(),
        operation: operation_kind(operation.op_type),
        state: operation.state,
        message,
        runtime_id,
        last_error,
    }
}

/// Status of a runtime given its last operation.
pub fn runtime_status(last_operation: &Operation, cluster: &Cluster) -> RuntimeStatus {
    let kyma_version = cluster
        .kyma_config
        .as_ref()
        .map(|config| config.release.version.clone());
    RuntimeStatus {
        last_operation_status: operation_status(last_operation),
        runtime_configuration: RuntimeConfig {
            cluster_config: cluster_config_status(&cluster.cluster_config),
            kyma_version,
            kubeconfig: cluster.kubeconfig.clone(),
        },
    }
}

fn cluster_config_status(config: &GardenerConfig) -> ClusterConfigStatus {
    ClusterConfigStatus {
        name: config.name.clone(),
        project_name: config.project_name.clone(),
        kubernetes_version: config.kubernetes_version.clone(),
        region: config.region.clone(),
        target_secret: config.target_secret.clone(),
        seed: config.seed.clone(),
        purpose: config.purpose.clone(),
        licence_type: config.licence_type.clone(),
        machine_type: config.machine_type.clone(),
        machine_image: config.machine_image.clone(),
        machine_image_version: config.machine_image_version.clone(),
        disk_type: config.disk_type.clone(),
        volume_size_gb: config.volume_size_gb,
        worker_cidr: config.worker_cidr.clone(),
        autoscaler_min: config.autoscaler_min,
        autoscaler_max: config.autoscaler_max,
        max_surge: config.max_surge,
        max_unavailable: config.max_unavailable,
        enable_kubernetes_version_auto_update: config.enable_kubernetes_version_auto_update,
        enable_machine_image_version_auto_update: config.enable_machine_image_version_auto_update,
        allow_privileged_containers: config.allow_privileged_containers,
        exposure_class_name: config.exposure_class_name.clone(),
        oidc_config: config.oidc_config.clone(),
        dns_config: config.dns_config.clone(),
        provider_specific_config: config.provider.clone(),
    }
}

#[cfg(test)]
mod tests {
    use provisioner_models::api::OperationKind;
    use provisioner_models::Cluster;
    use provisioner_models::LastError;
    use provisioner_models::Operation;
    use provisioner_models::OperationStage;
    use provisioner_models::OperationState;
    use provisioner_models::OperationType;

    use super::operation_kind;
    use super::operation_status;
    use super::runtime_status;

    #[test]
    fn no_install_kinds_collapse() {
        assert_eq!(
            operation_kind(OperationType::ProvisionNoInstall),
            OperationKind::Provision,
        );
        assert_eq!(
            operation_kind(OperationType::DeprovisionNoInstall),
            OperationKind::Deprovision,
        );
        assert_eq!(
            operation_kind(OperationType::UpgradeShoot),
            OperationKind::UpgradeShoot,
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let operation = Operation::start(
            "",
            OperationType::Provision,
            OperationStage::WaitingForClusterDomain,
            "",
        );
        let status = operation_status(&operation);
        assert_eq!(status.id, operation.id);
        assert_eq!(status.message, None);
        assert_eq!(status.runtime_id, None);
        assert_eq!(status.last_error, None);
    }

    #[test]
    fn failed_operation_reports_error() {
        let mut operation = Operation::start(
            "runtime",
            OperationType::DeprovisionNoInstall,
            OperationStage::DeprovisionCluster,
            "Deprovisioning failed",
        );
        operation.last_error = Some(LastError {
            component: "cloud backend".into(),
            message: "shoot not found".into(),
            reason: "cloud backend error".into(),
        });
        operation.finish(OperationState::Failed);

        let status = operation_status(&operation);
        assert_eq!(status.operation, OperationKind::Deprovision);
        assert_eq!(status.state, OperationState::Failed);
        assert_eq!(status.runtime_id.as_deref(), Some("runtime"));
        assert_eq!(status.message.as_deref(), Some("Deprovisioning failed"));
        let error = status.last_error.expect("last error reported");
        assert_eq!(error.message, "shoot not found");
    }

    #[test]
    fn runtime_status_reports_configuration() {
        let mut cluster = Cluster::fixture();
        cluster.assign_id("runtime");
        cluster.kubeconfig = Some("kubeconfig".into());
        let operation = Operation::start(
            "runtime",
            OperationType::Provision,
            OperationStage::WaitingForInstallation,
            "Provisioning started",
        );

        let status = runtime_status(&operation, &cluster);
        assert_eq!(status.last_operation_status.id, operation.id);
        let config = status.runtime_configuration;
        assert_eq!(config.kyma_version.as_deref(), Some("2.0.0"));
        assert_eq!(config.kubeconfig.as_deref(), Some("kubeconfig"));
        assert_eq!(config.cluster_config.name, cluster.cluster_config.name);
        assert_eq!(
            config.cluster_config.provider_specific_config,
            cluster.cluster_config.provider,
        );
    }
}
