//! Unit tests for the provisioning flows.
use provisioner_clients::fixture::ProvisionerFixture;
use provisioner_clients::fixture::RegistryFixture;
use provisioner_clients::fixture::ShootStateFixture;
use provisioner_clients::ClusterProvisioner;
use provisioner_clients::RuntimeRegistry;
use provisioner_clients::ShootStateProvider;
use provisioner_conf::Conf;
use provisioner_models::api::ClusterConfigInput;
use provisioner_models::api::GardenerConfigInput;
use provisioner_models::api::GcpProviderInput;
use provisioner_models::api::ProviderSpecificInput;
use provisioner_models::api::ProvisionRuntimeInput;
use provisioner_models::api::RuntimeInput;
use provisioner_models::Cluster;
use provisioner_models::Operation;
use provisioner_models::OperationStage;
use provisioner_models::OperationState;
use provisioner_models::OperationType;
use provisioner_store::Store;
use provisioner_store::StoreFixture;
use provisioner_tasks::submit::Tasks;
use provisioner_tasks::submit::TasksFixture;

use super::Collaborators;
use super::ProvisioningService;

mod provision;

/// Runtime ID of clusters seeded into the store.
const RUNTIME_ID: &str = "runtime-id";

/// Service wired to fixtures, with handles to inspect them.
struct Fixtures {
    provisioner: ProvisionerFixture,
    registry: RegistryFixture,
    service: ProvisioningService,
    shoot_state: ShootStateFixture,
    store: StoreFixture,
    tasks: TasksFixture,
}

impl Fixtures {
    fn new() -> Fixtures {
        Fixtures::build(conf(), "1.19")
    }

    fn with_conf(conf: Conf) -> Fixtures {
        Fixtures::build(conf, "1.19")
    }

    /// Fixtures reporting shoot clusters running the given Kubernetes version.
    fn with_shoot_version(version: &str) -> Fixtures {
        Fixtures::build(conf(), version)
    }

    fn build(conf: Conf, shoot_version: &str) -> Fixtures {
        let provisioner = ProvisionerFixture::default();
        let registry = RegistryFixture::default();
        let shoot_state = ShootStateFixture::new(shoot_version);
        let store = StoreFixture::default();
        let tasks = Tasks::fixture();
        let clients = Collaborators {
            provisioner: ClusterProvisioner::from(provisioner.clone()),
            registry: RuntimeRegistry::from(registry.clone()),
            shoot_state: ShootStateProvider::from(shoot_state.clone()),
            store: Store::from(store.clone()),
            tasks: Tasks::from(tasks.backend()),
        };
        let service = ProvisioningService::new(&conf, clients);
        Fixtures {
            provisioner,
            registry,
            service,
            shoot_state,
            store,
            tasks,
        }
    }

    /// Seed a registered cluster and its last operation in the given state.
    fn seed_runtime(&self, last_state: OperationState) -> (Cluster, Operation) {
        let mut cluster = Cluster::fixture();
        cluster.assign_id(RUNTIME_ID);
        self.store.seed_cluster(cluster.clone());

        let mut operation = Operation::start(
            RUNTIME_ID,
            OperationType::Provision,
            OperationStage::FinishedStage,
            "Operation succeeded",
        );
        if last_state.is_final() {
            operation.finish(last_state);
        } else {
            operation.state = last_state;
        }
        self.store.seed_operation(operation.clone());
        (cluster, operation)
    }

    /// Queued operation IDs, in submission order.
    fn queued(&mut self) -> Vec<(String, String)> {
        let mut queued = Vec::new();
        while let Some(task) = self.tasks.try_pop_task() {
            let operation_id = task.payload["operation_id"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            queued.push((task.queue.queue.clone(), operation_id));
        }
        queued
    }
}

/// Configuration with no delay between registration attempts.
fn conf() -> Conf {
    let mut conf = Conf::default();
    conf.registration.start_delay_ms = 0;
    conf.registration.max_delay_ms = 0;
    conf
}

/// Provisioning request for a GCP cluster with an installation configuration.
fn provision_input() -> ProvisionRuntimeInput {
    ProvisionRuntimeInput {
        runtime_input: RuntimeInput {
            name: "test runtime".into(),
            ..Default::default()
        },
        cluster_config: ClusterConfigInput {
            gardener_config: GardenerConfigInput {
                kubernetes_version: "1.16".into(),
                region: "europe-west1".into(),
                target_secret: "secret".into(),
                machine_type: "n1-standard-4".into(),
                worker_cidr: "10.250.0.0/19".into(),
                autoscaler_min: 1,
                autoscaler_max: 5,
                max_surge: 1,
                max_unavailable: 1,
                provider_specific_config: ProviderSpecificInput {
                    gcp_config: Some(GcpProviderInput {
                        zones: vec!["europe-west1-b".into()],
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
            administrators: vec!["admin@example.com".into()],
        },
        kyma_config: None,
    }
}
