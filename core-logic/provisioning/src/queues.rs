//! Queues operations are submitted to for execution by the stage executor.
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::Serialize;

use provisioner_tasks::conf::Queue;
use provisioner_tasks::submit::TaskSubmission;

/// Background task queue for provisioning operations.
pub static PROVISIONING_QUEUE: Lazy<Queue> = Lazy::new(|| Queue {
    queue: String::from("provisioning"),
    retry_count: 3,
    retry_timeout: std::time::Duration::from_secs(5),
});

/// Background task queue for deprovisioning operations.
pub static DEPROVISIONING_QUEUE: Lazy<Queue> = Lazy::new(|| Queue {
    queue: String::from("deprovisioning"),
    retry_count: 3,
    retry_timeout: std::time::Duration::from_secs(5),
});

/// Background task queue for shoot cluster upgrade operations.
pub static UPGRADE_SHOOT_QUEUE: Lazy<Queue> = Lazy::new(|| Queue {
    queue: String::from("upgrade_shoot"),
    retry_count: 3,
    retry_timeout: std::time::Duration::from_secs(5),
});

/// Operation queues, one per flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationQueue {
    Deprovisioning,
    Provisioning,
    UpgradeShoot,
}

impl OperationQueue {
    /// Definition of the queue.
    pub fn queue(&self) -> &'static Queue {
        match self {
            Self::Deprovisioning => &DEPROVISIONING_QUEUE,
            Self::Provisioning => &PROVISIONING_QUEUE,
            Self::UpgradeShoot => &UPGRADE_SHOOT_QUEUE,
        }
    }
}

/// Payload of tasks submitted to operation queues.
///
/// Only the operation ID is queued: the store is the source of truth for the operation state.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OperationTask {
    pub operation_id: String,
}

/// Request to enqueue an operation onto one of the operation queues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnqueueOperation {
    pub queue: OperationQueue,
    pub operation_id: String,
}

impl EnqueueOperation {
    pub fn new<S: Into<String>>(queue: OperationQueue, operation_id: S) -> Self {
        Self {
            queue,
            operation_id: operation_id.into(),
        }
    }
}

impl TryInto<TaskSubmission> for EnqueueOperation {
    type Error = anyhow::Error;

    fn try_into(self) -> Result<TaskSubmission, Self::Error> {
        let payload = OperationTask {
            operation_id: self.operation_id,
        };
        TaskSubmission::new(self.queue.queue(), &payload)
    }
}
