//! Definition of the queues tasks are submitted to.
use std::time::Duration;

/// A named queue of tasks and its redelivery policy.
///
/// Each provisioning flow submits its operations to a dedicated queue so the stage executor
/// can scale and retry them independently.
#[derive(Debug)]
pub struct Queue {
    /// Name of the queue on the message queue platform.
    pub queue: String,

    /// Number of redelivery attempts for tasks that failed with a transient error.
    pub retry_count: u16,

    /// Time a delivered task is hidden from other consumers before redelivery.
    pub retry_timeout: Duration,
}
