//! Tracked units of asynchronous work against a cluster.
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A single unit of asynchronous work against a [`Cluster`](crate::Cluster).
///
/// Operations are created when a cloud backend call is about to be made and move to
/// a final state exclusively through the stage executor draining the operation queues.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique identifier of the operation.
    pub id: String,

    /// Runtime the operation acts on.
    pub cluster_id: String,

    /// Time the operation reached a final state.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_timestamp: Option<OffsetDateTime>,

    /// Details of the error that failed the operation, if any.
    #[serde(default)]
    pub last_error: Option<LastError>,

    /// Human readable description of the operation progress.
    #[serde(default)]
    pub message: String,

    /// Type specific sub-state of the operation.
    pub stage: OperationStage,

    /// Time the operation was started.
    #[serde(with = "time::serde::rfc3339")]
    pub start_timestamp: OffsetDateTime,

    /// Lifecycle state of the operation.
    pub state: OperationState,

    /// Kind of work performed by the operation.
    #[serde(rename = "type")]
    pub op_type: OperationType,
}

impl Operation {
    /// Start a new operation for a cluster with a freshly generated ID.
    pub fn start<S1, S2>(
        cluster_id: S1,
        op_type: OperationType,
        stage: OperationStage,
        message: S2,
    ) -> Operation
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Operation {
            id: Uuid::new_v4().to_string(),
            cluster_id: cluster_id.into(),
            end_timestamp: None,
            last_error: None,
            message: message.into(),
            stage,
            start_timestamp: OffsetDateTime::now_utc(),
            state: OperationState::InProgress,
            op_type,
        }
    }

    /// Same as [`Operation::start`] but with a caller provided operation ID.
    pub fn start_with_id<S1, S2, S3>(
        id: S1,
        cluster_id: S2,
        op_type: OperationType,
        stage: OperationStage,
        message: S3,
    ) -> Operation
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let mut operation = Operation::start(cluster_id, op_type, stage, message);
        operation.id = id.into();
        operation
    }

    /// Move the operation to a final state and record the end time.
    pub fn finish(&mut self, state: OperationState) {
        self.state = state;
        self.end_timestamp = Some(OffsetDateTime::now_utc());
    }
}

/// Details of the error that caused an operation to fail.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LastError {
    pub component: String,
    pub message: String,
    pub reason: String,
}

/// Lifecycle state of an [`Operation`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum OperationState {
    /// The operation failed and will not progress further.
    #[serde(rename = "FAILED")]
    Failed,

    /// The operation is being executed.
    #[serde(rename = "IN_PROGRESS")]
    InProgress,

    /// The operation was recorded but execution did not start yet.
    #[serde(rename = "PENDING")]
    Pending,

    /// The operation completed successfully.
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
}

impl OperationState {
    /// Check if the operation is in a final state (succeeded or failed).
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Failed | Self::Succeeded)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Failed => write!(f, "FAILED"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Pending => write!(f, "PENDING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
        }
    }
}

/// Kind of work performed by an [`Operation`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum OperationType {
    #[serde(rename = "DEPROVISION")]
    Deprovision,
    #[serde(rename = "DEPROVISION_NO_INSTALL")]
    DeprovisionNoInstall,
    #[serde(rename = "HIBERNATE")]
    Hibernate,
    #[serde(rename = "PROVISION")]
    Provision,
    #[serde(rename = "PROVISION_NO_INSTALL")]
    ProvisionNoInstall,
    #[serde(rename = "RECONNECT_RUNTIME")]
    ReconnectRuntime,
    #[serde(rename = "UPGRADE")]
    Upgrade,
    #[serde(rename = "UPGRADE_SHOOT")]
    UpgradeShoot,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Deprovision => write!(f, "DEPROVISION"),
            Self::DeprovisionNoInstall => write!(f, "DEPROVISION_NO_INSTALL"),
            Self::Hibernate => write!(f, "HIBERNATE"),
            Self::Provision => write!(f, "PROVISION"),
            Self::ProvisionNoInstall => write!(f, "PROVISION_NO_INSTALL"),
            Self::ReconnectRuntime => write!(f, "RECONNECT_RUNTIME"),
            Self::Upgrade => write!(f, "UPGRADE"),
            Self::UpgradeShoot => write!(f, "UPGRADE_SHOOT"),
        }
    }
}

/// Type specific sub-state of an [`Operation`], advanced by the stage executor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStage {
    CleanupCluster,
    ConnectRuntimeAgent,
    DeleteCluster,
    DeprovisionCluster,
    FinishedStage,
    StartingInstallation,
    WaitForClusterDeletion,
    WaitingForClusterCreation,
    WaitingForClusterDomain,
    WaitingForInstallation,
    WaitingForShootNewVersion,
    WaitingForShootUpgrade,
}

#[cfg(test)]
mod tests {
    use super::Operation;
    use super::OperationStage;
    use super::OperationState;
    use super::OperationType;

    #[test]
    fn final_states() {
        assert!(OperationState::Failed.is_final());
        assert!(OperationState::Succeeded.is_final());
        assert!(!OperationState::InProgress.is_final());
        assert!(!OperationState::Pending.is_final());
    }

    #[test]
    fn finish_sets_end_timestamp() {
        let mut operation = Operation::start(
            "runtime",
            OperationType::Provision,
            OperationStage::WaitingForClusterDomain,
            "Provisioning started",
        );
        assert_eq!(operation.end_timestamp, None);
        operation.finish(OperationState::Succeeded);
        assert_eq!(operation.state, OperationState::Succeeded);
        assert!(operation.end_timestamp.is_some());
    }

    #[test]
    fn start_generates_unique_ids() {
        let first = Operation::start(
            "runtime",
            OperationType::Deprovision,
            OperationStage::DeprovisionCluster,
            "",
        );
        let second = Operation::start(
            "runtime",
            OperationType::Deprovision,
            OperationStage::DeprovisionCluster,
            "",
        );
        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(first.state, OperationState::InProgress);
    }

    #[test]
    fn stage_serialises_screaming() {
        let stage = serde_json::to_value(OperationStage::WaitingForShootNewVersion).unwrap();
        assert_eq!(stage, serde_json::json!("WAITING_FOR_SHOOT_NEW_VERSION"));
    }
}
