//! Common errors from and for the provisioner implementation.
//!
//! Errors returned to callers of the provisioning flows are [`AppError`]s:
//! they expose a [`ErrorCode`], the [`ErrComponent`] that failed and a [`ErrReason`]
//! so transports can map them to a status without parsing messages.
//!
//! Persistent store errors are reported as [`DbError`]s and converted into [`AppError`]s
//! with their kind preserved.
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Convenience alias for results of provisioning operations.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Class of the error, used to pick transport level status codes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The request cannot be performed as submitted by the caller.
    BadRequest,

    /// An unexpected failure occurred while processing the request.
    Internal,

    /// A requested record does not exist.
    NotFound,
}

/// System component an error originated from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ErrComponent {
    /// The cloud cluster provisioning backend.
    CloudBackend,

    /// The transactional operation store.
    Db,

    /// The provisioning orchestration logic itself.
    Provisioner,

    /// The external runtime registry.
    Registry,
}

impl fmt::Display for ErrComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrComponent::CloudBackend => "cloud backend",
            ErrComponent::Db => "db",
            ErrComponent::Provisioner => "provisioner",
            ErrComponent::Registry => "registry",
        };
        f.write_str(name)
    }
}

/// Machine readable reason for an error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ErrReason {
    CloudBackendInternal,
    DbAlreadyExists,
    DbInternal,
    DbNotFound,
    ProvisionerInternal,
    RegistryInternal,
}

impl fmt::Display for ErrReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrReason::CloudBackendInternal => "cloud backend error",
            ErrReason::DbAlreadyExists => "db already exists",
            ErrReason::DbInternal => "db error",
            ErrReason::DbNotFound => "db object not found",
            ErrReason::ProvisionerInternal => "provisioner error",
            ErrReason::RegistryInternal => "registry error",
        };
        f.write_str(name)
    }
}

/// Error returned by provisioning flows and external collaborators.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    code: ErrorCode,
    component: ErrComponent,
    message: String,
    reason: ErrReason,
}

impl AppError {
    /// A caller error raised by the provisioner.
    pub fn bad_request<S: Into<String>>(message: S) -> AppError {
        AppError {
            code: ErrorCode::BadRequest,
            component: ErrComponent::Provisioner,
            message: message.into(),
            reason: ErrReason::ProvisionerInternal,
        }
    }

    /// An unexpected failure raised by the provisioner.
    pub fn internal<S: Into<String>>(message: S) -> AppError {
        AppError {
            code: ErrorCode::Internal,
            component: ErrComponent::Provisioner,
            message: message.into(),
            reason: ErrReason::ProvisionerInternal,
        }
    }

    /// A requested record could not be found.
    pub fn not_found<S: Into<String>>(message: S) -> AppError {
        AppError {
            code: ErrorCode::NotFound,
            component: ErrComponent::Provisioner,
            message: message.into(),
            reason: ErrReason::ProvisionerInternal,
        }
    }

    /// Prefix the error message with a description of the failed step.
    ///
    /// Code, component and reason of the error are preserved.
    pub fn append<S: AsRef<str>>(mut self, prefix: S) -> AppError {
        self.message = format!("{}: {}", prefix.as_ref(), self.message);
        self
    }

    /// Class of the error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Component the error originated from.
    pub fn component(&self) -> ErrComponent {
        self.component
    }

    /// Human readable description of the error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Machine readable reason for the error.
    pub fn reason(&self) -> ErrReason {
        self.reason
    }

    /// Attribute the error to a different component and reason.
    pub fn with_origin(mut self, component: ErrComponent, reason: ErrReason) -> AppError {
        self.component = component;
        self.reason = reason;
        self
    }
}

/// Errors reported by operation store backends.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DbError {
    /// A record with the same identity is already stored.
    #[error("{0}")]
    AlreadyExists(String),

    /// The store failed to process the request.
    #[error("{0}")]
    Internal(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl DbError {
    /// A record with the same identity is already stored.
    pub fn already_exists<S: Into<String>>(message: S) -> DbError {
        DbError::AlreadyExists(message.into())
    }

    /// The store failed to process the request.
    pub fn internal<S: Into<String>>(message: S) -> DbError {
        DbError::Internal(message.into())
    }

    /// The requested record does not exist.
    pub fn not_found<S: Into<String>>(message: S) -> DbError {
        DbError::NotFound(message.into())
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        let (code, reason, message) = match value {
            DbError::AlreadyExists(message) => {
                (ErrorCode::Internal, ErrReason::DbAlreadyExists, message)
            }
            DbError::Internal(message) => (ErrorCode::Internal, ErrReason::DbInternal, message),
            DbError::NotFound(message) => (ErrorCode::NotFound, ErrReason::DbNotFound, message),
        };
        AppError {
            code,
            component: ErrComponent::Db,
            message,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use super::DbError;
    use super::ErrComponent;
    use super::ErrReason;
    use super::ErrorCode;

    #[test]
    fn append_keeps_classification() {
        let error = AppError::internal("some error")
            .with_origin(ErrComponent::Registry, ErrReason::RegistryInternal)
            .append("Failed to register Runtime");
        assert_eq!(error.to_string(), "Failed to register Runtime: some error");
        assert_eq!(error.code(), ErrorCode::Internal);
        assert_eq!(error.component(), ErrComponent::Registry);
        assert_eq!(error.reason(), ErrReason::RegistryInternal);
    }

    #[test]
    fn bad_request_is_provisioner_error() {
        let error = AppError::bad_request("nope");
        assert_eq!(error.code(), ErrorCode::BadRequest);
        assert_eq!(error.component(), ErrComponent::Provisioner);
        assert_eq!(error.reason(), ErrReason::ProvisionerInternal);
    }

    #[test]
    fn db_internal_keeps_kind() {
        let error = AppError::from(DbError::internal("Failed to commit transaction: error"));
        assert_eq!(error.code(), ErrorCode::Internal);
        assert_eq!(error.component(), ErrComponent::Db);
        assert_eq!(error.reason(), ErrReason::DbInternal);
        assert_eq!(error.message(), "Failed to commit transaction: error");
    }

    #[test]
    fn db_not_found_keeps_kind() {
        let error = AppError::from(DbError::not_found("cluster not found"));
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.reason(), ErrReason::DbNotFound);
    }
}
