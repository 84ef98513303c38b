//! Error types for the Altus SDK.
//!
//! Every fallible SDK surface returns [`AltusError`]. The enum is cloneable
//! on purpose: a failed background future fans its error out to every waiter,
//! and the owning resource keeps a copy as its terminal error.

use thiserror::Error;
use tonic::Code;

/// Platform error, one variant per canonical failure kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AltusError {
    /// A caller-supplied argument failed validation before any RPC was made.
    #[error("Invalid argument: {0}")]
    BadArgument(String),

    /// A resource name or id does not follow the canonical naming scheme.
    #[error("Invalid resource name: {0}")]
    BadName(String),

    /// The referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to touch the referenced resource.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The resource exists but is of a different kind than the façade
    /// through which it was addressed.
    #[error("Wrong resource kind: {0}")]
    WrongKind(String),

    /// Creation raced with an existing resource of the same identity.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Work was discarded before completion, e.g. at scheduler shutdown.
    #[error("Aborted: {0}")]
    Aborted(String),

    /// The operation or pipeline was cancelled.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A wait or RPC exceeded its deadline.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// A prerequisite future failed, so this work never ran.
    #[error("Dependency failed: {source}")]
    DependencyFailed {
        #[source]
        source: Box<AltusError>,
    },

    /// The resource was deleted through this SDK and refuses further use.
    #[error("Resource deleted: {0}")]
    Deleted(String),

    /// The platform could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The platform reported a failure that maps to no other kind.
    #[error("Server error: {0}")]
    Server(String),
}

impl AltusError {
    /// Wraps `source` as the failure of a dependent future.
    #[must_use]
    pub fn dependency(source: Self) -> Self {
        Self::DependencyFailed { source: Box::new(source) }
    }

    /// Walks the dependency chain to the error that started it.
    ///
    /// For errors that are not [`AltusError::DependencyFailed`] this returns
    /// `self`.
    #[must_use]
    pub fn ultimate_cause(&self) -> &Self {
        let mut cause = self;
        while let Self::DependencyFailed { source } = cause {
            cause = source;
        }
        cause
    }
}

impl From<tonic::Status> for AltusError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => Self::NotFound(message),
            Code::PermissionDenied | Code::Unauthenticated => Self::PermissionDenied(message),
            Code::AlreadyExists => Self::AlreadyExists(message),
            Code::InvalidArgument => Self::BadArgument(message),
            Code::Cancelled => Self::Cancelled(message),
            Code::DeadlineExceeded => Self::DeadlineExceeded(message),
            Code::Aborted => Self::Aborted(message),
            Code::Unavailable => Self::Transport(message),
            _ => Self::Server(message),
        }
    }
}

impl From<altus_proto::v1::Status> for AltusError {
    /// Maps the wire status embedded in terminal operations through the same
    /// code table as live RPC failures.
    fn from(status: altus_proto::v1::Status) -> Self {
        tonic::Status::new(Code::from(status.code), status.message).into()
    }
}

impl From<prost::DecodeError> for AltusError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Server(format!("malformed response payload: {err}"))
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, AltusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        let err: AltusError = tonic::Status::not_found("no dataset 456").into();
        assert_eq!(err, AltusError::NotFound("no dataset 456".to_string()));

        let err: AltusError = tonic::Status::permission_denied("nope").into();
        assert_eq!(err, AltusError::PermissionDenied("nope".to_string()));

        let err: AltusError = tonic::Status::invalid_argument("bad page size").into();
        assert_eq!(err, AltusError::BadArgument("bad page size".to_string()));

        let err: AltusError = tonic::Status::unavailable("connection refused").into();
        assert_eq!(err, AltusError::Transport("connection refused".to_string()));

        let err: AltusError = tonic::Status::internal("boom").into();
        assert_eq!(err, AltusError::Server("boom".to_string()));
    }

    #[test]
    fn test_wire_status_mapping() {
        let wire = altus_proto::v1::Status {
            code: Code::Cancelled as i32,
            message: "operation cancelled".to_string(),
        };
        let err: AltusError = wire.into();
        assert_eq!(err, AltusError::Cancelled("operation cancelled".to_string()));
    }

    #[test]
    fn test_ultimate_cause_walks_the_chain() {
        let root = AltusError::Cancelled("user asked".to_string());
        let wrapped = AltusError::dependency(AltusError::dependency(root.clone()));

        assert!(matches!(wrapped, AltusError::DependencyFailed { .. }));
        assert_eq!(wrapped.ultimate_cause(), &root);
    }

    #[test]
    fn test_ultimate_cause_identity_for_plain_errors() {
        let err = AltusError::NotFound("x".to_string());
        assert_eq!(err.ultimate_cause(), &err);
    }

    #[test]
    fn test_display_carries_the_chain() {
        let err = AltusError::dependency(AltusError::Cancelled("upstream".to_string()));
        let msg = format!("{}", err);
        assert!(msg.contains("Dependency failed"));
        assert!(msg.contains("Cancelled"));
        assert!(msg.contains("upstream"));
    }
}
