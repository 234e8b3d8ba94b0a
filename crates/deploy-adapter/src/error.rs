//! Error types for the deploy adapter
//!
//! Backend failures arrive as [`BackendError`] from every [`crate::Executor`]
//! call and are classified exactly once into the outward [`Error`] taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an orchestrator backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The requested object does not exist
    #[error("{0}")]
    NotFound(String),

    /// An object with the same name already exists
    #[error("{0}")]
    AlreadyExists(String),

    /// Any other backend or transport failure
    #[error("{0}")]
    Other(String),
}

/// Deploy adapter error type
///
/// The message is always carried verbatim; backend-sourced errors keep the
/// backend's own wording.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Deployment not found
    #[error("{0}")]
    NotFound(String),

    /// Deployment already exists, or the request asks for an unsupported port layout
    #[error("{0}")]
    Conflict(String),

    /// The batch failed validation before anything was created
    #[error("{0}")]
    Validation(String),

    /// Configuration error while building the adapter
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other failure, including backend transport errors
    #[error("{0}")]
    Internal(String),
}

/// Machine-checkable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::Conflict`]
    Conflict,
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::Internal`] and [`Error::Config`]
    Internal,
}

impl ErrorKind {
    /// HTTP status code the boundary reports for this kind
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Validation => 422,
            ErrorKind::Internal => 500,
        }
    }

    /// Short identifier used in error response bodies
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Config(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Human-readable message without any kind prefix
    pub fn message(&self) -> &str {
        match self {
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Validation(msg)
            | Error::Config(msg)
            | Error::Internal(msg) => msg,
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(msg) => Error::NotFound(msg),
            BackendError::AlreadyExists(msg) => Error::Conflict(msg),
            BackendError::Other(msg) => Error::Internal(msg),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_translate_to_taxonomy() {
        let not_found: Error = BackendError::NotFound("replicationcontrollers \"web\" not found".into()).into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(not_found.message(), "replicationcontrollers \"web\" not found");

        let exists: Error = BackendError::AlreadyExists("already exists".into()).into();
        assert_eq!(exists.kind(), ErrorKind::Conflict);
        assert_eq!(exists.status_code(), 409);

        let other: Error = BackendError::Other("connection refused".into()).into();
        assert_eq!(other, Error::Internal("connection refused".to_string()));
        assert_eq!(other.status_code(), 500);
    }

    #[test]
    fn test_message_is_verbatim() {
        let err = Error::Internal("test error".to_string());
        assert_eq!(err.to_string(), "test error");
        assert_eq!(err.message(), "test error");
    }

    #[test]
    fn test_config_errors_are_internal() {
        let err = Error::Config("bad endpoint".to_string());
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "configuration error: bad endpoint");
    }

    #[test]
    fn test_malformed_json_is_internal() {
        let parse: std::result::Result<Vec<u8>, _> = serde_json::from_str("{not json");
        let err: Error = parse.unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
