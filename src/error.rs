//! Error types for clipfetch
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Engine, Session)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::{SessionId, Status};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for clipfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for clipfetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Invalid client input (missing URL, missing format, malformed body)
    #[error("{0}")]
    Validation(String),

    /// Extraction/download engine failure
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Session store rejected an operation
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors reported by the extraction/download engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be started
    #[error("failed to start {binary}: {reason}")]
    SpawnFailed {
        /// The binary that was executed
        binary: String,
        /// Why it could not be started
        reason: String,
    },

    /// The engine process exited unsuccessfully
    #[error("{message}")]
    ProcessFailed {
        /// Process exit code, if the process exited normally
        code: Option<i32>,
        /// Last diagnostic line printed by the engine
        message: String,
    },

    /// The engine produced output that could not be decoded
    #[error("invalid engine output: {0}")]
    InvalidOutput(String),
}

/// Rejections returned by the session store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No record exists for the session id
    #[error("session {id} not found")]
    NotFound {
        /// The session id that was not found
        id: SessionId,
    },

    /// A record with this id already exists
    #[error("session {id} already exists")]
    AlreadyExists {
        /// The duplicate session id
        id: SessionId,
    },

    /// The record is finished or failed and can no longer change
    #[error("session {id} is already {status}")]
    Terminal {
        /// The session id
        id: SessionId,
        /// The terminal status the record holds
        status: Status,
    },

    /// The update would move the status backwards
    #[error("session {id} cannot move from {from} to {to}")]
    Regression {
        /// The session id
        id: SessionId,
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },

    /// A field was set that the resulting status does not allow
    #[error("session {id}: field {field} is not allowed in status {status}")]
    FieldNotAllowed {
        /// The session id
        id: SessionId,
        /// The offending field name
        field: &'static str,
        /// Status the record would have after the update
        status: Status,
    },
}

/// API error response format
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "Missing url or format_id"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,
            Error::Session(SessionError::NotFound { .. }) => 404,

            // 409 Conflict - record state forbids the change
            Error::Session(_) => 409,

            // 502 Bad Gateway - the engine failed on the upstream site
            Error::Engine(EngineError::ProcessFailed { .. }) => 502,
            Error::Engine(EngineError::InvalidOutput(_)) => 502,

            // 503 Service Unavailable - engine could not be started
            Error::Engine(EngineError::SpawnFailed { .. }) => 503,

            // 501 Not Implemented
            Error::NotSupported(_) => 501,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Engine(e) => match e {
                EngineError::SpawnFailed { .. } => "engine_unavailable",
                EngineError::ProcessFailed { .. } => "engine_failed",
                EngineError::InvalidOutput(_) => "engine_invalid_output",
            },
            Error::Session(e) => match e {
                SessionError::NotFound { .. } => "session_not_found",
                SessionError::AlreadyExists { .. } => "session_exists",
                SessionError::Terminal { .. } => "session_terminal",
                SessionError::Regression { .. } => "status_regression",
                SessionError::FieldNotAllowed { .. } => "field_not_allowed",
            },
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Engine(EngineError::ProcessFailed { code: Some(exit), .. }) => {
                Some(serde_json::json!({ "exit_code": exit }))
            }
            Error::Session(SessionError::Terminal { id, status }) => Some(serde_json::json!({
                "session_id": id,
                "status": status,
            })),
            Error::Session(SessionError::NotFound { id }) => Some(serde_json::json!({
                "session_id": id,
            })),
            _ => None,
        };

        let mut api_error = ApiError::new(code, message);
        api_error.error.details = details;
        api_error
    }
}
