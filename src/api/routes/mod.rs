//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`media`] - Metadata lookup and job submission
//! - [`progress`] - Live job progress over server-sent events
//! - [`files`] - Finished artifact retrieval
//! - [`system`] - Health and OpenAPI

use crate::error::Error;
use crate::types::SessionId;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

mod files;
mod media;
mod progress;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use files::*;
pub use media::*;
pub use progress::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoRequest {
    /// Media page URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Request body for POST /api/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// Media page URL
    #[serde(default)]
    pub url: Option<String>,
    /// Format identifier from POST /api/info
    #[serde(default)]
    pub format_id: Option<String>,
    /// Output filename; the extension is chosen by the engine when omitted
    #[serde(default)]
    pub filename: Option<String>,
    /// Title used to name the file when no filename is given
    #[serde(default)]
    pub title: Option<String>,
}

/// Response for POST /api/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Id to pass to GET /api/progress
    pub session_id: SessionId,
}

/// Query parameters for GET /api/progress
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressQuery {
    /// Session id returned by POST /api/download
    #[serde(default)]
    pub session: Option<String>,
}

/// Unwrap a JSON body, turning malformed input into a validation error
pub(crate) fn json_body<T>(
    body: std::result::Result<axum::Json<T>, JsonRejection>,
) -> crate::Result<T> {
    match body {
        Ok(axum::Json(value)) => Ok(value),
        Err(rejection) => Err(Error::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}
