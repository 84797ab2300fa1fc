//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the clipfetch REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the clipfetch REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "clipfetch REST API",
        version = "0.1.0",
        description = "Inspect media URLs, run background downloads and follow their progress live",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::get_info,
        crate::api::routes::start_download,
        crate::api::routes::progress_stream,

        // Files
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::SessionId,
        crate::types::Status,
        crate::types::JobRecord,
        crate::types::VideoInfo,
        crate::types::FormatInfo,

        // API request/response types from routes
        crate::api::routes::InfoRequest,
        crate::api::routes::StartDownloadRequest,
        crate::api::routes::StartDownloadResponse,
        crate::api::routes::ProgressQuery,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Jobs - Inspect URLs, start downloads, stream progress"),
        (name = "files", description = "Files - Retrieve finished downloads"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
