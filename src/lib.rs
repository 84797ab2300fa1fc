//! # clipfetch
//!
//! Session-tracked background video downloads with live progress streaming.
//!
//! A client submits a media URL, picks one of the formats reported by the
//! extraction engine (`yt-dlp`), and receives a session id immediately. The download
//! runs on its own task while the client follows it over a server-sent-events
//! stream; the finished file is served for a limited time and then deleted.
//!
//! ## Design Philosophy
//!
//! clipfetch is designed to be:
//! - **Library-first** - [`MediaDownloader`] plus an axum router to embed or serve
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Engine-agnostic** - The engine sits behind the [`engine::MediaEngine`] trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use clipfetch::{Config, MediaDownloader};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let downloader = Arc::new(MediaDownloader::new(config).await?);
//!
//!     // Serves /api/info, /api/download, /api/progress and /download/*
//!     downloader.spawn_api_server().await??;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Job system: worker, progress hook, cleanup
pub mod downloader;
/// Extraction/download engine
pub mod engine;
/// Error types
pub mod error;
/// Per-job progress records
pub mod session;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::MediaDownloader;
pub use error::{
    ApiError, EngineError, Error, ErrorDetail, Result, SessionError, ToHttpStatus,
};
pub use session::{SessionStore, StreamWatch};
pub use types::{
    DownloadRequest, FormatInfo, JobRecord, JobUpdate, ProgressSnapshot, SessionId, Status,
    VideoInfo,
};

/// Wait for a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            let received = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            tracing::info!(signal = received, "Received shutdown signal");
        }
        (Ok(mut only), Err(e)) | (Err(e), Ok(mut only)) => {
            tracing::warn!(error = %e, "Could only register one of SIGTERM/SIGINT");
            only.recv().await;
            tracing::info!("Received shutdown signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
