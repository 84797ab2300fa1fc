//! Core job system split into focused submodules.
//!
//! The `MediaDownloader` facade ties the pieces together:
//! - [`hook`] - Engine progress callbacks to session updates
//! - [`worker`] - Background execution of one job
//! - [`cleanup`] - Deferred deletion of finished artifacts
//! - [`sweeper`] - Eviction of expired session records

mod cleanup;
mod hook;
mod sweeper;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use cleanup::schedule_delete;
pub use hook::ProgressHookAdapter;

use crate::config::Config;
use crate::engine::{MediaEngine, UnavailableEngine, YtDlpEngine};
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::types::{DownloadRequest, ProgressSnapshot, SessionId, VideoInfo};
use crate::utils::{base_name, output_template};
use std::path::PathBuf;
use std::sync::Arc;
use worker::DownloadJob;

/// Main downloader instance (cloneable - all fields are Arc-backed)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Progress records of every job
    pub(crate) sessions: SessionStore,
    /// Extraction/download engine (trait object for pluggable implementations)
    pub(crate) engine: Arc<dyn MediaEngine>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl std::fmt::Debug for MediaDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaDownloader")
            .field("engine", &self.engine.name())
            .field("sessions", &self.sessions.len())
            .field("download_dir", &self.config.download.download_dir)
            .finish()
    }
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the download directory
    /// - Picks the engine: the configured yt-dlp path, else yt-dlp from PATH, else
    ///   an engine that rejects every request
    /// - Starts the session sweeper if a grace period is configured
    pub async fn new(config: Config) -> Result<Self> {
        let engine: Arc<dyn MediaEngine> = match YtDlpEngine::from_config(&config.engine) {
            Some(engine) => {
                tracing::info!(binary = %engine.binary_path().display(), "using yt-dlp engine");
                Arc::new(engine)
            }
            None => {
                tracing::warn!("yt-dlp not found; info and download requests will be rejected");
                Arc::new(UnavailableEngine)
            }
        };

        Self::with_engine(config, engine).await
    }

    /// Create a MediaDownloader that drives the given engine
    pub async fn with_engine(config: Config, engine: Arc<dyn MediaEngine>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let downloader = Self {
            sessions: SessionStore::new(),
            engine,
            config: Arc::new(config),
        };
        downloader.start_session_sweeper();

        Ok(downloader)
    }

    /// Start the background task that evicts expired session records
    fn start_session_sweeper(&self) {
        match self.config.download.session_grace {
            Some(grace) => {
                sweeper::spawn_sweeper(self.sessions.clone(), grace);
                tracing::info!(grace_secs = grace.as_secs(), "session sweeper started");
            }
            None => {
                tracing::info!("No session grace period configured, skipping session sweeper");
            }
        }
    }

    /// Fetch metadata and available formats for `url`
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a missing or malformed URL, otherwise whatever the
    /// engine reports.
    pub async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let url = validate_url(url)?;
        tracing::debug!(url = %url, engine = self.engine.name(), "fetching info");
        self.engine.extract_info(url.as_str()).await
    }

    /// Accept a download job and start it in the background
    ///
    /// Returns as soon as the job's record exists; the worker runs on its own task.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when `url` or `format_id` is missing or the URL is
    /// malformed. No session is created in that case.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clipfetch::{Config, DownloadRequest, MediaDownloader};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = MediaDownloader::new(Config::default()).await?;
    /// let id = downloader
    ///     .start_download(DownloadRequest {
    ///         url: "https://example.com/watch?v=abc".into(),
    ///         format_id: "137".into(),
    ///         filename: None,
    ///         title: Some("My clip".into()),
    ///     })
    ///     .await?;
    /// println!("progress: /api/progress?session={id}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_download(&self, request: DownloadRequest) -> Result<SessionId> {
        let format_id = request.format_id.trim();
        if request.url.trim().is_empty() || format_id.is_empty() {
            return Err(Error::Validation("Missing url or format_id".to_string()));
        }
        let url = validate_url(&request.url)?;

        let id = SessionId::new();
        self.sessions.create(id)?;

        let template = output_template(
            &self.config.download.download_dir,
            request.filename.as_deref(),
            request.title.as_deref(),
            self.config.download.max_filename_len,
        );

        tracing::info!(
            session_id = %id,
            url = %url,
            format_id,
            template = %template.display(),
            "download accepted"
        );

        let job = DownloadJob {
            id,
            url: url.to_string(),
            format_id: format_id.to_string(),
            output_template: template,
        };
        tokio::spawn(worker::run(
            job,
            self.sessions.clone(),
            self.engine.clone(),
            self.config.clone(),
        ));

        Ok(id)
    }

    /// Current progress of a job (`unknown` when the id has no record)
    pub fn snapshot(&self, id: SessionId) -> ProgressSnapshot {
        self.sessions.snapshot(id)
    }

    /// The session store backing this downloader
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the engine in use ("yt-dlp", "unavailable", ...)
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Path of a finished artifact inside the download directory
    ///
    /// Directory components in `name` are discarded, so the result never leaves the
    /// download directory. Returns `None` when nothing of the name remains.
    pub fn artifact_path(&self, name: &str) -> Option<PathBuf> {
        base_name(name).map(|base| self.config.download.download_dir.join(base))
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on the configured bind address (default: 127.0.0.1:5000)
    /// until a termination signal arrives.
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}

fn validate_url(raw: &str) -> Result<url::Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Validation("Missing url".to_string()));
    }

    let parsed =
        url::Url::parse(raw).map_err(|e| Error::Validation(format!("Invalid url '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(Error::Validation(format!(
            "Unsupported url scheme '{scheme}'"
        ))),
    }
}
