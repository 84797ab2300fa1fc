//! Background execution of one download job

use super::cleanup::schedule_delete;
use super::hook::ProgressHookAdapter;
use crate::config::Config;
use crate::engine::{EngineDownload, MediaEngine};
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::types::{JobUpdate, SessionId, Status};
use crate::utils::{base_name, prefer_canonical_sibling};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Failure recorded when the engine reports success but no file can be found
pub(crate) const OUTPUT_MISSING: &str = "Output file not found after download.";

/// Format selector handed to the engine for a client-chosen format
pub(crate) fn format_selector(format_id: &str) -> String {
    format!("{format_id}+bestaudio/best")
}

/// Everything a worker needs to run one job
pub(crate) struct DownloadJob {
    pub(crate) id: SessionId,
    pub(crate) url: String,
    pub(crate) format_id: String,
    pub(crate) output_template: PathBuf,
}

/// Run one job to a terminal state
///
/// Never panics and never returns an error: every failure ends up as the job's
/// `error` status.
pub(crate) async fn run(
    job: DownloadJob,
    sessions: SessionStore,
    engine: Arc<dyn MediaEngine>,
    config: Arc<Config>,
) {
    let id = job.id;

    if let Err(e) = sessions.update(
        id,
        JobUpdate::status(Status::Starting).with_progress(0, 0, 0.0),
    ) {
        warn!(session_id = %id, error = %e, "could not mark job as starting");
        return;
    }

    let hook = ProgressHookAdapter::new(id, sessions.clone());

    match execute(&job, &hook, engine.as_ref(), &config).await {
        Ok(path) => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match sessions.update(id, JobUpdate::finished(filename.clone())) {
                Ok(_) => info!(session_id = %id, filename = %filename, "download finished"),
                Err(e) => warn!(session_id = %id, error = %e, "could not record finished download"),
            }

            schedule_delete(path, config.download.retention);
        }
        Err(e) => {
            warn!(session_id = %id, error = %e, "download failed");
            if let Err(store_err) = sessions.update(id, JobUpdate::failed(e.to_string())) {
                debug!(session_id = %id, error = %store_err, "could not record download failure");
            }
        }
    }
}

/// Invoke the engine and resolve the artifact it produced
async fn execute(
    job: &DownloadJob,
    hook: &ProgressHookAdapter,
    engine: &dyn MediaEngine,
    config: &Config,
) -> Result<PathBuf> {
    let request = EngineDownload {
        url: job.url.clone(),
        format: format_selector(&job.format_id),
        output_template: job.output_template.clone(),
        merge_output_format: config.download.merge_output_format.clone(),
    };

    debug!(
        session_id = %job.id,
        engine = engine.name(),
        format = %request.format,
        "invoking engine"
    );
    let outcome = engine.download(&request, hook).await?;

    let reported = outcome.filepath.or_else(|| {
        hook.candidate()
            .as_deref()
            .and_then(base_name)
            .map(|name| config.download.download_dir.join(name))
    });
    let Some(reported) = reported else {
        return Err(Error::Other(OUTPUT_MISSING.to_string()));
    };

    let resolved =
        prefer_canonical_sibling(reported, &config.download.merge_output_format).await;

    match tokio::fs::metadata(&resolved).await {
        Ok(meta) if meta.is_file() => Ok(resolved),
        _ => {
            debug!(session_id = %job.id, path = %resolved.display(), "engine output missing");
            Err(Error::Other(OUTPUT_MISSING.to_string()))
        }
    }
}
