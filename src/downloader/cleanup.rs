//! Deferred deletion of finished artifacts

use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Delete `path` once `delay` has elapsed
///
/// The task is detached: dropping the returned handle does not cancel it. Deletion
/// failures, including the file already being gone, are logged at debug level and
/// otherwise ignored.
pub fn schedule_delete(path: PathBuf, delay: Duration) -> JoinHandle<()> {
    debug!(path = %path.display(), delay_secs = delay.as_secs(), "artifact deletion scheduled");

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "expired artifact deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "expired artifact already gone");
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "failed to delete expired artifact");
            }
        }
    })
}
