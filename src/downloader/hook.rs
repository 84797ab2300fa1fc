//! Translation of engine progress callbacks into session updates

use crate::engine::{ProgressEvent, ProgressHook};
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::types::{JobUpdate, SessionId, Status};
use crate::utils::base_name;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, trace, warn};

/// Progress hook bound to one job
///
/// Writes `downloading` counters into the [`SessionStore`]. The engine's provisional
/// "finished" event (raw stream done, merge still pending) is not recorded as
/// `finished`: its counters are merged as `downloading` and the reported file name is
/// kept as [`candidate`](Self::candidate) for the worker. Only the worker writes the
/// terminal status.
#[derive(Debug)]
pub struct ProgressHookAdapter {
    id: SessionId,
    sessions: SessionStore,
    candidate: Mutex<Option<String>>,
}

impl ProgressHookAdapter {
    /// Create an adapter writing to `sessions` under `id`
    pub fn new(id: SessionId, sessions: SessionStore) -> Self {
        Self {
            id,
            sessions,
            candidate: Mutex::new(None),
        }
    }

    /// Base name reported by the last provisional "finished" event, if any
    pub fn candidate(&self) -> Option<String> {
        self.candidate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn handle(&self, event: &ProgressEvent) -> Result<()> {
        if !event.as_value().is_object() {
            return Err(Error::Other(format!(
                "progress payload is not an object: {}",
                event.as_value()
            )));
        }

        match event.status() {
            Some("downloading") => {
                let downloaded = counter(event, &["downloaded_bytes", "downloaded"])?.unwrap_or(0);
                let total = counter(event, &["total_bytes", "total_bytes_estimate"])?.unwrap_or(0);
                let speed = rate(event, "speed")?.unwrap_or(0.0);

                self.sessions.update(
                    self.id,
                    JobUpdate::status(Status::Downloading).with_progress(downloaded, total, speed),
                )?;
            }
            Some("finished") => {
                // A completed raw stream reads as fully downloaded.
                let update = JobUpdate {
                    status: Some(Status::Downloading),
                    downloaded_bytes: counter(
                        event,
                        &["total_bytes", "downloaded_bytes", "downloaded"],
                    )?,
                    total_bytes: counter(event, &["total_bytes", "total_bytes_estimate"])?,
                    speed: Some(0.0),
                    ..Default::default()
                };
                self.sessions.update(self.id, update)?;

                if let Some(name) = candidate_name(event) {
                    debug!(session_id = %self.id, candidate = %name, "engine finished raw download");
                    *self.candidate.lock().unwrap_or_else(PoisonError::into_inner) = Some(name);
                }
            }
            other => {
                trace!(session_id = %self.id, status = ?other, "ignoring progress event");
            }
        }

        Ok(())
    }
}

impl ProgressHook for ProgressHookAdapter {
    fn on_progress(&self, event: &ProgressEvent) {
        let Err(e) = self.handle(event) else {
            return;
        };

        warn!(session_id = %self.id, error = %e, "failed to handle progress event");
        if let Err(store_err) = self.sessions.update(self.id, JobUpdate::failed(e.to_string())) {
            debug!(session_id = %self.id, error = %store_err, "could not record progress failure");
        }
    }
}

/// First non-null counter among `keys`, as a byte count
///
/// Negative values are clamped to zero. Non-numeric values are an error.
fn counter(event: &ProgressEvent, keys: &[&str]) -> Result<Option<u64>> {
    for key in keys {
        match event.field(key) {
            None | Some(Value::Null) => continue,
            Some(value) => {
                if let Some(n) = value.as_u64() {
                    return Ok(Some(n));
                }
                return match value.as_f64() {
                    Some(n) if n.is_finite() => Ok(Some(n.max(0.0) as u64)),
                    _ => Err(Error::Other(format!("invalid {key} value: {value}"))),
                };
            }
        }
    }
    Ok(None)
}

fn rate(event: &ProgressEvent, key: &str) -> Result<Option<f64>> {
    match event.field(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_f64() {
            Some(n) if n.is_finite() => Ok(Some(n.max(0.0))),
            _ => Err(Error::Other(format!("invalid {key} value: {value}"))),
        },
    }
}

fn candidate_name(event: &ProgressEvent) -> Option<String> {
    let reported = event
        .field("filename")
        .and_then(Value::as_str)
        .or_else(|| {
            event
                .field("info_dict")
                .and_then(|info| info.get("title"))
                .and_then(Value::as_str)
        })?;

    base_name(reported.trim()).map(str::to_string)
}
