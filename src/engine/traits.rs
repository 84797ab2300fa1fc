//! Traits and types for the extraction/download engine

use crate::types::VideoInfo;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// One progress callback payload emitted by the engine
///
/// The payload is the engine's own loosely-typed progress dictionary (`status`,
/// `downloaded_bytes`, `total_bytes`, `speed`, `filename`, ...). Interpreting it is
/// left to the hook.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent(Value);

impl ProgressEvent {
    /// Wrap a decoded progress payload
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `status` field ("downloading", "finished", "error", ...)
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// Look up a top-level field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The raw payload
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for ProgressEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Receiver of engine progress callbacks
///
/// Called synchronously from the task driving the engine, in the order the engine
/// emits events. The method cannot fail: an implementation must deal with its own
/// errors so that a bad event never aborts the download.
pub trait ProgressHook: Send + Sync {
    /// Handle one progress event
    fn on_progress(&self, event: &ProgressEvent);
}

/// Parameters for one engine download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDownload {
    /// Media page URL
    pub url: String,
    /// Format selector (e.g. `"137+bestaudio/best"`)
    pub format: String,
    /// Output path template (may contain the `%(ext)s` placeholder)
    pub output_template: PathBuf,
    /// Container to merge separate audio and video streams into
    pub merge_output_format: String,
}

/// What the engine reports once a download completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct EngineOutcome {
    /// Final path of the produced file, per the engine's own naming rules
    pub filepath: Option<PathBuf>,
}

/// Trait for media extraction/download engines
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Fetch metadata and the list of available formats for `url`
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be run, rejects the URL, or prints
    /// output that cannot be decoded.
    async fn extract_info(&self, url: &str) -> crate::Result<VideoInfo>;

    /// Download `request.url`, calling `hook` for every progress event
    ///
    /// Resolves once the engine has finished, including any merge step.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be run or reports failure.
    async fn download(
        &self,
        request: &EngineDownload,
        hook: &dyn ProgressHook,
    ) -> crate::Result<EngineOutcome>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
