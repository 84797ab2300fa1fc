//! Engine used when yt-dlp is unavailable

use super::traits::{EngineDownload, EngineOutcome, MediaEngine, ProgressHook};
use crate::types::VideoInfo;
use async_trait::async_trait;

/// Engine that rejects every request with `Error::NotSupported`
///
/// Selected when no yt-dlp binary is configured or found in PATH, so the server can
/// still start, answer health checks and serve files that are already on disk.
///
/// # Examples
///
/// ```
/// use clipfetch::engine::{MediaEngine, UnavailableEngine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = UnavailableEngine;
/// assert!(engine.extract_info("https://example.com/v").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

const UNAVAILABLE: &str = "media extraction requires the external yt-dlp binary. \
                           Configure engine.ytdlp_path or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaEngine for UnavailableEngine {
    async fn extract_info(&self, _url: &str) -> crate::Result<VideoInfo> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    async fn download(
        &self,
        _request: &EngineDownload,
        _hook: &dyn ProgressHook,
    ) -> crate::Result<EngineOutcome> {
        Err(crate::Error::NotSupported(UNAVAILABLE.into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
