//! Shared test helpers: a scripted in-process engine and downloader factories.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::engine::{EngineDownload, EngineOutcome, MediaEngine, ProgressEvent, ProgressHook};
use crate::error::{EngineError, Result};
use crate::types::{FormatInfo, JobRecord, SessionId, VideoInfo};
use crate::utils::EXT_PLACEHOLDER;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// What a [`ScriptedEngine`] download ends with
#[derive(Debug, Clone)]
pub(crate) enum ScriptedOutcome {
    /// Write a file with this extension in place of `%(ext)s`
    Produce {
        ext: String,
        sibling: Option<String>,
        report_path: bool,
    },
    /// Succeed without writing anything
    Nothing,
    /// Fail like a non-zero engine exit
    Fail(String),
}

/// Engine that replays canned progress events instead of running yt-dlp
pub(crate) struct ScriptedEngine {
    events: Vec<Value>,
    step: Duration,
    outcome: ScriptedOutcome,
    info: VideoInfo,
    downloads: Mutex<Vec<EngineDownload>>,
}

impl ScriptedEngine {
    pub(crate) fn producing(ext: &str) -> Self {
        Self::with_outcome(ScriptedOutcome::Produce {
            ext: ext.to_string(),
            sibling: None,
            report_path: true,
        })
    }

    pub(crate) fn producing_nothing() -> Self {
        Self::with_outcome(ScriptedOutcome::Nothing)
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_outcome(ScriptedOutcome::Fail(message.to_string()))
    }

    fn with_outcome(outcome: ScriptedOutcome) -> Self {
        Self {
            events: Vec::new(),
            step: Duration::ZERO,
            outcome,
            info: sample_info(),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_events(mut self, events: Vec<Value>) -> Self {
        self.events = events;
        self
    }

    /// Pause between events (and before finishing)
    pub(crate) fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Also write a sibling with another extension, as a merge step would
    pub(crate) fn with_sibling(mut self, ext: &str) -> Self {
        if let ScriptedOutcome::Produce { sibling, .. } = &mut self.outcome {
            *sibling = Some(ext.to_string());
        }
        self
    }

    pub(crate) fn without_reported_path(mut self) -> Self {
        if let ScriptedOutcome::Produce { report_path, .. } = &mut self.outcome {
            *report_path = false;
        }
        self
    }

    pub(crate) fn downloads(&self) -> Vec<EngineDownload> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn extract_info(&self, url: &str) -> Result<VideoInfo> {
        if let ScriptedOutcome::Fail(message) = &self.outcome {
            return Err(EngineError::ProcessFailed {
                code: Some(1),
                message: message.clone(),
            }
            .into());
        }
        let mut info = self.info.clone();
        info.id = Some(url.rsplit('/').next().unwrap_or(url).to_string());
        Ok(info)
    }

    async fn download(
        &self,
        request: &EngineDownload,
        hook: &dyn ProgressHook,
    ) -> Result<EngineOutcome> {
        self.downloads.lock().unwrap().push(request.clone());

        for event in &self.events {
            tokio::time::sleep(self.step).await;
            hook.on_progress(&ProgressEvent::new(event.clone()));
        }
        tokio::time::sleep(self.step).await;

        match &self.outcome {
            ScriptedOutcome::Produce {
                ext,
                sibling,
                report_path,
            } => {
                let template = request.output_template.to_string_lossy();
                let path = PathBuf::from(template.replace(EXT_PLACEHOLDER, ext));
                tokio::fs::write(&path, b"scripted media").await?;
                if let Some(sibling) = sibling {
                    tokio::fs::write(path.with_extension(sibling), b"merged media").await?;
                }
                Ok(EngineOutcome {
                    filepath: report_path.then_some(path),
                })
            }
            ScriptedOutcome::Nothing => Ok(EngineOutcome::default()),
            ScriptedOutcome::Fail(message) => Err(EngineError::ProcessFailed {
                code: Some(1),
                message: message.clone(),
            }
            .into()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub(crate) fn sample_info() -> VideoInfo {
    VideoInfo {
        id: Some("sample".into()),
        title: Some("Sample Clip".into()),
        uploader: Some("Uploader".into()),
        duration: Some(12.0),
        view_count: Some(3),
        description: None,
        thumbnail: None,
        formats: vec![FormatInfo {
            format_id: Some("18".into()),
            format: Some("18 - 640x360".into()),
            ext: Some("mp4".into()),
            resolution: Some("640x360".into()),
            fps: Some(30.0),
            filesize: 1024,
            vcodec: Some("avc1".into()),
            acodec: Some("mp4a".into()),
        }],
    }
}

/// Config rooted in a fresh temp dir (keep the dir alive for the test's duration)
pub(crate) fn test_config() -> (Config, TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.poll_interval = Duration::from_millis(20);
    config.download.session_grace = None;
    std::fs::create_dir_all(&config.download.download_dir).unwrap();
    (config, temp_dir)
}

/// Downloader backed by `engine`, with its download dir inside a temp dir
pub(crate) async fn create_test_downloader(
    engine: ScriptedEngine,
) -> (MediaDownloader, TempDir) {
    let (config, temp_dir) = test_config();
    let downloader = MediaDownloader::with_engine(config, Arc::new(engine))
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Poll until the job reaches a terminal status
pub(crate) async fn wait_for_terminal(downloader: &MediaDownloader, id: SessionId) -> JobRecord {
    for _ in 0..500 {
        match downloader.sessions().get(id) {
            Some(record) if record.status.is_terminal() => return record,
            _ => {}
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach a terminal status");
}
