//! yt-dlp process engine

use super::parser::{
    EngineLine, OUTPUT_MARKER, PROGRESS_MARKER, failure_message, parse_engine_line,
    parse_info_json,
};
use super::traits::{EngineDownload, EngineOutcome, MediaEngine, ProgressHook};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::types::VideoInfo;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Number of trailing stderr lines kept for failure messages
const STDERR_TAIL_LINES: usize = 20;

/// Engine backed by the external `yt-dlp` binary
///
/// # Examples
///
/// ```no_run
/// use clipfetch::engine::YtDlpEngine;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let engine = YtDlpEngine::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary_path: PathBuf,
    extra_args: Vec<String>,
}

impl YtDlpEngine {
    /// Create an engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            extra_args: Vec::new(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Build from configuration: explicit path first, then PATH search if enabled
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        let engine = match &config.ytdlp_path {
            Some(path) => Some(Self::new(path.clone())),
            None if config.search_path => Self::from_path(),
            None => None,
        };
        engine.map(|e| e.with_extra_args(config.extra_args.clone()))
    }

    /// Arguments appended to every invocation (cookies, proxy, ...)
    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    /// Path of the binary this engine runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn info_args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = ["-J", "--skip-download", "--no-playlist", "--no-warnings"]
            .into_iter()
            .map(String::from)
            .collect();
        args.extend(self.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn download_args(&self, request: &EngineDownload) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            request.format.clone(),
            "-o".to_string(),
            request.output_template.to_string_lossy().into_owned(),
            "--merge-output-format".to_string(),
            request.merge_output_format.clone(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--newline".to_string(),
            "--progress".to_string(),
            "--no-simulate".to_string(),
            "--progress-template".to_string(),
            format!("download:{PROGRESS_MARKER}%(progress)j"),
            "--print".to_string(),
            format!("after_move:{OUTPUT_MARKER}%(filepath)s"),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    fn spawn_failed(&self, e: std::io::Error) -> EngineError {
        EngineError::SpawnFailed {
            binary: self.binary_path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Forward every line of `reader` into `tx`, decoding lossily
async fn forward_lines<R>(reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send((stream, line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(?stream, error = %e, "failed to read yt-dlp output");
                break;
            }
        }
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn extract_info(&self, url: &str) -> crate::Result<VideoInfo> {
        debug!(url, binary = %self.binary_path.display(), "fetching media info");

        let output = Command::new(&self.binary_path)
            .args(self.info_args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_failed(e))?;

        if !output.status.success() {
            let stderr: Vec<String> = String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(String::from)
                .collect();
            return Err(EngineError::ProcessFailed {
                code: output.status.code(),
                message: failure_message(&stderr, "yt-dlp could not extract media info"),
            }
            .into());
        }

        Ok(parse_info_json(&output.stdout)?)
    }

    async fn download(
        &self,
        request: &EngineDownload,
        hook: &dyn ProgressHook,
    ) -> crate::Result<EngineOutcome> {
        debug!(
            url = %request.url,
            format = %request.format,
            template = %request.output_template.display(),
            "starting yt-dlp download"
        );

        let mut child = Command::new(&self.binary_path)
            .args(self.download_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_failed(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::InvalidOutput("stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::InvalidOutput("stderr was not captured".into()))?;

        // Some yt-dlp builds print progress to stdout, others to stderr.
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
        tokio::spawn(forward_lines(stderr, Stream::Stderr, tx));

        let mut filepath = None;
        let mut stderr_tail: Vec<String> = Vec::new();

        while let Some((stream, line)) = rx.recv().await {
            match parse_engine_line(&line) {
                EngineLine::Progress(event) => hook.on_progress(&event),
                EngineLine::Output(path) => {
                    debug!(path = %path.display(), "yt-dlp reported output file");
                    filepath = Some(path);
                }
                EngineLine::Malformed(reason) => {
                    warn!(%reason, "skipping undecodable progress line");
                }
                EngineLine::Other(text) => {
                    trace!(?stream, line = %text, "yt-dlp");
                    if stream == Stream::Stderr && !text.trim().is_empty() {
                        if stderr_tail.len() == STDERR_TAIL_LINES {
                            stderr_tail.remove(0);
                        }
                        stderr_tail.push(text);
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::InvalidOutput(format!("failed to wait for yt-dlp: {e}")))?;

        if !status.success() {
            return Err(EngineError::ProcessFailed {
                code: status.code(),
                message: failure_message(&stderr_tail, "yt-dlp exited unsuccessfully"),
            }
            .into());
        }

        Ok(EngineOutcome { filepath })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
