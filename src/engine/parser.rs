//! Decoding of yt-dlp output

use super::traits::ProgressEvent;
use crate::error::EngineError;
use crate::types::{FormatInfo, VideoInfo};
use serde::Deserialize;
use std::path::PathBuf;

/// Prefix placed in front of every progress line via `--progress-template`
pub const PROGRESS_MARKER: &str = "__clipfetch_progress__ ";

/// Prefix placed in front of the final file path via `--print after_move:`
pub const OUTPUT_MARKER: &str = "__clipfetch_output__ ";

/// Classification of one line printed by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    /// A progress dictionary
    Progress(ProgressEvent),
    /// The final path of the produced file
    Output(PathBuf),
    /// A marked progress line whose payload was not valid JSON
    Malformed(String),
    /// Anything else (diagnostics, warnings, plain log output)
    Other(String),
}

/// Classify one line of engine output
pub fn parse_engine_line(line: &str) -> EngineLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(payload) = line.strip_prefix(PROGRESS_MARKER) {
        return match serde_json::from_str(payload) {
            Ok(value) => EngineLine::Progress(ProgressEvent::new(value)),
            Err(e) => EngineLine::Malformed(e.to_string()),
        };
    }

    if let Some(path) = line.strip_prefix(OUTPUT_MARKER) {
        let path = path.trim();
        if !path.is_empty() && path != "NA" {
            return EngineLine::Output(PathBuf::from(path));
        }
    }

    EngineLine::Other(line.to_string())
}

/// Pick the most useful diagnostic from the engine's stderr
///
/// Prefers the last `ERROR:` line, then the last non-empty line.
pub fn failure_message(stderr_lines: &[String], fallback: &str) -> String {
    stderr_lines
        .iter()
        .rev()
        .find(|l| l.trim_start().starts_with("ERROR:"))
        .or_else(|| stderr_lines.iter().rev().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[derive(Debug, Deserialize)]
struct InfoPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Option<Vec<FormatPayload>>,
}

#[derive(Debug, Deserialize)]
struct FormatPayload {
    #[serde(default)]
    format_id: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    fps: Option<f64>,
    #[serde(default)]
    filesize: Option<f64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
}

impl From<FormatPayload> for FormatInfo {
    fn from(f: FormatPayload) -> Self {
        let filesize = [f.filesize, f.filesize_approx]
            .into_iter()
            .flatten()
            .find(|size| *size > 0.0)
            .map(|size| size as u64)
            .unwrap_or(0);

        let resolution = f
            .resolution
            .filter(|r| !r.is_empty())
            .or_else(|| f.height.filter(|h| *h > 0.0).map(|h| format!("{}p", h as u64)));

        FormatInfo {
            format_id: f.format_id,
            format: f.format,
            ext: f.ext,
            resolution,
            fps: f.fps,
            filesize,
            vcodec: f.vcodec,
            acodec: f.acodec,
        }
    }
}

/// Parse the JSON document printed by `yt-dlp -J`
pub fn parse_info_json(stdout: &[u8]) -> Result<VideoInfo, EngineError> {
    let payload: InfoPayload = serde_json::from_slice(stdout)
        .map_err(|e| EngineError::InvalidOutput(format!("invalid metadata JSON: {e}")))?;

    Ok(VideoInfo {
        id: payload.id,
        title: payload.title,
        uploader: payload.uploader,
        duration: payload.duration,
        view_count: payload.view_count.map(|v| v as u64),
        description: payload.description,
        thumbnail: payload.thumbnail,
        formats: payload
            .formats
            .unwrap_or_default()
            .into_iter()
            .map(FormatInfo::from)
            .collect(),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_lines_decode_to_events() {
        let line = format!(
            "{PROGRESS_MARKER}{{\"status\": \"downloading\", \"downloaded_bytes\": 1024, \"total_bytes\": 4096, \"speed\": 512.5}}"
        );
        match parse_engine_line(&line) {
            EngineLine::Progress(event) => {
                assert_eq!(event.status(), Some("downloading"));
                assert_eq!(event.field("downloaded_bytes").unwrap(), 1024);
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn malformed_progress_payload_is_flagged() {
        let line = format!("{PROGRESS_MARKER}{{not json");
        assert!(matches!(parse_engine_line(&line), EngineLine::Malformed(_)));
    }

    #[test]
    fn output_line_yields_path() {
        let line = format!("{OUTPUT_MARKER}/srv/downloads/My Clip.mp4\r\n");
        assert_eq!(
            parse_engine_line(&line),
            EngineLine::Output(PathBuf::from("/srv/downloads/My Clip.mp4"))
        );
    }

    #[test]
    fn unmarked_lines_are_passed_through() {
        assert_eq!(
            parse_engine_line("[youtube] abc: Downloading webpage"),
            EngineLine::Other("[youtube] abc: Downloading webpage".to_string())
        );
        assert!(matches!(
            parse_engine_line(&format!("{OUTPUT_MARKER}NA")),
            EngineLine::Other(_)
        ));
    }

    #[test]
    fn failure_message_prefers_error_lines() {
        let lines = vec![
            "WARNING: something odd".to_string(),
            "ERROR: [generic] Unsupported URL: https://example.com/v".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            failure_message(&lines, "yt-dlp failed"),
            "ERROR: [generic] Unsupported URL: https://example.com/v"
        );
        assert_eq!(
            failure_message(&["just noise".to_string()], "yt-dlp failed"),
            "just noise"
        );
        assert_eq!(failure_message(&[], "yt-dlp failed"), "yt-dlp failed");
    }

    #[test]
    fn info_json_maps_formats_with_fallbacks() {
        let json = br#"{
            "id": "abc123",
            "title": "Sample",
            "uploader": "Someone",
            "duration": 63.5,
            "view_count": 1200,
            "description": "desc",
            "thumbnail": "https://img.example.com/t.jpg",
            "formats": [
                {"format_id": "137", "format": "137 - 1920x1080", "ext": "mp4",
                 "resolution": "1920x1080", "fps": 30, "filesize": 1000,
                 "vcodec": "avc1", "acodec": "none"},
                {"format_id": "22", "ext": "mp4", "height": 720,
                 "filesize": null, "filesize_approx": 2048.7},
                {"format_id": "140", "ext": "m4a", "resolution": "audio only",
                 "vcodec": "none", "acodec": "mp4a"}
            ]
        }"#;

        let info = parse_info_json(json).unwrap();
        assert_eq!(info.id.as_deref(), Some("abc123"));
        assert_eq!(info.view_count, Some(1200));
        assert_eq!(info.formats.len(), 3);

        assert_eq!(info.formats[0].filesize, 1000);
        assert_eq!(info.formats[0].fps, Some(30.0));
        assert_eq!(info.formats[1].resolution.as_deref(), Some("720p"));
        assert_eq!(info.formats[1].filesize, 2048);
        assert_eq!(info.formats[2].filesize, 0);
        assert_eq!(info.formats[2].resolution.as_deref(), Some("audio only"));
    }

    #[test]
    fn info_without_formats_is_accepted() {
        let info = parse_info_json(br#"{"title": "Only title"}"#).unwrap();
        assert_eq!(info.title.as_deref(), Some("Only title"));
        assert!(info.formats.is_empty());
    }

    #[test]
    fn garbage_metadata_is_an_error() {
        assert!(matches!(
            parse_info_json(b"<html>"),
            Err(EngineError::InvalidOutput(_))
        ));
    }
}
