//! Fake yt-dlp executable for driving the real process engine

use clipfetch::engine::{OUTPUT_MARKER, PROGRESS_MARKER};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Sample metadata printed for `-J`
pub const INFO_JSON: &str = r#"{"id": "abc123", "title": "Fake Clip", "uploader": "Tester", "duration": 4.5, "view_count": 10, "formats": [{"format_id": "18", "ext": "mp4", "height": 360, "filesize_approx": 2048}, {"format_id": "140", "ext": "m4a", "resolution": "audio only", "vcodec": "none", "acodec": "mp4a"}]}"#;

/// Shell script standing in for yt-dlp
///
/// Every invocation appends its arguments to `args.log` next to the script. URLs
/// containing `fail` make the script exit with status 1 after printing an `ERROR:`
/// line; otherwise a download prints marked progress on both stdout and stderr,
/// writes the file with the `mp4` extension and prints its final path.
fn script_body(args_log: &Path) -> String {
    format!(
        r#"#!/bin/sh
printf '%s\n' "$@" >> '{log}'
printf -- '---\n' >> '{log}'

template=""
url=""
info=0
while [ $# -gt 0 ]; do
  case "$1" in
    -J) info=1 ;;
    -o) shift; template="$1" ;;
    --) shift; url="$1" ;;
  esac
  shift
done

case "$url" in
  *fail*)
    echo "[generic] Extracting URL: $url" >&2
    echo "ERROR: [generic] Unsupported URL: $url" >&2
    exit 1
    ;;
esac

if [ "$info" = 1 ]; then
  printf '%s\n' '{info}'
  exit 0
fi

out=$(printf '%s' "$template" | sed 's/%(ext)s/mp4/')
echo "[youtube] abc123: Downloading webpage"
printf '%s{{"status": "downloading", "downloaded_bytes": 512, "total_bytes": 1024, "speed": 256.0}}\n' '{progress}' >&2
sleep 0.1
printf '%s{{"status": "downloading", "downloaded_bytes": 1024, "total_bytes": null, "total_bytes_estimate": 1024, "speed": 512.0}}\n' '{progress}'
printf '%s{{"status": "finished", "downloaded_bytes": 1024, "total_bytes": 1024, "filename": "%s"}}\n' '{progress}' "$out"
printf 'fake media' > "$out"
printf '%s%s\n' '{output}' "$out"
exit 0
"#,
        log = args_log.display(),
        info = INFO_JSON,
        progress = PROGRESS_MARKER,
        output = OUTPUT_MARKER,
    )
}

/// Write the fake yt-dlp into `dir` and return its path
pub fn install_fake_ytdlp(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, script_body(&dir.join("args.log"))).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Argument lists of every invocation so far
pub fn recorded_invocations(dir: &Path) -> Vec<Vec<String>> {
    let log = std::fs::read_to_string(dir.join("args.log")).unwrap_or_default();
    log.split("---\n")
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.lines().map(String::from).collect())
        .collect()
}
