//! Utility functions for artifact naming and path handling

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default maximum length of a sanitized filename
pub const MAX_FILENAME_LEN: usize = 200;

/// Name used when nothing usable remains after sanitation
const FALLBACK_NAME: &str = "video";

/// Engine placeholder for the container extension
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

#[allow(clippy::expect_used)]
static DISALLOWED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ._\-()\[\]]+").expect("valid pattern"));

#[allow(clippy::expect_used)]
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid pattern"));

/// Reduce a user- or site-supplied name to a safe filename
///
/// Every run of characters outside `A-Z a-z 0-9 space . _ - ( ) [ ]` becomes a single
/// underscore, so path separators and control characters never survive. The result is
/// trimmed and truncated to `max_len` characters.
///
/// # Examples
///
/// ```
/// use clipfetch::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b\\c:d", 200), "a_b_c_d");
/// assert_eq!(sanitize_filename("", 200), "video");
/// ```
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    if name.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let without_nul = name.replace('\0', "");
    let replaced = DISALLOWED_RUN.replace_all(&without_nul, "_");
    let collapsed = UNDERSCORE_RUN.replace_all(&replaced, "_");
    let truncated: String = collapsed.trim().chars().take(max_len).collect();
    let truncated = truncated.trim_end().to_string();

    if truncated.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        truncated
    }
}

/// Last path component of `name`, treating both `/` and `\` as separators
///
/// Returns `None` for empty names and for the `.`/`..` directory entries.
pub fn base_name(name: &str) -> Option<&str> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match last {
        "" | "." | ".." => None,
        other => Some(other),
    }
}

/// Retrieval path for a finished artifact
pub fn download_url(filename: &str) -> String {
    format!("/download/{}", urlencoding::encode(filename))
}

/// Build the engine output template for a job
///
/// A client filename wins over a title. A filename that already carries an extension
/// is used verbatim; otherwise the engine chooses the extension.
pub fn output_template(
    download_dir: &Path,
    filename: Option<&str>,
    title: Option<&str>,
    max_len: usize,
) -> PathBuf {
    let requested = filename.and_then(base_name).filter(|n| !n.trim().is_empty());

    let name = match requested {
        Some(requested) => {
            let safe = sanitize_filename(requested, max_len);
            if has_extension(&safe) {
                safe
            } else {
                format!("{safe}.{EXT_PLACEHOLDER}")
            }
        }
        None => {
            let base = match title.filter(|t| !t.trim().is_empty()) {
                Some(title) => sanitize_filename(title, max_len),
                None => {
                    let token = uuid::Uuid::new_v4().simple().to_string();
                    format!("video_{}", &token[..8])
                }
            };
            format!("{base}.{EXT_PLACEHOLDER}")
        }
    };

    download_dir.join(name)
}

fn has_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| !ext.is_empty())
}

/// If `path` does not already use `canonical_ext`, return the sibling with that
/// extension when it exists on disk
///
/// The engine may pick a different container while muxing audio and video.
pub async fn prefer_canonical_sibling(path: PathBuf, canonical_ext: &str) -> PathBuf {
    let already_canonical = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(canonical_ext));
    if already_canonical {
        return path;
    }

    let sibling = path.with_extension(canonical_ext);
    match tokio::fs::try_exists(&sibling).await {
        Ok(true) => sibling,
        _ => path,
    }
}
