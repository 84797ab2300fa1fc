//! Extraction/download engine seam
//!
//! The job system never extracts media itself. It talks to an engine through the
//! [`MediaEngine`] trait, which resolves a URL into metadata, downloads a chosen
//! format while reporting progress through a [`ProgressHook`], and reports where the
//! finished file ended up.
//!
//! - [`YtDlpEngine`]: drives an external `yt-dlp` process
//! - [`UnavailableEngine`]: stand-in when no `yt-dlp` binary can be found
//!
//! ## Usage
//!
//! ```no_run
//! use clipfetch::engine::{MediaEngine, YtDlpEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
//!
//!     let info = engine.extract_info("https://example.com/v").await?;
//!     for format in &info.formats {
//!         println!("{:?} {:?}", format.format_id, format.resolution);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod parser;
mod traits;

pub use cli::YtDlpEngine;
pub use noop::UnavailableEngine;
pub use parser::{EngineLine, OUTPUT_MARKER, PROGRESS_MARKER, parse_engine_line, parse_info_json};
pub use traits::{EngineDownload, EngineOutcome, MediaEngine, ProgressEvent, ProgressHook};
