//! Test configuration helpers for creating downloaders around the fake engine

use super::fixtures::install_fake_ytdlp;
use clipfetch::{Config, MediaDownloader};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Config pointing at a fake yt-dlp inside `temp_dir`
pub fn fake_engine_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.poll_interval = Duration::from_millis(25);
    config.download.session_grace = None;
    config.engine.ytdlp_path = Some(install_fake_ytdlp(temp_dir.path()));
    config.engine.search_path = false;
    config
}

/// Downloader driving the fake yt-dlp; keep the TempDir alive for the test
pub async fn create_fake_engine_downloader() -> (Arc<MediaDownloader>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = fake_engine_config(&temp_dir);
    let downloader = MediaDownloader::new(config).await.unwrap();
    (Arc::new(downloader), temp_dir)
}
