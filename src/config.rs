//! Configuration types for clipfetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Download behavior configuration (storage, retention, progress cadence)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory artifacts are written to and served from (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// How long a finished artifact stays on disk before deletion (default: 300 seconds)
    #[serde(default = "default_retention", with = "duration_serde")]
    pub retention: Duration,

    /// Container the engine merges audio and video into (default: "mp4")
    #[serde(default = "default_merge_output_format")]
    pub merge_output_format: String,

    /// Interval between progress stream polls (default: 800 milliseconds)
    #[serde(default = "default_poll_interval", with = "millis_serde")]
    pub poll_interval: Duration,

    /// Evict finished/failed session records after this long (default: 1 hour)
    ///
    /// `None` keeps every record for the life of the process.
    #[serde(default = "default_session_grace", with = "optional_duration_serde")]
    pub session_grace: Option<Duration>,

    /// Maximum length of a sanitized artifact name (default: 200)
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            retention: default_retention(),
            merge_output_format: default_merge_output_format(),
            poll_interval: default_poll_interval(),
            session_grace: default_session_grace(),
            max_filename_len: default_max_filename_len(),
        }
    }
}

/// Extraction engine (yt-dlp) configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Extra arguments appended to every yt-dlp invocation (cookies, proxy, ...)
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            extra_args: Vec::new(),
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - storage, retention, progress cadence
/// - [`engine`](EngineConfig) - yt-dlp discovery and arguments
/// - [`server`](ServerIntegrationConfig) - REST API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior
    #[serde(default)]
    pub download: DownloadConfig,

    /// Extraction engine
    #[serde(default)]
    pub engine: EngineConfig,

    /// Server integration (API)
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Check settings that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if self.download.poll_interval.is_zero() {
            return Err(Error::Config {
                message: "poll interval must be greater than zero".to_string(),
                key: Some("download.poll_interval".to_string()),
            });
        }

        if self.download.max_filename_len == 0 {
            return Err(Error::Config {
                message: "maximum filename length must be greater than zero".to_string(),
                key: Some("download.max_filename_len".to_string()),
            });
        }

        let ext = self.download.merge_output_format.as_str();
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Config {
                message: format!("invalid merge output format '{ext}'"),
                key: Some("download.merge_output_format".to_string()),
            });
        }

        Ok(())
    }

    /// Parse a JSON configuration document, then validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Server integration configuration (API)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_retention() -> Duration {
    Duration::from_secs(300)
}

fn default_merge_output_format() -> String {
    "mp4".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(800)
}

fn default_session_grace() -> Option<Duration> {
    Some(Duration::from_secs(3600))
}

fn default_max_filename_len() -> usize {
    crate::utils::MAX_FILENAME_LEN
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.download.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.download.retention, Duration::from_secs(300));
        assert_eq!(config.download.poll_interval, Duration::from_millis(800));
        assert_eq!(config.download.merge_output_format, "mp4");
        assert_eq!(config.download.max_filename_len, 200);
        assert_eq!(config.server.api.bind_address.port(), 5000);
        assert!(config.engine.search_path);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.download.retention, Duration::from_secs(300));
        assert_eq!(
            config.download.session_grace,
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn durations_parse_in_their_units() {
        let config = Config::from_json(
            r#"{
                "download": {
                    "retention": 1,
                    "poll_interval": 50,
                    "session_grace": null
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.download.retention, Duration::from_secs(1));
        assert_eq!(config.download.poll_interval, Duration::from_millis(50));
        assert_eq!(config.download.session_grace, None);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = Config::from_json(r#"{"download": {"poll_interval": 0}}"#).unwrap_err();
        match err {
            Error::Config { key, .. } => {
                assert_eq!(key.as_deref(), Some("download.poll_interval"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn merge_format_must_be_a_plain_extension() {
        let mut config = Config::default();
        config.download.merge_output_format = "../mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = Config::from_json(&json).unwrap();
        assert_eq!(parsed.download.poll_interval, config.download.poll_interval);
        assert_eq!(parsed.server.api.bind_address, config.server.api.bind_address);
    }
}
