//! Core types for clipfetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier for one download job
///
/// Generated at job creation and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a fresh random SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID value
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Job status
///
/// Transitions only move forward: `queued → starting → downloading → {finished | error}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Accepted, worker not yet running
    Queued,
    /// Worker is invoking the engine
    Starting,
    /// Engine is transferring media
    Downloading,
    /// Artifact is ready for retrieval
    Finished,
    /// Job failed
    Error,
    /// No record exists for the requested id (never stored)
    Unknown,
}

impl Status {
    /// Position in the forward-only lifecycle
    ///
    /// `Finished` and `Error` share the last rank. `Unknown` is outside the lifecycle.
    pub fn rank(self) -> Option<u8> {
        match self {
            Status::Queued => Some(0),
            Status::Starting => Some(1),
            Status::Downloading => Some(2),
            Status::Finished | Status::Error => Some(3),
            Status::Unknown => None,
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::Error)
    }

    /// Lowercase wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Queued => "queued",
            Status::Starting => "starting",
            Status::Downloading => "downloading",
            Status::Finished => "finished",
            Status::Error => "error",
            Status::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress and result state of one job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobRecord {
    /// Job identifier
    pub id: SessionId,
    /// Current lifecycle status
    pub status: Status,
    /// Bytes transferred so far
    pub downloaded_bytes: u64,
    /// Expected size in bytes (0 while unknown)
    pub total_bytes: u64,
    /// Transfer rate in bytes per second
    pub speed: f64,
    /// Base name of the produced artifact (only once finished)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Failure message (only once failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was created
    pub created_at: DateTime<Utc>,
    /// When the record last changed
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// A fresh `queued` record with zeroed counters
    pub fn queued(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: Status::Queued,
            downloaded_bytes: 0,
            total_bytes: 0,
            speed: 0.0,
            filename: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update merged into a [`JobRecord`]
///
/// Fields left as `None` keep their current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobUpdate {
    /// New status
    pub status: Option<Status>,
    /// New downloaded byte count
    pub downloaded_bytes: Option<u64>,
    /// New total byte count
    pub total_bytes: Option<u64>,
    /// New transfer rate
    pub speed: Option<f64>,
    /// Artifact base name
    pub filename: Option<String>,
    /// Failure message
    pub error: Option<String>,
}

impl JobUpdate {
    /// Update that only changes the status
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Set byte counters and speed
    pub fn with_progress(mut self, downloaded_bytes: u64, total_bytes: u64, speed: f64) -> Self {
        self.downloaded_bytes = Some(downloaded_bytes);
        self.total_bytes = Some(total_bytes);
        self.speed = Some(speed);
        self
    }

    /// Terminal success update
    pub fn finished(filename: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Finished),
            speed: Some(0.0),
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Terminal failure update
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Error),
            speed: Some(0.0),
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// What the progress stream reports for one poll
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProgressSnapshot {
    /// The store holds a record for the id
    Known {
        /// Record copy
        #[serde(flatten)]
        record: JobRecord,
        /// Retrieval path, present once the job has finished
        #[serde(skip_serializing_if = "Option::is_none")]
        download_url: Option<String>,
    },
    /// The id was never issued or has been evicted
    Unknown {
        /// Always `unknown`
        status: Status,
    },
}

impl ProgressSnapshot {
    /// Snapshot for an id with no record
    pub fn unknown() -> Self {
        ProgressSnapshot::Unknown {
            status: Status::Unknown,
        }
    }

    /// Build from a store lookup, deriving `download_url` for finished jobs
    pub fn from_record(record: Option<JobRecord>) -> Self {
        match record {
            Some(record) => {
                let download_url = match (&record.status, &record.filename) {
                    (Status::Finished, Some(name)) if !name.is_empty() => {
                        Some(crate::utils::download_url(name))
                    }
                    _ => None,
                };
                ProgressSnapshot::Known {
                    record,
                    download_url,
                }
            }
            None => Self::unknown(),
        }
    }

    /// Reported status
    pub fn status(&self) -> Status {
        match self {
            ProgressSnapshot::Known { record, .. } => record.status,
            ProgressSnapshot::Unknown { status } => *status,
        }
    }

    /// Whether the stream should close after emitting this snapshot
    pub fn ends_stream(&self) -> bool {
        match self {
            ProgressSnapshot::Known { record, .. } => record.status.is_terminal(),
            ProgressSnapshot::Unknown { .. } => true,
        }
    }
}

/// A validated download submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Media page URL
    pub url: String,
    /// Engine format identifier chosen by the client
    pub format_id: String,
    /// Client-requested output filename
    pub filename: Option<String>,
    /// Client-supplied title used to name the artifact
    pub title: Option<String>,
}

/// Media metadata returned by `POST /api/info`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoInfo {
    /// Engine-side media identifier
    pub id: Option<String>,
    /// Media title
    pub title: Option<String>,
    /// Uploader name
    pub uploader: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// View count
    pub view_count: Option<u64>,
    /// Description text
    pub description: Option<String>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Available encodings
    pub formats: Vec<FormatInfo>,
}

/// One available encoding
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatInfo {
    /// Format identifier passed back in `POST /api/download`
    pub format_id: Option<String>,
    /// Engine description of the format
    pub format: Option<String>,
    /// Container extension
    pub ext: Option<String>,
    /// Resolution label (e.g. "1920x1080" or "1080p")
    pub resolution: Option<String>,
    /// Frames per second
    pub fps: Option<f64>,
    /// Size in bytes (exact, approximate, or 0)
    pub filesize: u64,
    /// Video codec ("none" for audio-only)
    pub vcodec: Option<String>,
    /// Audio codec ("none" for video-only)
    pub acodec: Option<String>,
}
