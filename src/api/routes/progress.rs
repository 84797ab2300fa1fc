//! Live job progress over server-sent events.

use super::ProgressQuery;
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{ProgressSnapshot, SessionId};
use axum::{
    extract::{Query, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::convert::Infallible;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Poll {
    First,
    Again,
    Done,
}

/// GET /api/progress - Stream one job's progress
///
/// Emits the job's record as a `data:` event on every poll until the job finishes or
/// fails; that last snapshot is emitted and the stream closes. An unknown session
/// yields a single `{"status":"unknown"}` event.
#[utoipa::path(
    get,
    path = "/api/progress",
    tag = "media",
    params(
        ("session" = String, Query, description = "Session id returned by POST /api/download")
    ),
    responses(
        (status = 200, description = "Progress snapshots (text/event-stream)", content_type = "text/event-stream"),
        (status = 400, description = "Missing session parameter", body = crate::error::ApiError)
    )
)]
pub async fn progress_stream(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<SseEvent, Infallible>>>> {
    let session = query
        .session
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Validation("Missing session".to_string()))?;

    // Ids that do not parse can never have a record.
    let id = session.parse::<SessionId>().ok();
    let downloader = state.downloader.clone();
    let interval = state.config.download.poll_interval;

    tracing::debug!(session = %session, "progress stream opened");

    // Keeps the record out of eviction until the stream is dropped.
    let watch = id.map(|id| downloader.sessions().watch(id));

    let events = stream::unfold((Poll::First, watch), move |(poll, watch)| {
        let downloader = downloader.clone();
        async move {
            match poll {
                Poll::Done => return None,
                Poll::Again => tokio::time::sleep(interval).await,
                Poll::First => {}
            }

            let snapshot = id
                .map(|id| downloader.snapshot(id))
                .unwrap_or_else(ProgressSnapshot::unknown);
            let next = if snapshot.ends_stream() {
                Poll::Done
            } else {
                Poll::Again
            };

            match serde_json::to_string(&snapshot) {
                Ok(json) => Some((Ok(SseEvent::default().data(json)), (next, watch))),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize progress snapshot");
                    None
                }
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
