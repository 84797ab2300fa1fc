//! Custom test assertions for integration tests

use axum::response::Response;
use serde_json::Value;
use std::time::Duration;

/// Read a progress stream to its end and decode every `data:` payload
pub async fn collect_sse_events(response: Response) -> Vec<Value> {
    let body = tokio::time::timeout(
        Duration::from_secs(15),
        axum::body::to_bytes(response.into_body(), usize::MAX),
    )
    .await
    .expect("progress stream did not close")
    .unwrap();

    String::from_utf8(body.to_vec())
        .unwrap()
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

/// Decode a JSON response body
pub async fn json_of(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Assert the statuses in `events` never move backwards
pub fn assert_monotonic(events: &[Value]) {
    let order = ["queued", "starting", "downloading", "finished", "error"];
    let rank = |s: &str| {
        let pos = order.iter().position(|x| *x == s).unwrap();
        pos.min(3)
    };
    let ranks: Vec<usize> = events
        .iter()
        .map(|e| rank(e["status"].as_str().unwrap()))
        .collect();
    assert!(
        ranks.windows(2).all(|w| w[0] <= w[1]),
        "status regressed: {events:?}"
    );
}
