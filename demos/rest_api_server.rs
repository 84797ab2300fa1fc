//! REST API server example
//!
//! Runs clipfetch with its HTTP surface enabled. Pass a JSON config file as the first
//! argument to override the defaults; set `RUST_LOG` to adjust logging.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:5000/swagger-ui
//! - Look up formats via POST http://localhost:5000/api/info
//! - Start a job via POST http://localhost:5000/api/download
//! - Follow it via GET http://localhost:5000/api/progress?session=<id>

use clipfetch::{Config, MediaDownloader};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,clipfetch=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_json(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let addr = config.server.api.bind_address;

    let downloader = Arc::new(MediaDownloader::new(config).await?);

    println!("Starting clipfetch REST API server (engine: {})", downloader.engine_name());
    println!("Swagger UI: http://{addr}/swagger-ui");
    println!();
    println!("Example commands:");
    println!("  # List formats");
    println!("  curl -X POST http://{addr}/api/info \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"url\": \"https://www.youtube.com/watch?v=dQw4w9WgXcQ\"}}'");
    println!();
    println!("  # Start a download");
    println!("  curl -X POST http://{addr}/api/download \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"url\": \"https://www.youtube.com/watch?v=dQw4w9WgXcQ\", \"format_id\": \"18\"}}'"
    );
    println!();
    println!("  # Follow progress");
    println!("  curl -N 'http://{addr}/api/progress?session=<session_id>'");

    downloader.spawn_api_server().await??;

    Ok(())
}
