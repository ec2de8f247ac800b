//! Push job files onto the classification queue.
//!
//! Usage:
//!   cargo run --bin enqueue -- job1.json [job2.json ...]
//!
//! Reads REDIS_URL and QUEUE_KEY from the environment (or .env). Files that
//! do not decode as a job are still pushed, with a warning, so malformed
//! messages can be used to exercise the worker's error handling.

use call_classifier::{config::AppConfig, models::job::Job, services::queue::JobQueue};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        return Err("usage: enqueue <job.json>...".into());
    }

    let config = AppConfig::from_env()?;
    let queue = JobQueue::new(&config.redis_url, config.queue_key.clone())?;

    for path in &paths {
        let body = std::fs::read_to_string(path)?;

        match Job::decode(&body) {
            Ok(job) => tracing::info!(
                path = %path,
                transcription_id = %job.transcription_id,
                "Enqueueing job"
            ),
            Err(e) => tracing::warn!(
                path = %path,
                error = %e,
                "File is not a valid job, enqueueing anyway"
            ),
        }

        queue.enqueue(body.trim()).await?;
    }

    let depth = queue.queue_depth().await?;
    tracing::info!(
        queue_key = %queue.key(),
        enqueued = paths.len(),
        depth,
        "Done"
    );

    Ok(())
}
