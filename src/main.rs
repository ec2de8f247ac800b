use axum::{routing::get, Router};
use call_classifier::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{
        llm::OpenAiClient, pipeline::Pipeline, queue::JobQueue, webhook::WebhookClient,
    },
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting call classification worker");

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    if config.model_openai.is_none() {
        tracing::warn!("MODEL_OPENAI is not set; every message will fail until it is configured");
    }
    if config.webhook_url.is_none() {
        tracing::warn!("WEBHOOK_URL is not set; every message will fail until it is configured");
    }

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("classifier_messages_total", "Queue messages received");
    metrics::describe_counter!(
        "classifier_messages_published",
        "Messages whose result was delivered to the webhook"
    );
    metrics::describe_counter!(
        "classifier_messages_failed",
        "Messages dropped after a pipeline error, by stage"
    );
    metrics::describe_counter!(
        "classifier_fallbacks_total",
        "Results replaced by the fallback title/category, by reason"
    );
    metrics::describe_histogram!(
        "classifier_llm_duration_seconds",
        "Time spent waiting for the LLM completion"
    );
    metrics::describe_gauge!(
        "classifier_queue_depth",
        "Messages waiting in the Redis queue"
    );

    // Clients are built once and shared by every batch
    tracing::info!(base_url = %config.base_url, "Initializing LLM client");
    let llm = OpenAiClient::from_config(&config).expect("Failed to initialize LLM client");
    let webhook = WebhookClient::from_config(&config).expect("Failed to initialize webhook client");
    let pipeline = Pipeline::new(Arc::new(llm), Arc::new(webhook));

    tracing::info!(queue_key = %config.queue_key, "Connecting to Redis job queue");
    let queue = JobQueue::new(&config.redis_url, config.queue_key.clone())
        .expect("Failed to initialize job queue");

    let state = AppState::new(pipeline, queue);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .with_state(state.clone())
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Health and metrics listening on {}", config.bind_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server stopped");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received, finishing current batch");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        batch_size = config.batch_size,
        "Worker ready, starting queue consumption loop"
    );

    run_worker(&state, &config, shutdown_rx).await;

    tracing::info!("Worker stopped");
}

/// Pop and process batches until shutdown is requested.
async fn run_worker(state: &AppState, config: &AppConfig, mut shutdown: watch::Receiver<bool>) {
    let idle = Duration::from_millis(config.poll_interval_ms);

    while !*shutdown.borrow() {
        match state.queue.dequeue_batch(config.batch_size).await {
            Ok(batch) if batch.is_empty() => {
                tracing::trace!("No messages available, sleeping");
                wait_or_shutdown(idle, &mut shutdown).await;
            }
            Ok(batch) => {
                tracing::debug!(size = batch.len(), "Batch received");
                state.pipeline.process_batch(&batch).await;

                if let Ok(depth) = state.queue.queue_depth().await {
                    metrics::gauge!("classifier_queue_depth").set(depth as f64);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from queue, will retry");
                wait_or_shutdown(idle, &mut shutdown).await;
            }
        }
    }
}

async fn wait_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) {
    tokio::select! {
        _ = sleep(duration) => {}
        Ok(()) = shutdown.changed() => {}
    }
}
