//! Redis queue round trip.
//!
//! Requires a running Redis reachable at REDIS_URL
//! (default redis://127.0.0.1:6379).
//!
//! Run with: cargo test --test queue_test -- --ignored

mod fixtures;
mod helpers;

use std::sync::Arc;

use call_classifier::services::pipeline::Pipeline;
use call_classifier::services::queue::JobQueue;
use fixtures::*;
use helpers::*;
use uuid::Uuid;

fn test_queue() -> JobQueue {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    JobQueue::new(&url, format!("call_classifier:test:{}", Uuid::new_v4())).expect("Failed to initialize queue")
}

#[tokio::test]
#[ignore] // Requires Redis
async fn dequeues_in_arrival_order_up_to_batch_size() {
    let queue = test_queue();
    queue.health_check().await.expect("Redis is not reachable");

    for id in ["a", "b", "c"] {
        queue.enqueue(&job_body(id)).await.expect("Failed to enqueue");
    }
    assert_eq!(queue.queue_depth().await.unwrap(), 3);

    let first = queue.dequeue_batch(2).await.expect("Failed to dequeue");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].body, job_body("a"));
    assert_eq!(first[1].body, job_body("b"));

    let rest = queue.dequeue_batch(2).await.expect("Failed to dequeue");
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].body, job_body("c"));

    assert!(queue.dequeue_batch(2).await.unwrap().is_empty());
    assert_eq!(queue.queue_depth().await.unwrap(), 0);
}

#[tokio::test]
#[ignore] // Requires Redis
async fn popped_batch_is_consumed_even_when_messages_fail() {
    let queue = test_queue();

    queue.enqueue(&job_body("ok-1")).await.unwrap();
    queue.enqueue("garbage").await.unwrap();
    queue.enqueue(&job_body("ok-2")).await.unwrap();

    let llm = Arc::new(ScriptedLlm::always(GOOD_REPLY));
    let publisher = Arc::new(RecordingPublisher::default());
    let pipeline = Pipeline::new(llm, publisher.clone());

    let batch = queue.dequeue_batch(10).await.unwrap();
    let report = pipeline.process_batch(&batch).await;

    assert_eq!(report.received, 3);
    assert_eq!(report.published, 2);
    assert_eq!(report.failed, 1);
    // Failures are not re-queued.
    assert_eq!(queue.queue_depth().await.unwrap(), 0);
    assert_eq!(publisher.published().len(), 2);
}
