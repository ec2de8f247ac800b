use std::num::NonZeroUsize;

use redis::AsyncCommands;

use crate::models::job::QueueMessage;

/// Redis list used as the job queue. Producers `LPUSH`, the worker pops
/// from the right so messages come out in arrival order.
pub struct JobQueue {
    client: redis::Client,
    key: String,
}

impl JobQueue {
    pub fn new(redis_url: &str, key: impl Into<String>) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self {
            client,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Enqueue a raw job message body.
    pub async fn enqueue(&self, body: &str) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        conn.lpush::<_, _, ()>(&self.key, body)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Pop up to `max` messages. Popped messages are gone from the queue:
    /// the batch is acknowledged as soon as it is handed to the caller.
    pub async fn dequeue_batch(&self, max: usize) -> Result<Vec<QueueMessage>, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let count = NonZeroUsize::new(max).unwrap_or(NonZeroUsize::MIN);
        let bodies: Option<Vec<String>> = conn
            .rpop(&self.key, Some(count))
            .await
            .map_err(QueueError::Redis)?;

        Ok(bodies
            .unwrap_or_default()
            .into_iter()
            .map(QueueMessage::new)
            .collect())
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Get the current queue depth (pending messages).
    pub async fn queue_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.client.get_multiplexed_async_connection().await.map_err(QueueError::Redis)?;
        let depth: u64 = conn.llen(&self.key).await.map_err(QueueError::Redis)?;
        Ok(depth)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}
