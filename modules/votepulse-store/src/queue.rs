use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use votepulse_common::VotePulseError;

fn queue_err(e: redis::RedisError) -> VotePulseError {
    VotePulseError::Queue(e.to_string())
}

/// Blocking-queue store capability: FIFO queues plus sorted-set counters.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Append a payload to the named queue.
    async fn push(&self, queue: &str, payload: &str) -> Result<()>;

    /// Pop the next payload, waiting up to `timeout` for one to arrive.
    /// `None` means the wait elapsed with the queue still empty.
    ///
    /// The pop consumes the message atomically: each payload is delivered to
    /// exactly one popping worker.
    async fn blocking_pop(&self, queue: &str, timeout: Duration) -> Result<Option<String>>;

    /// Increment a member's score in a sorted set.
    async fn increment_score(&self, set: &str, member: &str, delta: i64) -> Result<()>;

    /// Top `count` members of a sorted set, highest score first.
    async fn top_scores(&self, set: &str, count: usize) -> Result<Vec<(String, i64)>>;
}

/// Redis-backed queue store. `ConnectionManager` reconnects on failure, so a
/// dropped connection surfaces as a retryable error rather than a dead handle.
#[derive(Clone)]
pub struct RedisQueue {
    manager: ConnectionManager,
}

impl RedisQueue {
    /// Connect to Redis. Explicit sequential setup: returns a ready handle
    /// or an error, nothing event-driven.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(queue_err)?;
        let manager = client.get_connection_manager().await.map_err(queue_err)?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl QueueStore for RedisQueue {
    async fn push(&self, queue: &str, payload: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.rpush::<_, _, ()>(queue, payload)
            .await
            .map_err(queue_err)?;
        Ok(())
    }

    async fn blocking_pop(&self, queue: &str, timeout: Duration) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        // BLPOP returns (queue, payload), or nil on timeout.
        let reply: Option<(String, String)> = conn
            .blpop(queue, timeout.as_secs_f64())
            .await
            .map_err(queue_err)?;
        Ok(reply.map(|(_, payload)| payload))
    }

    async fn increment_score(&self, set: &str, member: &str, delta: i64) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.zincr::<_, _, _, ()>(set, member, delta)
            .await
            .map_err(queue_err)?;
        Ok(())
    }

    async fn top_scores(&self, set: &str, count: usize) -> Result<Vec<(String, i64)>> {
        let mut conn = self.manager.clone();
        let entries: Vec<(String, i64)> = conn
            .zrevrange_withscores(set, 0, count.saturating_sub(1) as isize)
            .await
            .map_err(queue_err)?;
        Ok(entries)
    }
}
