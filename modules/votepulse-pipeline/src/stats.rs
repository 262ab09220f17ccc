//! Stats stage: persist posts and bump the regional vote tallies.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;
use uuid::{uuid, Uuid};

use votepulse_common::{Post, VotePulseError};
use votepulse_store::{
    PostStore, QueueStore, STATS_QUEUE, VOTED_COUNTRIES_SET, VOTED_STATES_SET, VOTED_STATE_SET,
    VOTING_AUTHORS_SET,
};
use votepulse_worker::queue_loop::QueueWorker;

pub const STATS_WORKER_ID: Uuid = uuid!("4a52c9d1-88f3-45b2-9c41-7d2e0b6f3a11");

/// Terminal queue worker: upserts each post and increments the sorted-set
/// counters behind the public stats endpoint.
pub struct StatsWorker {
    queue: Arc<dyn QueueStore>,
    posts: Arc<dyn PostStore>,
}

impl StatsWorker {
    pub fn new(queue: Arc<dyn QueueStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { queue, posts }
    }

    async fn handle(&self, payload: &str) -> Result<()> {
        let post: Post = serde_json::from_str(payload)
            .map_err(|e| VotePulseError::Parse(format!("malformed post: {e}")))?;

        // Idempotent by post id: a replayed message rewrites the same
        // document rather than duplicating it.
        self.posts.upsert(&post).await?;

        self.bump(VOTED_STATES_SET, &post.location_attributes.state_code)
            .await;
        self.bump(VOTED_STATE_SET, &post.location_attributes.state)
            .await;
        self.bump(VOTED_COUNTRIES_SET, &post.location_attributes.country)
            .await;
        self.bump(VOTING_AUTHORS_SET, &post.author).await;
        Ok(())
    }

    /// Fire-and-forget counter bump; empty members are never counted.
    async fn bump(&self, set: &str, member: &str) {
        if member.is_empty() {
            return;
        }
        if let Err(e) = self.queue.increment_score(set, member, 1).await {
            warn!(error = %e, set, member, "Counter increment failed");
        }
    }
}

#[async_trait]
impl QueueWorker for StatsWorker {
    fn id(&self) -> Uuid {
        STATS_WORKER_ID
    }

    fn name(&self) -> &str {
        "Stats Queue"
    }

    fn queue_name(&self) -> &str {
        STATS_QUEUE
    }

    async fn parse(&self, payload: String) {
        if let Err(e) = self.handle(&payload).await {
            warn!(error = %e, "Dropping unpersistable post");
        }
    }
}
