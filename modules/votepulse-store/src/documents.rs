use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use votepulse_common::{Post, WorkerInfo};

/// Shared worker registry: liveness records keyed by worker id.
#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    async fn upsert_liveness(&self, info: &WorkerInfo) -> Result<()>;
}

/// Per-worker configuration documents keyed by worker id.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Value>>;
    async fn save(&self, id: Uuid, doc: &Value) -> Result<()>;
}

/// Terminal persistence for parsed posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn upsert(&self, post: &Post) -> Result<()>;
}
