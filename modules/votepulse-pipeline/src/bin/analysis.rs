use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use votepulse_common::Config;
use votepulse_pipeline::analysis::AnalysisWorker;
use votepulse_store::{DocumentStore, RedisQueue};
use votepulse_worker::queue_loop::QueueConsumer;
use votepulse_worker::worker::WorkerRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("votepulse=info".parse()?))
        .init();

    info!("VotePulse analysis worker starting...");

    let config = Config::from_env();

    let queue = Arc::new(RedisQueue::connect(&config.redis_url).await?);
    let store = Arc::new(DocumentStore::connect(&config.database_url).await?);
    store.ensure_schema().await?;

    let worker = Arc::new(AnalysisWorker::new(queue.clone(), store.clone()));
    let consumer = Arc::new(QueueConsumer::new(worker, queue));

    let runtime = WorkerRuntime::new(store.clone(), store);
    runtime.run(consumer).await
}
