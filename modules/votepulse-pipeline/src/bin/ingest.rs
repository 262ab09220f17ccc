use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use votepulse_common::Config;
use votepulse_pipeline::ingest::{IngestWorker, JsonLinesStream};
use votepulse_store::{DocumentStore, RedisQueue};
use votepulse_worker::worker::WorkerRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("votepulse=info".parse()?))
        .init();

    info!("VotePulse ingest worker starting...");

    let config = Config::from_env();

    let queue = Arc::new(RedisQueue::connect(&config.redis_url).await?);
    let store = Arc::new(DocumentStore::connect(&config.database_url).await?);
    store.ensure_schema().await?;

    // The stream client runs as a separate process and pipes one JSON
    // status per line into stdin.
    let source_name =
        std::env::var("STREAM_NAME").unwrap_or_else(|_| "Twitter Filter".to_string());
    let source_uri = std::env::var("STREAM_URI")
        .unwrap_or_else(|_| "https://stream.twitter.com/1/statuses/filter.json".to_string());
    let stream = JsonLinesStream::new(source_name, source_uri, BufReader::new(tokio::io::stdin()));

    let worker = Arc::new(IngestWorker::new(Box::new(stream), queue));

    let runtime = WorkerRuntime::new(store.clone(), store);
    runtime.run(worker).await
}
