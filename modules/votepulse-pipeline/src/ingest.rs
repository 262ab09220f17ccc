//! Ingest stage: raw stream events onto the parse queue.
//!
//! The streaming API itself is an external collaborator hidden behind
//! [`StreamSource`]; this stage wraps whatever events the source yields in a
//! provenance envelope and enqueues them verbatim for the parse workers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::{uuid, Uuid};

use votepulse_common::VotePulseError;
use votepulse_store::{QueueStore, PARSE_QUEUE};
use votepulse_worker::queue_loop::{resident_memory_bytes, ThroughputCounter};
use votepulse_worker::worker::{Worker, WorkerContext};

pub const INGEST_WORKER_ID: Uuid = uuid!("c8fe12aa-3d5f-4f6e-8a09-5b1d64c20e77");

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// A live feed of raw post events. `Ok(None)` means the stream has ended
/// and the worker should stop.
#[async_trait]
pub trait StreamSource: Send {
    /// Human-readable source label, stamped into every envelope.
    fn name(&self) -> &str;

    /// Source endpoint identifier, stamped into every envelope.
    fn uri(&self) -> &str;

    async fn next_event(&mut self) -> Result<Option<Value>>;
}

/// Worker pumping a stream source into `queue:twitter:parse`.
pub struct IngestWorker {
    source: Mutex<Box<dyn StreamSource>>,
    queue: Arc<dyn QueueStore>,
    counter: ThroughputCounter,
}

impl IngestWorker {
    pub fn new(source: Box<dyn StreamSource>, queue: Arc<dyn QueueStore>) -> Self {
        Self {
            source: Mutex::new(source),
            queue,
            counter: ThroughputCounter::new(),
        }
    }

    fn spawn_reporter(&self) -> tokio::task::JoinHandle<()> {
        let counter = self.counter.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REPORT_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                info!(
                    worker = "Twitter Filter",
                    ingested = counter.take(),
                    rss_bytes = resident_memory_bytes().unwrap_or(0),
                    "Throughput report"
                );
            }
        })
    }
}

#[async_trait]
impl Worker for IngestWorker {
    fn id(&self) -> Uuid {
        INGEST_WORKER_ID
    }

    fn name(&self) -> &str {
        "Twitter Filter"
    }

    async fn execute(&self, ctx: &WorkerContext) -> Result<()> {
        let mut source = self.source.lock().await;
        let name = source.name().to_string();
        let uri = source.uri().to_string();
        info!(source = %name, "Ingesting stream");

        let reporter = self.spawn_reporter();
        let mut shutdown = ctx.shutdown.clone();

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => break,
                event = source.next_event() => match event {
                    Ok(Some(data)) => {
                        let message = json!({
                            "sourceName": name,
                            "sourceUri": uri,
                            "data": data,
                        });
                        match self.queue.push(PARSE_QUEUE, &message.to_string()).await {
                            Ok(()) => self.counter.increment(),
                            Err(e) => warn!(error = %e, "Enqueue failed, event lost"),
                        }
                    }
                    Ok(None) => {
                        info!(source = %name, "Stream ended");
                        break;
                    }
                    Err(e) => {
                        // Transient read failure; the source reconnects
                        // internally, keep pulling.
                        warn!(error = %e, "Stream read failed");
                    }
                },
            }
        }

        reporter.abort();
        info!(source = %name, "Ingestion stopped");
        Ok(())
    }
}

/// Stream source reading one JSON event per line. Used to replay captured
/// streams and to pipe an external stream client into the pipeline.
pub struct JsonLinesStream<R> {
    name: String,
    uri: String,
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesStream<R> {
    pub fn new(name: impl Into<String>, uri: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> StreamSource for JsonLinesStream<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    async fn next_event(&mut self) -> Result<Option<Value>> {
        loop {
            let Some(line) = self.lines.next_line().await.context("stream read")? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line)
                .map_err(|e| VotePulseError::Parse(format!("malformed stream line: {e}")))?;
            return Ok(Some(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockQueue, ScriptedStream};
    use tokio::sync::watch;

    async fn run_to_completion(worker: &IngestWorker) {
        let (_tx, rx) = watch::channel(false);
        let ctx = WorkerContext {
            config: Value::Null,
            shutdown: rx,
        };
        worker
            .execute(&ctx)
            .await
            .expect("ingest worker should finish cleanly");
    }

    #[tokio::test]
    async fn events_are_enveloped_with_provenance_and_enqueued_in_order() {
        let queue = MockQueue::new();
        let stream = ScriptedStream::new(
            "Twitter Filter",
            "https://stream.twitter.com/1/statuses/filter.json",
            vec![json!({"id_str": "1"}), json!({"id_str": "2"})],
        );
        let worker = IngestWorker::new(Box::new(stream), Arc::new(queue.clone()));

        run_to_completion(&worker).await;

        let pushed = queue.pushed(PARSE_QUEUE);
        assert_eq!(pushed.len(), 2);
        let first: Value = serde_json::from_str(&pushed[0]).expect("valid envelope JSON");
        assert_eq!(first["sourceName"], "Twitter Filter");
        assert_eq!(
            first["sourceUri"],
            "https://stream.twitter.com/1/statuses/filter.json"
        );
        assert_eq!(first["data"]["id_str"], "1");
        let second: Value = serde_json::from_str(&pushed[1]).expect("valid envelope JSON");
        assert_eq!(second["data"]["id_str"], "2");
    }

    #[tokio::test]
    async fn a_read_error_does_not_end_the_stream() {
        let queue = MockQueue::new();
        let stream = ScriptedStream::new("s", "u", vec![json!({"id_str": "1"})])
            .with_error_before_each_event();
        let worker = IngestWorker::new(Box::new(stream), Arc::new(queue.clone()));

        run_to_completion(&worker).await;

        assert_eq!(queue.pushed(PARSE_QUEUE).len(), 1);
    }

    #[tokio::test]
    async fn json_lines_stream_skips_blanks_and_ends_cleanly() {
        let input = b"{\"id_str\":\"1\"}\n\n{\"id_str\":\"2\"}\n" as &[u8];
        let mut stream = JsonLinesStream::new("replay", "file://capture", input);

        let first = stream.next_event().await.expect("first read");
        assert_eq!(first.expect("an event")["id_str"], "1");
        let second = stream.next_event().await.expect("second read");
        assert_eq!(second.expect("an event")["id_str"], "2");
        assert!(stream.next_event().await.expect("end read").is_none());
    }
}
