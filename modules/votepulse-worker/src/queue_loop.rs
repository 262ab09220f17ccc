//! Blocking-queue consumption loop for message-driven workers.
//!
//! The loop is strictly sequential and single-flight: one message is popped,
//! fully dispatched through `parse`, and only then is the next pop issued.
//! Throughput scales by running multiple worker processes per stage; the
//! queue store's pop semantics deliver each message to exactly one of them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use votepulse_store::QueueStore;

use crate::worker::{Worker, WorkerContext};

/// Bounded pop wait. The original blocked indefinitely; a bounded timeout
/// keeps shutdown latency finite (at most one timeout interval).
const POP_TIMEOUT: Duration = Duration::from_secs(5);

/// Throughput reporting cadence.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// A worker bound to one named queue. `parse` handles a single popped
/// payload and must never propagate a failure: implementations wrap their
/// body in a boundary that logs and drops the malformed message, preserving
/// the loop.
#[async_trait]
pub trait QueueWorker: Send + Sync {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn queue_name(&self) -> &str;

    fn default_config(&self, stub: Value) -> Value {
        stub
    }

    fn validate_config(&self, _config: &Value) -> bool {
        true
    }

    async fn parse(&self, payload: String);
}

/// Messages-processed counter shared between the consumption loop (writes)
/// and the reporter (resets). Single-writer on each side.
#[derive(Clone, Default)]
pub struct ThroughputCounter(Arc<AtomicU64>);

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current count within the interval.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Snapshot the interval's count and reset to zero.
    pub fn take(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Generic driver turning a `QueueWorker` into a runnable `Worker`: pops the
/// bound queue sequentially and dispatches each payload to `parse`, with a
/// parallel once-per-second throughput/memory report.
pub struct QueueConsumer {
    worker: Arc<dyn QueueWorker>,
    queue: Arc<dyn QueueStore>,
    counter: ThroughputCounter,
    pop_timeout: Duration,
    report_interval: Duration,
}

impl QueueConsumer {
    pub fn new(worker: Arc<dyn QueueWorker>, queue: Arc<dyn QueueStore>) -> Self {
        Self {
            worker,
            queue,
            counter: ThroughputCounter::new(),
            pop_timeout: POP_TIMEOUT,
            report_interval: REPORT_INTERVAL,
        }
    }

    /// Override the pop timeout (tests).
    pub fn with_pop_timeout(mut self, timeout: Duration) -> Self {
        self.pop_timeout = timeout;
        self
    }

    /// Handle to the shared throughput counter.
    pub fn counter(&self) -> ThroughputCounter {
        self.counter.clone()
    }

    fn spawn_reporter(&self) -> tokio::task::JoinHandle<()> {
        let counter = self.counter.clone();
        let name = self.worker.name().to_string();
        let interval = self.report_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let processed = counter.take();
                info!(
                    worker = %name,
                    processed,
                    rss_bytes = resident_memory_bytes().unwrap_or(0),
                    "Throughput report"
                );
            }
        })
    }
}

#[async_trait]
impl Worker for QueueConsumer {
    fn id(&self) -> Uuid {
        self.worker.id()
    }

    fn name(&self) -> &str {
        self.worker.name()
    }

    fn default_config(&self, stub: Value) -> Value {
        self.worker.default_config(stub)
    }

    fn validate_config(&self, config: &Value) -> bool {
        self.worker.validate_config(config)
    }

    async fn execute(&self, ctx: &WorkerContext) -> Result<()> {
        let queue_name = self.worker.queue_name().to_string();
        info!(queue = %queue_name, "Consuming queue");

        let reporter = self.spawn_reporter();
        let shutdown = ctx.shutdown.clone();

        // The in-flight pop is never forcibly interrupted: shutdown is
        // observed between pops, so it completes within one pop timeout.
        while !*shutdown.borrow() {
            match self.queue.blocking_pop(&queue_name, self.pop_timeout).await {
                Ok(Some(payload)) => {
                    self.worker.parse(payload).await;
                    self.counter.increment();
                }
                Ok(None) => {
                    // Timed out empty; re-issue the pop.
                }
                Err(e) => {
                    // Transient store failure: log and keep the loop alive.
                    warn!(error = %e, queue = %queue_name, "Queue pop failed");
                    // A pop that fails synchronously never awaits; yield so
                    // the shutdown signal and the reporter task can run.
                    tokio::task::yield_now().await;
                }
            }
        }

        reporter.abort();
        info!(queue = %queue_name, "Queue consumption stopped");
        Ok(())
    }
}

/// Resident-set size of this process, read from `/proc/self/statm`.
pub fn resident_memory_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096)
}
