//! The reusable worker runtime: process lifecycle (configuration bootstrap,
//! heartbeat liveness reporting, graceful shutdown) and the blocking-queue
//! consumption loop built on top of it.
//!
//! Each worker is a single independent process. Coordination between workers
//! happens only through the queue store and the document store.

pub mod queue_loop;
pub mod worker;

pub use queue_loop::{QueueConsumer, QueueWorker, ThroughputCounter};
pub use worker::{Worker, WorkerContext, WorkerRuntime};
