//! Process-wide worker lifecycle: Loading → Running → Stopping → Stopped.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use votepulse_common::{now_ms, WorkerInfo, WorkerStatus};
use votepulse_store::{ConfigStore, WorkerRegistry};

/// Heartbeat cadence for liveness records.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// A long-running worker process. Each worker type carries a fixed identity
/// (UUID + name) so liveness and config documents key consistently across
/// restarts.
#[async_trait]
pub trait Worker: Send + Sync {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;

    /// Fill worker-specific defaults into a stub config document. Called
    /// when no valid configuration exists yet.
    fn default_config(&self, stub: Value) -> Value {
        stub
    }

    /// Whether a fetched configuration document is usable as-is.
    fn validate_config(&self, _config: &Value) -> bool {
        true
    }

    /// Main work. Runs until done or until the shutdown signal flips true.
    async fn execute(&self, ctx: &WorkerContext) -> Result<()>;
}

/// Everything a running worker needs: its bound configuration and the
/// shutdown signal it must observe.
pub struct WorkerContext {
    pub config: Value,
    pub shutdown: watch::Receiver<bool>,
}

/// Drives a worker through its lifecycle against the worker registry and
/// config store.
pub struct WorkerRuntime {
    registry: Arc<dyn WorkerRegistry>,
    configs: Arc<dyn ConfigStore>,
    heartbeat_interval: Duration,
}

impl WorkerRuntime {
    pub fn new(registry: Arc<dyn WorkerRegistry>, configs: Arc<dyn ConfigStore>) -> Self {
        Self {
            registry,
            configs,
            heartbeat_interval: HEARTBEAT_INTERVAL,
        }
    }

    /// Override the heartbeat cadence (tests).
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Run the worker to completion, shutting down on SIGINT/SIGTERM.
    pub async fn run(&self, worker: Arc<dyn Worker>) -> Result<()> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            wait_for_termination().await;
            let _ = tx.send(true);
        });
        self.run_until(worker, rx).await
    }

    /// Run the worker with an externally supplied shutdown signal.
    pub async fn run_until(
        &self,
        worker: Arc<dyn Worker>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        // Loading
        let config = self.load_configuration(worker.as_ref()).await;
        info!(worker = worker.name(), "Configuration loaded");

        // Running
        let start_time = now_ms();
        self.ping(worker.as_ref(), WorkerStatus::Running, start_time)
            .await;
        let heartbeat = self.spawn_heartbeat(worker.clone(), start_time);
        info!(worker = worker.name(), id = %worker.id(), "Worker running");

        let ctx = WorkerContext {
            config,
            shutdown: shutdown.clone(),
        };
        let result = worker.execute(&ctx).await;

        // Stopping
        heartbeat.abort();
        self.ping(worker.as_ref(), WorkerStatus::Stopped, start_time)
            .await;
        info!(worker = worker.name(), "Worker stopped");

        result
    }

    /// Fetch the worker's config document; synthesize and persist a default
    /// when it is absent or invalid. Never an error: a worker always starts
    /// with a usable configuration.
    async fn load_configuration(&self, worker: &dyn Worker) -> Value {
        let existing = match self.configs.fetch(worker.id()).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, worker = worker.name(), "Failed to fetch configuration");
                None
            }
        };

        match existing {
            Some(doc) if worker.validate_config(&doc) => doc,
            _ => {
                let stub = json!({
                    "_id": worker.id(),
                    "Name": worker.name(),
                });
                let doc = worker.default_config(stub);
                if let Err(e) = self.configs.save(worker.id(), &doc).await {
                    warn!(error = %e, worker = worker.name(), "Failed to persist default configuration");
                }
                doc
            }
        }
    }

    fn spawn_heartbeat(&self, worker: Arc<dyn Worker>, start_time: i64) -> tokio::task::JoinHandle<()> {
        let registry = self.registry.clone();
        let interval = self.heartbeat_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick is immediate; the initial ping already went out
            loop {
                ticker.tick().await;
                write_liveness(registry.as_ref(), worker.as_ref(), WorkerStatus::Running, start_time)
                    .await;
            }
        })
    }

    async fn ping(&self, worker: &dyn Worker, status: WorkerStatus, start_time: i64) {
        write_liveness(self.registry.as_ref(), worker, status, start_time).await;
    }
}

/// Upsert a liveness record. Failures are logged and swallowed: a liveness
/// write must never crash the worker.
async fn write_liveness(
    registry: &dyn WorkerRegistry,
    worker: &dyn Worker,
    status: WorkerStatus,
    start_time: i64,
) {
    let now = now_ms();
    let info = WorkerInfo {
        id: worker.id(),
        name: worker.name().to_string(),
        status,
        is_stopped: status == WorkerStatus::Stopped,
        start_time_ms: start_time,
        stop_time_ms: if status == WorkerStatus::Stopped { now } else { 0 },
        last_ping_ms: now,
    };
    if let Err(e) = registry.upsert_liveness(&info).await {
        warn!(error = %e, worker = worker.name(), "Failed to write liveness record");
    }
}

async fn wait_for_termination() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemRegistry {
        records: Mutex<HashMap<Uuid, WorkerInfo>>,
        writes: Mutex<u32>,
        fail: bool,
    }

    impl MemRegistry {
        fn new() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                writes: Mutex::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl WorkerRegistry for MemRegistry {
        async fn upsert_liveness(&self, info: &WorkerInfo) -> Result<()> {
            if self.fail {
                anyhow::bail!("registry unavailable");
            }
            *self.writes.lock().unwrap() += 1;
            self.records.lock().unwrap().insert(info.id, info.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemConfigs {
        docs: Mutex<HashMap<Uuid, Value>>,
    }

    #[async_trait]
    impl ConfigStore for MemConfigs {
        async fn fetch(&self, id: Uuid) -> Result<Option<Value>> {
            Ok(self.docs.lock().unwrap().get(&id).cloned())
        }

        async fn save(&self, id: Uuid, doc: &Value) -> Result<()> {
            self.docs.lock().unwrap().insert(id, doc.clone());
            Ok(())
        }
    }

    struct NoopWorker {
        id: Uuid,
    }

    #[async_trait]
    impl Worker for NoopWorker {
        fn id(&self) -> Uuid {
            self.id
        }

        fn name(&self) -> &str {
            "Noop Worker"
        }

        fn default_config(&self, mut stub: Value) -> Value {
            stub["BatchSize"] = json!(50);
            stub
        }

        fn validate_config(&self, config: &Value) -> bool {
            config.get("BatchSize").is_some()
        }

        async fn execute(&self, _ctx: &WorkerContext) -> Result<()> {
            Ok(())
        }
    }

    fn runtime(registry: Arc<MemRegistry>, configs: Arc<MemConfigs>) -> WorkerRuntime {
        WorkerRuntime::new(registry, configs)
    }

    #[tokio::test]
    async fn lifecycle_leaves_one_stopped_liveness_record() {
        let registry = Arc::new(MemRegistry::new());
        let configs = Arc::new(MemConfigs::default());
        let id = Uuid::new_v4();

        let (_tx, rx) = watch::channel(false);
        runtime(registry.clone(), configs)
            .run_until(Arc::new(NoopWorker { id }), rx)
            .await
            .unwrap();

        let records = registry.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let record = records.get(&id).unwrap();
        assert_eq!(record.status, WorkerStatus::Stopped);
        assert!(record.is_stopped);
        assert!(record.last_ping_ms >= record.start_time_ms);
        assert_eq!(record.stop_time_ms, record.last_ping_ms);
    }

    #[tokio::test]
    async fn missing_config_synthesizes_and_persists_a_default() {
        let registry = Arc::new(MemRegistry::new());
        let configs = Arc::new(MemConfigs::default());
        let id = Uuid::new_v4();

        let (_tx, rx) = watch::channel(false);
        runtime(registry, configs.clone())
            .run_until(Arc::new(NoopWorker { id }), rx)
            .await
            .unwrap();

        let saved = configs.docs.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(saved["Name"], "Noop Worker");
        assert_eq!(saved["BatchSize"], 50);
    }

    #[tokio::test]
    async fn invalid_config_is_replaced_by_the_default() {
        let registry = Arc::new(MemRegistry::new());
        let configs = Arc::new(MemConfigs::default());
        let id = Uuid::new_v4();
        configs
            .docs
            .lock()
            .unwrap()
            .insert(id, json!({"Garbage": true}));

        let (_tx, rx) = watch::channel(false);
        runtime(registry, configs.clone())
            .run_until(Arc::new(NoopWorker { id }), rx)
            .await
            .unwrap();

        let saved = configs.docs.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(saved["BatchSize"], 50);
        assert!(saved.get("Garbage").is_none());
    }

    #[tokio::test]
    async fn valid_config_is_kept_verbatim() {
        let registry = Arc::new(MemRegistry::new());
        let configs = Arc::new(MemConfigs::default());
        let id = Uuid::new_v4();
        let doc = json!({"BatchSize": 200, "Extra": "kept"});
        configs.docs.lock().unwrap().insert(id, doc.clone());

        let (_tx, rx) = watch::channel(false);
        runtime(registry, configs.clone())
            .run_until(Arc::new(NoopWorker { id }), rx)
            .await
            .unwrap();

        assert_eq!(configs.docs.lock().unwrap().get(&id), Some(&doc));
    }

    #[tokio::test]
    async fn liveness_write_failure_never_crashes_the_worker() {
        let registry = Arc::new(MemRegistry::failing());
        let configs = Arc::new(MemConfigs::default());
        let id = Uuid::new_v4();

        let (_tx, rx) = watch::channel(false);
        let result = runtime(registry, configs)
            .run_until(Arc::new(NoopWorker { id }), rx)
            .await;
        assert!(result.is_ok());
    }
}
