//! Start/stop lifecycle for the single background stress-test run
//!
//! At most one run exists at a time. `start` and `stop` serialize on one
//! async mutex; `is_running` reads an atomic run id and never blocks. A run
//! that fails on its own clears that id itself and leaves its error behind
//! in `last_error`; the next `start` reaps the finished task.

use futures_util::future::try_join_all;
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::clock::now_millis;
use crate::config::StressConfig;

use super::types::{StressError, StressTestStats, StressTestStatus};
use super::workload::{SimulatedQueryWorkload, StressWorkload};

/// Run id meaning "no run active"
const IDLE: u64 = 0;

/// State shared between the tester and its run task
#[derive(Default)]
struct Shared {
    active_run: AtomicU64,
    active_workers: AtomicUsize,
    queries_executed: AtomicU64,
    /// Epoch milliseconds, `0` when no run has started
    started_at: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Shared {
    fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Handle to the spawned run task
struct ActiveRun {
    id: u64,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Manages the background stress-test run
pub struct StressTester {
    shared: Arc<Shared>,
    run: AsyncMutex<Option<ActiveRun>>,
    workload: Arc<dyn StressWorkload>,
    config: StressConfig,
    next_run_id: AtomicU64,
}

impl StressTester {
    /// Create a tester driving the default simulated query workload
    pub fn new(config: StressConfig) -> Self {
        let workload = Arc::new(SimulatedQueryWorkload::new(config.table_size));
        Self::with_workload(config, workload)
    }

    pub fn with_workload(config: StressConfig, workload: Arc<dyn StressWorkload>) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            run: AsyncMutex::new(None),
            workload,
            config,
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Launch a run. Returns `false` without side effects if one is already running.
    pub async fn start(&self) -> Result<bool, StressError> {
        self.config.validate()?;

        let mut run = self.run.lock().await;
        if self.is_running() {
            info!("Stress test already running, not starting another");
            return Ok(false);
        }

        // A run that failed on its own is still parked here
        if let Some(stale) = run.take() {
            debug!("Reaping finished stress run {}", stale.id);
            let _ = stale.handle.await;
        }

        let id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        self.shared.queries_executed.store(0, Ordering::Release);
        self.shared.started_at.store(now_millis(), Ordering::Release);
        self.shared.set_last_error(None);
        self.shared.active_run.store(id, Ordering::Release);

        let (cancel, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run_stress(
            id,
            Arc::clone(&self.shared),
            Arc::clone(&self.workload),
            self.config.clone(),
            cancel_rx,
        ));
        *run = Some(ActiveRun { id, cancel, handle });

        gauge!("chaos_stress_running").set(1.0);
        info!(
            "Started stress run {} with {} workers",
            id, self.config.workers
        );
        Ok(true)
    }

    /// Cancel the current run and wait for it to drain.
    ///
    /// Returns `true` if a run was active. Waits at most `stop_timeout`
    /// before aborting the task outright.
    pub async fn stop(&self) -> bool {
        let mut run = self.run.lock().await;
        let Some(mut active) = run.take() else {
            debug!("Stop requested with no stress run active");
            return false;
        };

        let was_running = self
            .shared
            .active_run
            .compare_exchange(active.id, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        let _ = active.cancel.send(true);
        match tokio::time::timeout(self.config.stop_timeout, &mut active.handle).await {
            Ok(Ok(())) => debug!("Stress run {} drained", active.id),
            Ok(Err(e)) => warn!("Stress run {} ended abnormally: {}", active.id, e),
            Err(_) => {
                warn!(
                    "Stress run {} did not drain within {:?}, aborting",
                    active.id, self.config.stop_timeout
                );
                active.handle.abort();
            }
        }

        self.shared.started_at.store(0, Ordering::Release);
        gauge!("chaos_stress_running").set(0.0);
        info!("Stopped stress run {}", active.id);
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.shared.active_run.load(Ordering::Acquire) != IDLE
    }

    pub fn status(&self) -> StressTestStatus {
        if self.is_running() {
            StressTestStatus::Running
        } else {
            StressTestStatus::Idle
        }
    }

    /// Message of the most recent run failure, cleared by the next `start`
    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error()
    }

    pub fn stats(&self) -> StressTestStats {
        let running = self.is_running();
        let started_at = self.shared.started_at.load(Ordering::Acquire);
        let start_time = (running && started_at != 0).then_some(started_at);

        StressTestStats {
            running,
            active_workers: self.shared.active_workers.load(Ordering::Acquire),
            queries_executed: self.shared.queries_executed.load(Ordering::Acquire),
            start_time,
            running_time_ms: start_time.map(|t| now_millis().saturating_sub(t)),
            last_error: self.shared.last_error(),
        }
    }
}

/// Decrements the active worker count when a worker exits or is dropped
struct WorkerGuard<'a>(&'a AtomicUsize);

impl<'a> WorkerGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

async fn run_stress(
    id: u64,
    shared: Arc<Shared>,
    workload: Arc<dyn StressWorkload>,
    config: StressConfig,
    cancel: watch::Receiver<bool>,
) {
    let workers = (0..config.workers)
        .map(|worker| run_worker(worker, &shared, workload.as_ref(), &config, cancel.clone()));

    // First failing worker drops the rest
    let result = try_join_all(workers).await;

    if let Err(e) = result {
        error!("Stress run {} failed: {}", id, e);
        counter!("chaos_stress_failures_total").increment(1);
        shared.set_last_error(Some(e.to_string()));
        if shared
            .active_run
            .compare_exchange(id, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            gauge!("chaos_stress_running").set(0.0);
        }
    }
}

async fn run_worker(
    worker: usize,
    shared: &Shared,
    workload: &dyn StressWorkload,
    config: &StressConfig,
    mut cancel: watch::Receiver<bool>,
) -> Result<(), StressError> {
    let _guard = WorkerGuard::enter(&shared.active_workers);
    debug!("Stress worker {} started", worker);

    loop {
        let cancelled = *cancel.borrow();
        if cancelled {
            debug!("Stress worker {} cancelled", worker);
            return Ok(());
        }

        match tokio::time::timeout(config.unit_timeout, workload.execute_unit()).await {
            Ok(Ok(())) => {
                shared.queries_executed.fetch_add(1, Ordering::AcqRel);
                counter!("chaos_stress_queries_total").increment(1);
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(StressError::Timeout(config.unit_timeout)),
        }

        tokio::select! {
            changed = cancel.changed() => {
                // Sender gone means the tester itself was dropped
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = tokio::time::sleep(config.query_interval) => {}
        }
    }
}
