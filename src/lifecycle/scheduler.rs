//! Lifecycle scheduler.
//!
//! # Responsibilities
//! - Run health-check, cleanup and statistics tasks on fixed periods
//! - Run ad-hoc deferred work (`run_async`, `run_later`)
//! - Stop everything within a bounded grace period
//!
//! # Design Decisions
//! - Each start builds a fresh `Shutdown` and `JoinSet`; nothing is reused
//!   across stop/start
//! - The live task set is installed and taken under one lock, so `start` and
//!   `shutdown` never see a half-built run
//! - Concurrent `shutdown` calls all return after the same drain
//! - Tasks still running after the grace period are aborted and detached;
//!   `shutdown` does not wait for them a second time
//! - Task bodies are isolated: errors and panics are logged and the schedule
//!   keeps running
//! - The termination hook lives outside the task set and calls the same
//!   `shutdown()` as the normal stop path

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::LifecycleConfig;
use crate::error::{HcfError, Result};
use crate::health::HealthMonitor;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::lifecycle::subsystem::Hook;
use crate::lifecycle::ServiceOrchestrator;
use crate::observability::{metrics, process};

/// Produces the future the termination hook waits on, once per start.
type TerminationSource = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Live state of one scheduler run.
struct Active {
    shutdown: Shutdown,
    tasks: JoinSet<()>,
}

pub struct LifecycleScheduler {
    orchestrator: Arc<ServiceOrchestrator>,
    config: ArcSwap<LifecycleConfig>,
    cleanup_hooks: Vec<Arc<dyn Hook>>,
    termination: TerminationSource,
    active: Mutex<Option<Active>>,
    /// Held for the whole drain so later callers wait on the first one.
    draining: tokio::sync::Mutex<()>,
}

impl LifecycleScheduler {
    pub fn new(orchestrator: Arc<ServiceOrchestrator>, config: LifecycleConfig) -> Self {
        Self {
            orchestrator,
            config: ArcSwap::from_pointee(config),
            cleanup_hooks: Vec::new(),
            termination: Arc::new(|| signals::termination().boxed()),
            active: Mutex::new(None),
            draining: tokio::sync::Mutex::new(()),
        }
    }

    /// Run `hook` on every cleanup tick.
    pub fn with_cleanup_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.cleanup_hooks.push(hook);
        self
    }

    /// Replace what the termination hook waits for (SIGINT/SIGTERM by default).
    ///
    /// With the default source the scheduler installs its own signal
    /// handlers, which replaces the default "terminate the process"
    /// disposition. Hosts that enable the hook must stop the process
    /// themselves once the scheduler is down.
    pub fn with_termination_source<F, Fut>(mut self, source: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.termination = Arc::new(move || source().boxed());
        self
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Settings the next `start` will use.
    pub fn config(&self) -> Arc<LifecycleConfig> {
        self.config.load_full()
    }

    /// Replace the settings; takes effect on the next `start`.
    pub fn reconfigure(&self, config: LifecycleConfig) {
        self.config.store(Arc::new(config));
    }

    /// Register the periodic tasks. Must be called inside a Tokio runtime.
    pub fn start(self: &Arc<Self>) {
        let mut active = self.active.lock();
        if active.is_some() {
            tracing::warn!("Scheduler already running");
            return;
        }

        let config = self.config.load_full();
        let shutdown = Shutdown::new();
        let mut tasks = JoinSet::new();

        let monitor = Arc::new(HealthMonitor::new(self.orchestrator.clone()));
        tasks.spawn(every(
            "health-check",
            config.health_check_interval(),
            shutdown.subscribe(),
            move || {
                let monitor = monitor.clone();
                async move {
                    monitor.check().await;
                    Ok::<(), HcfError>(())
                }
            },
        ));

        let hooks = self.cleanup_hooks.clone();
        tasks.spawn(every(
            "cleanup",
            config.cleanup_interval(),
            shutdown.subscribe(),
            move || run_cleanup(hooks.clone()),
        ));

        let orchestrator = self.orchestrator.clone();
        tasks.spawn(every(
            "statistics",
            config.statistics_interval(),
            shutdown.subscribe(),
            move || report_statistics(orchestrator.clone()),
        ));

        if config.termination_hook {
            let scheduler = Arc::downgrade(self);
            let terminated = (self.termination)();
            let mut stopped = shutdown.subscribe();
            tokio::spawn(async move {
                tokio::select! {
                    _ = terminated => {
                        if let Some(scheduler) = scheduler.upgrade() {
                            tracing::info!("Termination signal received, stopping scheduler");
                            scheduler.shutdown().await;
                        }
                    }
                    _ = stopped.recv() => {}
                }
            });
        }

        *active = Some(Active { shutdown, tasks });

        tracing::info!(
            health_check_secs = config.health_check_interval_secs,
            cleanup_secs = config.cleanup_interval_secs,
            statistics_secs = config.statistics_interval_secs,
            termination_hook = config.termination_hook,
            "Lifecycle scheduler started"
        );
    }

    /// Run `task` on the scheduler as soon as possible.
    ///
    /// Returns `false` (and drops the task) when the scheduler is not running.
    pub fn run_async<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut guard = self.active.lock();
        let Some(active) = guard.as_mut() else {
            tracing::warn!("Scheduler not running, dropping async task");
            return false;
        };
        reap(&mut active.tasks);
        active.tasks.spawn(isolated("async", task));
        true
    }

    /// Run `task` after `delay` unless the scheduler stops first.
    ///
    /// Returns `false` (and drops the task) when the scheduler is not running.
    pub fn run_later<F>(&self, task: F, delay: Duration) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut guard = self.active.lock();
        let Some(active) = guard.as_mut() else {
            tracing::warn!("Scheduler not running, dropping delayed task");
            return false;
        };
        reap(&mut active.tasks);
        let mut stopped = active.shutdown.subscribe();
        active.tasks.spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => isolated("delayed", task).await,
                _ = stopped.recv() => {
                    tracing::debug!("Delayed task cancelled by shutdown");
                }
            }
        });
        true
    }

    /// Stop all tasks, waiting up to the configured grace period.
    ///
    /// Idempotent and infallible. A call that overlaps a shutdown already in
    /// progress returns when that one does. Tasks still running after the
    /// grace period are aborted and left behind; a task blocked outside an
    /// `.await` finishes on its own.
    pub async fn shutdown(&self) {
        let _drain = self.draining.lock().await;

        let active = self.active.lock().take();
        let Some(Active { shutdown, mut tasks }) = active else {
            return;
        };

        let notified = shutdown.trigger();
        tracing::info!(tasks = tasks.len(), notified = notified, "Stopping lifecycle scheduler");

        let grace = self.config.load().shutdown_timeout();
        let drained = time::timeout(grace, async {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    if e.is_panic() {
                        tracing::warn!("Scheduled task panicked during shutdown");
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                remaining = tasks.len(),
                "Scheduler tasks did not finish in time, aborting"
            );
            tasks.abort_all();
            tasks.detach_all();
        }
        tracing::info!("Lifecycle scheduler stopped");
    }
}

/// Drop handles of tasks that already finished.
fn reap(tasks: &mut JoinSet<()>) {
    while tasks.try_join_next().is_some() {}
}

/// Run `task`, logging a panic instead of propagating it.
async fn isolated<F>(kind: &'static str, task: F)
where
    F: Future<Output = ()>,
{
    if AssertUnwindSafe(task).catch_unwind().await.is_err() {
        tracing::error!(kind = kind, "Scheduled task panicked");
    }
}

/// Run `body` every `period` (first run after one period) until shutdown.
async fn every<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut body: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match AssertUnwindSafe(body()).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(task = name, error = %e, "Scheduled task failed"),
                    Err(_) => tracing::error!(task = name, "Scheduled task panicked"),
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!(task = name, "Scheduled task received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

async fn run_cleanup(hooks: Vec<Arc<dyn Hook>>) -> Result<()> {
    tracing::info!(hooks = hooks.len(), "Running maintenance cleanup");
    for hook in hooks {
        if let Err(e) = hook.run().await {
            tracing::error!(hook = hook.name(), error = %e, "Cleanup hook failed");
        }
    }
    Ok(())
}

async fn report_statistics(orchestrator: Arc<ServiceOrchestrator>) -> Result<()> {
    match process::memory_usage() {
        Some(memory) => {
            metrics::record_memory(memory.resident_bytes);
            tracing::info!(
                resident_mb = memory.resident_mb(),
                virtual_mb = memory.virtual_mb(),
                "Memory usage"
            );
        }
        None => tracing::debug!("Memory usage unavailable on this platform"),
    }

    match orchestrator.persistence().pool_status() {
        Some(status) => {
            metrics::record_pool_status(&status);
            tracing::info!(pool = %status, "Pool utilization");
        }
        None => tracing::info!("Database not initialized"),
    }

    let info = orchestrator.health_info().await;
    metrics::record_active_services(info.active_services);
    tracing::info!(health = %info.to_json(), "Service statistics");
    Ok(())
}
