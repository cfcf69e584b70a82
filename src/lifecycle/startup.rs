//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics before anything else logs
//! - Wire the subsystems and start them in dependency order
//! - Run until a termination signal, reloading on SIGHUP or file change
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The scheduler starts only after the orchestrator is running
//! - Shutdown order mirrors startup: scheduler first, then services

use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::{CommandRegistry, HcfCommand};
use crate::config::watcher::{self, ConfigWatch};
use crate::config::{ConfigProvider, FileConfigProvider};
use crate::error::{HcfError, Result};
use crate::events::EventBridge;
use crate::lifecycle::scheduler::LifecycleScheduler;
use crate::lifecycle::signals::{SignalEvent, Signals};
use crate::lifecycle::ServiceOrchestrator;
use crate::observability::{logging, metrics};
use crate::storage::PoolManager;

/// Process-level overrides.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

/// Everything a running instance is made of.
pub struct Services {
    pub orchestrator: Arc<ServiceOrchestrator>,
    pub scheduler: Arc<LifecycleScheduler>,
    pub commands: Arc<CommandRegistry>,
    pub events: Arc<EventBridge>,
}

impl Services {
    /// Stop the scheduler (bounded), then the services.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        self.orchestrator.stop().await;
    }

    /// Reload the services, restarting the scheduler around it so new
    /// lifecycle settings (periods, grace period, termination hook) apply.
    ///
    /// The scheduler is restarted even when the reload fails, so the health
    /// check keeps reporting the stopped services.
    pub async fn reload(&self) -> Result<()> {
        self.scheduler.shutdown().await;
        let result = self.orchestrator.reload().await;
        self.scheduler
            .reconfigure(self.orchestrator.config().current().lifecycle.clone());
        self.scheduler.start();
        result
    }
}

/// Wire the subsystems against `provider` and start them.
pub async fn bootstrap(provider: Arc<dyn ConfigProvider>) -> Result<Services> {
    let lifecycle = provider.current().lifecycle.clone();

    let commands = Arc::new(CommandRegistry::new());
    let events = Arc::new(EventBridge::new());
    let orchestrator = Arc::new(
        ServiceOrchestrator::new(
            provider,
            Arc::new(PoolManager::new()),
            commands.clone(),
            events.clone(),
        )
        .with_post_start_hook(Arc::new(metrics::MetricsRegistration)),
    );
    commands.register(Arc::new(HcfCommand::new(Arc::downgrade(&orchestrator))));

    orchestrator.start().await?;

    let scheduler = Arc::new(LifecycleScheduler::new(orchestrator.clone(), lifecycle));
    scheduler.start();

    Ok(Services {
        orchestrator,
        scheduler,
        commands,
        events,
    })
}

/// Run the process until terminated.
pub async fn run(options: StartupOptions) -> Result<()> {
    let provider = Arc::new(FileConfigProvider::open(&options.config_path)?);
    let config = provider.current();

    let level = options
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    let json = options.json_logs || config.observability.json_format;
    if let Err(e) = logging::init_logging(&level, json) {
        eprintln!("logging already initialized: {e}");
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "strafe-hcf starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut signals =
        Signals::new().map_err(|e| HcfError::initialization("signal handlers", e))?;

    let services = bootstrap(provider.clone()).await?;

    let mut watch = if config.lifecycle.watch_config {
        watcher::watch(provider.path())
            .map_err(|e| tracing::error!(error = %e, "Failed to start config watcher"))
            .ok()
    } else {
        None
    };

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                SignalEvent::Terminate => break,
                SignalEvent::Reload => reload(&services).await,
            },
            Some(()) = next_change(&mut watch) => reload(&services).await,
        }
    }

    services.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn next_change(watch: &mut Option<ConfigWatch>) -> Option<()> {
    match watch {
        Some(watch) => watch.changed().await,
        None => std::future::pending().await,
    }
}

async fn reload(services: &Services) {
    if let Err(e) = services.reload().await {
        tracing::error!(error = %e, "Reload failed, services are stopped");
    }
}
