//! Service orchestrator.
//!
//! # Responsibilities
//! - Start persistence, commands and events in that order
//! - Verify aggregate integrity and run post-start hooks
//! - Unwind partially started subsystems when any step fails
//! - Stop in reverse order, reload as stop → config reload → start
//!
//! # State Transitions
//! ```text
//! NotStarted | Stopped → Starting → Running → Stopping → Stopped
//!                        Starting → Stopped (start failure, after unwind)
//! ```
//!
//! # Design Decisions
//! - One `AtomicU8` holds the state; every transition is a CAS, so concurrent
//!   callers collapse into a single effective start or stop
//! - Stop never fails: subsystem shutdown errors are logged and the next
//!   subsystem is still attempted

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::ConfigProvider;
use crate::error::{HcfError, Result};
use crate::health::{HealthInfo, SubsystemStatus};
use crate::lifecycle::subsystem::{Hook, Subsystem};
use crate::storage::Persistence;

/// Orchestrator lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrchestratorState {
    NotStarted = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
    Stopped = 4,
}

impl From<u8> for OrchestratorState {
    fn from(val: u8) -> Self {
        match val {
            1 => OrchestratorState::Starting,
            2 => OrchestratorState::Running,
            3 => OrchestratorState::Stopping,
            4 => OrchestratorState::Stopped,
            _ => OrchestratorState::NotStarted,
        }
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Persistence,
    Commands,
    Events,
}

/// Owns the leaf subsystems and drives them through their lifecycle.
pub struct ServiceOrchestrator {
    config: Arc<dyn ConfigProvider>,
    persistence: Arc<dyn Persistence>,
    commands: Arc<dyn Subsystem>,
    events: Arc<dyn Subsystem>,
    post_start: Vec<Arc<dyn Hook>>,
    state: AtomicU8,
    active_services: AtomicUsize,
}

impl ServiceOrchestrator {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        persistence: Arc<dyn Persistence>,
        commands: Arc<dyn Subsystem>,
        events: Arc<dyn Subsystem>,
    ) -> Self {
        Self {
            config,
            persistence,
            commands,
            events,
            post_start: Vec::new(),
            state: AtomicU8::new(OrchestratorState::NotStarted as u8),
            active_services: AtomicUsize::new(0),
        }
    }

    /// Run `hook` after every successful start, in registration order.
    pub fn with_post_start_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.post_start.push(hook);
        self
    }

    pub fn state(&self) -> OrchestratorState {
        OrchestratorState::from(self.state.load(Ordering::Acquire))
    }

    pub fn active_services(&self) -> usize {
        self.active_services.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &Arc<dyn ConfigProvider> {
        &self.config
    }

    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.persistence
    }

    /// Move to `to` if the current state is one of `from`.
    ///
    /// Returns the state observed when the transition was refused.
    fn transition(
        &self,
        from: &[OrchestratorState],
        to: OrchestratorState,
    ) -> std::result::Result<(), OrchestratorState> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if !from.contains(&OrchestratorState::from(current)) {
                return Err(OrchestratorState::from(current));
            }
            match self.state.compare_exchange(
                current,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    fn set_state(&self, state: OrchestratorState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Bring every subsystem up. A no-op when already running or starting.
    ///
    /// A caller that loses the race to a start already in progress returns
    /// `Ok(())` right away, possibly before that start reaches `Running`.
    /// Check `state()` when the outcome matters.
    pub async fn start(&self) -> Result<()> {
        if let Err(observed) = self.transition(
            &[OrchestratorState::NotStarted, OrchestratorState::Stopped],
            OrchestratorState::Starting,
        ) {
            tracing::warn!(state = %observed, "Start requested while not stopped, ignoring");
            return Ok(());
        }

        tracing::info!("Starting HCF application services");
        let mut started = Vec::with_capacity(3);

        match self.bring_up(&mut started).await {
            Ok(()) => {
                self.set_state(OrchestratorState::Running);
                tracing::info!(
                    active_services = self.active_services(),
                    "HCF application services started"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Service start failed, rolling back");
                self.unwind(&started).await;
                self.active_services.store(0, Ordering::Release);
                self.set_state(OrchestratorState::Stopped);
                Err(HcfError::StartFailed(Box::new(e)))
            }
        }
    }

    async fn bring_up(&self, started: &mut Vec<Component>) -> Result<()> {
        let config = self.config.current();

        self.persistence.initialize(&config.database).await?;
        self.mark_started(started, Component::Persistence);
        tracing::info!("Database service initialized");

        self.commands.initialize().await?;
        self.mark_started(started, Component::Commands);
        tracing::info!(subsystem = self.commands.name(), "Command service initialized");

        self.events.initialize().await?;
        self.mark_started(started, Component::Events);
        tracing::info!(subsystem = self.events.name(), "Event service initialized");

        self.verify_integrity().await?;

        for hook in &self.post_start {
            tracing::debug!(hook = hook.name(), "Running post-start hook");
            hook.run()
                .await
                .map_err(|e| HcfError::initialization(hook.name(), e))?;
        }
        Ok(())
    }

    fn mark_started(&self, started: &mut Vec<Component>, component: Component) {
        started.push(component);
        self.active_services.fetch_add(1, Ordering::AcqRel);
    }

    async fn verify_integrity(&self) -> Result<()> {
        let mut failures = Vec::new();
        if !self.persistence.is_healthy().await {
            failures.push("database".to_string());
        }
        if !self.commands.is_running() {
            failures.push(self.commands.name().to_string());
        }
        if !self.events.is_running() {
            failures.push(self.events.name().to_string());
        }

        if failures.is_empty() {
            tracing::debug!("Service integrity verified");
            Ok(())
        } else {
            Err(HcfError::Unhealthy(failures))
        }
    }

    /// Shut down `started` in reverse order, logging failures.
    async fn unwind(&self, started: &[Component]) {
        for component in started.iter().rev() {
            if let Err(e) = self.shutdown_component(*component).await {
                tracing::error!(error = %e, "Subsystem shutdown failed");
            }
        }
    }

    async fn shutdown_component(&self, component: Component) -> Result<()> {
        let (name, result) = match component {
            Component::Events => (self.events.name(), self.events.shutdown().await),
            Component::Commands => (self.commands.name(), self.commands.shutdown().await),
            Component::Persistence => ("database", self.persistence.shutdown().await),
        };
        match result {
            Ok(()) => {
                tracing::info!(subsystem = name, "Subsystem stopped");
                Ok(())
            }
            Err(e) => Err(HcfError::shutdown(name, e)),
        }
    }

    /// Stop every subsystem in reverse start order. A no-op unless running.
    pub async fn stop(&self) {
        if let Err(observed) =
            self.transition(&[OrchestratorState::Running], OrchestratorState::Stopping)
        {
            tracing::debug!(state = %observed, "Stop requested while not running, ignoring");
            return;
        }

        tracing::info!("Stopping HCF application services");
        self.unwind(&[Component::Persistence, Component::Commands, Component::Events])
            .await;

        self.active_services.store(0, Ordering::Release);
        self.set_state(OrchestratorState::Stopped);
        tracing::info!("HCF application services stopped");
    }

    /// Stop, re-read configuration, start again.
    ///
    /// On failure the services stay stopped.
    pub async fn reload(&self) -> Result<()> {
        tracing::info!("Reloading HCF application services");
        self.stop().await;

        self.config
            .reload()
            .map_err(|e| HcfError::ReloadFailed(Box::new(e.into())))?;

        self.start()
            .await
            .map_err(|e| HcfError::ReloadFailed(Box::new(e)))?;

        tracing::info!("HCF application services reloaded");
        Ok(())
    }

    pub async fn is_healthy(&self) -> bool {
        self.state() == OrchestratorState::Running
            && self.persistence.is_healthy().await
            && self.commands.is_running()
            && self.events.is_running()
    }

    pub async fn health_info(&self) -> HealthInfo {
        let state = self.state();
        let database = if !self.persistence.is_initialized() {
            SubsystemStatus::NotInitialized
        } else if self.persistence.is_healthy().await {
            SubsystemStatus::Healthy
        } else {
            SubsystemStatus::Unhealthy
        };

        HealthInfo {
            started: state == OrchestratorState::Running,
            state,
            active_services: self.active_services(),
            database,
            commands: SubsystemStatus::from_running(self.commands.is_running()),
            events: SubsystemStatus::from_running(self.events.is_running()),
            pool: self.persistence.pool_status(),
        }
    }
}
