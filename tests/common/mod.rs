//! Shared test doubles for the service core.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use strafe_hcf::config::{
    ConfigError, ConfigProvider, DatabaseConfig, HcfConfig, StaticConfigProvider,
};
use strafe_hcf::lifecycle::{Hook, ServiceOrchestrator, Subsystem};
use strafe_hcf::storage::{Persistence, PoolStatus};
use strafe_hcf::{HcfError, Result};

/// Ordered record of lifecycle calls across all doubles.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

pub struct MockPersistence {
    log: CallLog,
    pub fail_init: AtomicBool,
    pub healthy: AtomicBool,
    initialized: AtomicBool,
    pub init_calls: AtomicUsize,
    pub health_checks: AtomicUsize,
    init_delay: Duration,
}

impl MockPersistence {
    pub fn new(log: CallLog) -> Self {
        Self::with_delay(log, Duration::ZERO)
    }

    pub fn with_delay(log: CallLog, init_delay: Duration) -> Self {
        Self {
            log,
            fail_init: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
            init_calls: AtomicUsize::new(0),
            health_checks: AtomicUsize::new(0),
            init_delay,
        }
    }
}

#[async_trait]
impl Persistence for MockPersistence {
    async fn initialize(&self, _config: &DatabaseConfig) -> Result<()> {
        self.log.push("database.initialize");
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(HcfError::initialization("database", "validation query failed"));
        }
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(HcfError::AlreadyInitialized);
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.log.push("database.shutdown");
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.initialized.load(Ordering::SeqCst) && self.healthy.load(Ordering::SeqCst)
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn pool_status(&self) -> Option<PoolStatus> {
        self.is_initialized().then_some(PoolStatus {
            active: 0,
            idle: 2,
            waiting: 0,
            total: 2,
        })
    }
}

pub struct MockSubsystem {
    name: &'static str,
    log: CallLog,
    pub fail_init: AtomicBool,
    pub fail_shutdown: AtomicBool,
    running: AtomicBool,
}

impl MockSubsystem {
    pub fn new(name: &'static str, log: CallLog) -> Self {
        Self {
            name,
            log,
            fail_init: AtomicBool::new(false),
            fail_shutdown: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Subsystem for MockSubsystem {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        self.log.push(format!("{}.initialize", self.name));
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(HcfError::initialization(self.name, "registration failed"));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.log.push(format!("{}.shutdown", self.name));
        self.running.store(false, Ordering::SeqCst);
        if self.fail_shutdown.load(Ordering::SeqCst) {
            return Err(HcfError::shutdown(self.name, "unregister failed"));
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Static provider that records reloads.
pub struct RecordingProvider {
    log: CallLog,
    inner: StaticConfigProvider,
    pub fail_reload: AtomicBool,
}

impl RecordingProvider {
    pub fn new(log: CallLog, config: HcfConfig) -> Self {
        Self {
            log,
            inner: StaticConfigProvider::new(config),
            fail_reload: AtomicBool::new(false),
        }
    }
}

impl ConfigProvider for RecordingProvider {
    fn current(&self) -> Arc<HcfConfig> {
        self.inner.current()
    }

    fn reload(&self) -> std::result::Result<Arc<HcfConfig>, ConfigError> {
        self.log.push("config.reload");
        if self.fail_reload.load(Ordering::SeqCst) {
            return Err(ConfigError::Validation(Vec::new()));
        }
        self.inner.reload()
    }
}

/// Hook that records its runs and optionally fails.
pub struct RecordingHook {
    log: CallLog,
    pub fail: AtomicBool,
}

impl RecordingHook {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Hook for RecordingHook {
    fn name(&self) -> &str {
        "recording-hook"
    }

    async fn run(&self) -> Result<()> {
        self.log.push("hook.run");
        if self.fail.load(Ordering::SeqCst) {
            return Err(HcfError::Config("hook failed".into()));
        }
        Ok(())
    }
}

/// Orchestrator wired to mocks, with handles to every double.
pub struct Harness {
    pub log: CallLog,
    pub persistence: Arc<MockPersistence>,
    pub commands: Arc<MockSubsystem>,
    pub events: Arc<MockSubsystem>,
    pub provider: Arc<RecordingProvider>,
    pub orchestrator: Arc<ServiceOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Duration::ZERO, None)
    }

    pub fn with_init_delay(delay: Duration) -> Self {
        Self::build(delay, None)
    }

    /// `hook` should record into `log` so ordering can be asserted.
    pub fn with_hook(log: CallLog, hook: Arc<dyn Hook>) -> Self {
        Self::build_with_log(log, Duration::ZERO, Some(hook))
    }

    fn build(delay: Duration, hook: Option<Arc<dyn Hook>>) -> Self {
        Self::build_with_log(CallLog::default(), delay, hook)
    }

    fn build_with_log(log: CallLog, delay: Duration, hook: Option<Arc<dyn Hook>>) -> Self {
        let persistence = Arc::new(MockPersistence::with_delay(log.clone(), delay));
        let commands = Arc::new(MockSubsystem::new("commands", log.clone()));
        let events = Arc::new(MockSubsystem::new("events", log.clone()));
        let provider = Arc::new(RecordingProvider::new(log.clone(), HcfConfig::default()));

        let mut orchestrator = ServiceOrchestrator::new(
            provider.clone(),
            persistence.clone(),
            commands.clone(),
            events.clone(),
        );
        if let Some(hook) = hook {
            orchestrator = orchestrator.with_post_start_hook(hook);
        }

        Self {
            log,
            persistence,
            commands,
            events,
            provider,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
