//! Connection pool manager.
//!
//! # Responsibilities
//! - Build a bounded pool for the configured backend
//! - Validate connectivity and ensure the schema exists
//! - Hand out tracked connections (waiting/active counts, leak warnings)
//! - Report health and point-in-time utilization
//!
//! # Design Decisions
//! - One pool per `initialize()`/`shutdown()` pair; a second `initialize()`
//!   is rejected instead of replacing a live pool
//! - The handle lives in an `ArcSwapOption` so readers never take a lock
//! - `is_healthy()` never errors; failures are logged and reported as false

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::any::AnyPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, AnyPool};

use crate::config::DatabaseConfig;
use crate::error::{HcfError, Result};
use crate::storage::backend::{connection_url, describe_target, BackendKind};
use crate::storage::schema::TABLES;
use crate::storage::Persistence;

/// Upper bound for a validation round-trip.
pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(5);

const TEST_QUERY: &str = "SELECT 1";

static INSTALL_DRIVERS: Once = Once::new();

/// Point-in-time pool utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub active: u32,
    pub idle: u32,
    pub waiting: u32,
    pub total: u32,
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool Status - Active: {}, Idle: {}, Waiting: {}, Total: {}",
            self.active, self.idle, self.waiting, self.total
        )
    }
}

/// Counters shared between the manager and outstanding connections.
#[derive(Debug, Default)]
struct PoolCounters {
    waiting: AtomicUsize,
    leaks_detected: AtomicU64,
    leak_threshold_ms: AtomicU64,
}

/// Decrements the waiting count even if the acquire future is dropped.
struct WaitingGuard<'a>(&'a PoolCounters);

impl<'a> WaitingGuard<'a> {
    fn enter(counters: &'a PoolCounters) -> Self {
        counters.waiting.fetch_add(1, Ordering::Relaxed);
        Self(counters)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.waiting.fetch_sub(1, Ordering::Relaxed);
    }
}

/// A connection checked out of the pool.
///
/// Returned to the pool on drop; holding it past the leak-detection
/// threshold logs a warning at that point.
pub struct PooledConnection {
    conn: PoolConnection<Any>,
    acquired_at: Instant,
    counters: Arc<PoolCounters>,
}

impl PooledConnection {
    /// How long this connection has been checked out.
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

impl Deref for PooledConnection {
    type Target = AnyConnection;
    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let threshold = self.counters.leak_threshold_ms.load(Ordering::Relaxed);
        let held = self.acquired_at.elapsed();
        if threshold > 0 && held > Duration::from_millis(threshold) {
            self.counters.leaks_detected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                held_ms = held.as_millis() as u64,
                threshold_ms = threshold,
                "Connection held past leak-detection threshold"
            );
        }
    }
}

/// Owner of the relational connection pool.
pub struct PoolManager {
    pool: ArcSwapOption<AnyPool>,
    initialized: AtomicBool,
    counters: Arc<PoolCounters>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self {
            pool: ArcSwapOption::const_empty(),
            initialized: AtomicBool::new(false),
            counters: Arc::new(PoolCounters::default()),
        }
    }

    /// Build the pool, validate it and create the schema.
    pub async fn initialize(&self, config: &DatabaseConfig) -> Result<()> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(HcfError::AlreadyInitialized);
        }

        match self.build(config).await {
            Ok(pool) => {
                self.pool.store(Some(Arc::new(pool)));
                Ok(())
            }
            Err(e) => {
                self.initialized.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    async fn build(&self, config: &DatabaseConfig) -> Result<AnyPool> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let kind: BackendKind = config.kind.parse()?;
        let url = connection_url(kind, config)?;
        let target = describe_target(kind, config);
        let pool_cfg = &config.pool;

        tracing::info!(
            backend = %kind,
            target = %target,
            max_connections = pool_cfg.maximum_pool_size,
            min_idle = pool_cfg.minimum_idle,
            "Initializing connection pool"
        );

        let pool = AnyPoolOptions::new()
            .max_connections(pool_cfg.maximum_pool_size)
            .min_connections(pool_cfg.minimum_idle)
            .acquire_timeout(pool_cfg.connection_timeout())
            .idle_timeout(Some(pool_cfg.idle_timeout()))
            .max_lifetime(Some(pool_cfg.max_lifetime()))
            .connect(&url)
            .await
            .map_err(|e| HcfError::initialization("database", e))?;

        if let Err(e) = Self::prepare(&pool).await {
            pool.close().await;
            return Err(e);
        }

        self.counters
            .leak_threshold_ms
            .store(pool_cfg.leak_detection_threshold, Ordering::Relaxed);

        tracing::info!(
            backend = %kind,
            size = pool.size(),
            "Connection pool ready"
        );
        Ok(pool)
    }

    async fn prepare(pool: &AnyPool) -> Result<()> {
        match tokio::time::timeout(VALIDATION_TIMEOUT, sqlx::query(TEST_QUERY).execute(pool)).await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(HcfError::initialization("database", e)),
            Err(_) => {
                return Err(HcfError::initialization(
                    "database",
                    "validation query timed out",
                ))
            }
        }

        for (table, ddl) in TABLES {
            sqlx::query(ddl).execute(pool).await.map_err(|e| {
                HcfError::initialization("database", format!("creating table {}: {}", table, e))
            })?;
        }
        tracing::debug!(tables = TABLES.len(), "Schema verified");
        Ok(())
    }

    /// Check a connection out of the pool.
    pub async fn get_connection(&self) -> Result<PooledConnection> {
        let pool = self.pool.load_full().ok_or(HcfError::NotInitialized)?;

        let conn = {
            let _waiting = WaitingGuard::enter(&self.counters);
            pool.acquire().await?
        };

        Ok(PooledConnection {
            conn,
            acquired_at: Instant::now(),
            counters: self.counters.clone(),
        })
    }

    /// Acquire and validate a connection within [`VALIDATION_TIMEOUT`].
    pub async fn is_healthy(&self) -> bool {
        let Some(pool) = self.pool.load_full() else {
            return false;
        };

        let validation = async {
            let mut conn = pool.acquire().await?;
            sqlx::query(TEST_QUERY).execute(&mut *conn).await?;
            Ok::<_, sqlx::Error>(())
        };

        match tokio::time::timeout(VALIDATION_TIMEOUT, validation).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = VALIDATION_TIMEOUT.as_secs(),
                    "Database health check timed out"
                );
                false
            }
        }
    }

    /// Close the pool if open. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        if let Some(pool) = self.pool.swap(None) {
            tracing::info!("Closing connection pool");
            pool.close().await;
            tracing::info!("Connection pool closed");
        }
        self.initialized.store(false, Ordering::Release);
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.load().is_some()
    }

    /// Current utilization, or `None` when no pool is open.
    pub fn pool_status(&self) -> Option<PoolStatus> {
        let pool = self.pool.load_full()?;
        let total = pool.size();
        let idle = u32::try_from(pool.num_idle()).unwrap_or(u32::MAX).min(total);
        let waiting = u32::try_from(self.counters.waiting.load(Ordering::Relaxed)).unwrap_or(u32::MAX);
        Some(PoolStatus {
            active: total - idle,
            idle,
            waiting,
            total,
        })
    }

    /// Connections returned after exceeding the leak-detection threshold.
    pub fn leaks_detected(&self) -> u64 {
        self.counters.leaks_detected.load(Ordering::Relaxed)
    }
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Persistence for PoolManager {
    async fn initialize(&self, config: &DatabaseConfig) -> Result<()> {
        PoolManager::initialize(self, config).await
    }

    async fn shutdown(&self) -> Result<()> {
        PoolManager::shutdown(self).await;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        PoolManager::is_healthy(self).await
    }

    fn is_initialized(&self) -> bool {
        PoolManager::is_initialized(self)
    }

    fn pool_status(&self) -> Option<PoolStatus> {
        PoolManager::pool_status(self)
    }
}
