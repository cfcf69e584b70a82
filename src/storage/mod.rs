//! Persistent storage subsystem.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → backend.rs (kind → connection string, data dir for the embedded store)
//!     → pool.rs (bounded pool → SELECT 1 → CREATE TABLE IF NOT EXISTS)
//!     → PooledConnection handed to callers, returned on drop
//! ```
//!
//! # Design Decisions
//! - One `sqlx::AnyPool` serves PostgreSQL, MySQL and the embedded store
//! - The orchestrator only sees the [`Persistence`] trait

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::error::Result;

pub mod backend;
pub mod pool;
pub mod schema;

pub use backend::BackendKind;
pub use pool::{PoolManager, PoolStatus, PooledConnection};

/// Storage backend as seen by the service orchestrator.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Open the pool for `config`. Fails if already open.
    async fn initialize(&self, config: &DatabaseConfig) -> Result<()>;

    /// Close the pool. Idempotent.
    async fn shutdown(&self) -> Result<()>;

    /// Acquire-and-validate check; never errors.
    async fn is_healthy(&self) -> bool;

    fn is_initialized(&self) -> bool;

    fn pool_status(&self) -> Option<PoolStatus>;
}
