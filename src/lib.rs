//! StrafeHCF service core.
//!
//! Lifecycle and service orchestration for the HCF game-server add-on:
//! a relational connection pool, a command surface and an event surface,
//! started in order, health-checked on a schedule and torn down in reverse.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod storage;

pub use config::schema::HcfConfig;
pub use error::{HcfError, Result};
pub use lifecycle::{LifecycleScheduler, ServiceOrchestrator, Shutdown};
pub use storage::PoolManager;
