//! Contracts for the pieces the orchestrator and scheduler drive.

use async_trait::async_trait;

use crate::error::Result;

/// A leaf subsystem started and stopped by the orchestrator.
#[async_trait]
pub trait Subsystem: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;

    /// Liveness flag; no deeper probing.
    fn is_running(&self) -> bool;
}

/// A named unit of work run at a lifecycle point (after start, on cleanup).
#[async_trait]
pub trait Hook: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> Result<()>;
}
