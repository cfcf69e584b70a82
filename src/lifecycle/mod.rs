//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Logging/metrics → Orchestrator start → Scheduler start
//!
//! Orchestrator (orchestrator.rs):
//!     Database → Commands → Events → Integrity check → Post-start hooks
//!     Any failure → unwind in reverse → Stopped
//!
//! Scheduler (scheduler.rs):
//!     Health check / cleanup / statistics on fixed periods
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → periodic loops exit → bounded wait → abort stragglers
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger reload
//! ```
//!
//! # Design Decisions
//! - Ordered startup: storage first, then the surfaces that depend on it
//! - Ordered shutdown: exact reverse of startup
//! - Only the scheduler's shutdown has a timeout and forced cancellation

pub mod orchestrator;
pub mod scheduler;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod subsystem;

pub use orchestrator::{OrchestratorState, ServiceOrchestrator};
pub use scheduler::LifecycleScheduler;
pub use shutdown::Shutdown;
pub use subsystem::{Hook, Subsystem};
