//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduled checks (active.rs):
//!     Periodic timer (lifecycle scheduler)
//!     → ServiceOrchestrator::is_healthy()
//!     → log + metrics; snapshot from state.rs on failure
//!
//! Snapshots (state.rs):
//!     ServiceOrchestrator::health_info()
//!     → HealthInfo (display only, nothing acts on it)
//! ```
//!
//! # Design Decisions
//! - Degradation is reported, never acted on automatically
//! - Leaf surfaces report liveness only; the database is actively checked

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::{HealthInfo, SubsystemStatus};
