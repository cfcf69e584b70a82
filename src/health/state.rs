//! Health snapshot types.
//!
//! # States
//! - Database: HEALTHY / UNHEALTHY / NOT_INITIALIZED
//! - Commands, Events: INITIALIZED / NOT_INITIALIZED
//!
//! # Design Decisions
//! - Snapshots are plain values; nothing reacts to them
//! - Serializable so they can be logged as one structured field

use std::fmt;

use serde::Serialize;

use crate::lifecycle::OrchestratorState;
use crate::storage::PoolStatus;

/// Coarse status of a single subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubsystemStatus {
    Healthy,
    Unhealthy,
    Initialized,
    NotInitialized,
}

impl SubsystemStatus {
    /// Status of a surface that only reports liveness.
    pub fn from_running(running: bool) -> Self {
        if running {
            SubsystemStatus::Initialized
        } else {
            SubsystemStatus::NotInitialized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubsystemStatus::Healthy => "HEALTHY",
            SubsystemStatus::Unhealthy => "UNHEALTHY",
            SubsystemStatus::Initialized => "INITIALIZED",
            SubsystemStatus::NotInitialized => "NOT_INITIALIZED",
        }
    }
}

impl fmt::Display for SubsystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the service core, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthInfo {
    pub started: bool,
    pub state: OrchestratorState,
    pub active_services: usize,
    pub database: SubsystemStatus,
    pub commands: SubsystemStatus,
    pub events: SubsystemStatus,
    pub pool: Option<PoolStatus>,
}

impl HealthInfo {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for HealthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== HCF Application Service Health ===")?;
        writeln!(f, "Started: {}", self.started)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Active Services: {}", self.active_services)?;
        writeln!(f, "Database: {}", self.database)?;
        writeln!(f, "Commands: {}", self.commands)?;
        write!(f, "Events: {}", self.events)?;
        if let Some(pool) = &self.pool {
            write!(f, "\n{}", pool)?;
        }
        Ok(())
    }
}
