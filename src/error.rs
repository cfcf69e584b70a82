//! Error types shared by every subsystem.
//!
//! # Design Decisions
//! - One crate-wide enum; leaf errors are wrapped, not flattened
//! - `StartFailed`/`ReloadFailed` carry the underlying cause as `source()`
//! - Shutdown failures are constructed for logging only and never escape `stop()`

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HcfError>;

#[derive(Debug, Error)]
pub enum HcfError {
    /// Missing or invalid settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subsystem could not be brought up.
    #[error("failed to initialize {subsystem}: {reason}")]
    Initialization { subsystem: String, reason: String },

    /// Integrity verification found failing subsystems.
    #[error("integrity check failed: {}", .0.join(", "))]
    Unhealthy(Vec<String>),

    #[error("connection pool is already initialized")]
    AlreadyInitialized,

    #[error("connection pool is not initialized")]
    NotInitialized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A subsystem failed to stop cleanly.
    #[error("failed to shut down {subsystem}: {reason}")]
    Shutdown { subsystem: String, reason: String },

    #[error("service start failed: {0}")]
    StartFailed(#[source] Box<HcfError>),

    #[error("service reload failed: {0}")]
    ReloadFailed(#[source] Box<HcfError>),
}

impl HcfError {
    pub fn initialization(subsystem: impl Into<String>, reason: impl ToString) -> Self {
        HcfError::Initialization {
            subsystem: subsystem.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shutdown(subsystem: impl Into<String>, reason: impl ToString) -> Self {
        HcfError::Shutdown {
            subsystem: subsystem.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ConfigError> for HcfError {
    fn from(err: ConfigError) -> Self {
        HcfError::Config(err.to_string())
    }
}
