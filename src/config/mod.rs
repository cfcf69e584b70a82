//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, defaults written if missing)
//!     → validation.rs (semantic checks)
//!     → HcfConfig (validated, immutable)
//!     → provider.rs hands out Arc<HcfConfig> snapshots
//!
//! On reload (SIGHUP, /hcf reload, file change):
//!     watcher.rs reports the file changed (file change only)
//!     → provider.rs reload → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<HcfConfig>
//!     → orchestrator restarts subsystems against the new snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod provider;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use provider::{ConfigProvider, FileConfigProvider, StaticConfigProvider};
pub use schema::{DatabaseConfig, HcfConfig, LifecycleConfig, ObservabilityConfig, PoolConfig};
