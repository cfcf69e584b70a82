//! Configuration providers.
//!
//! # Responsibilities
//! - Hand out the current validated snapshot as `Arc<HcfConfig>`
//! - Re-read the source on reload, keeping the old snapshot on failure
//!
//! # Design Decisions
//! - Snapshots are immutable; a reload swaps the whole `Arc` atomically
//! - Readers never block writers (`ArcSwap`)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::{load_config, load_or_create, ConfigError};
use crate::config::schema::HcfConfig;

/// Source of configuration snapshots for the service core.
pub trait ConfigProvider: Send + Sync {
    /// The snapshot currently in effect.
    fn current(&self) -> Arc<HcfConfig>;

    /// Re-read the backing source and make the result current.
    fn reload(&self) -> Result<Arc<HcfConfig>, ConfigError>;
}

/// Provider backed by a TOML file on disk.
pub struct FileConfigProvider {
    path: PathBuf,
    current: ArcSwap<HcfConfig>,
}

impl FileConfigProvider {
    /// Load `path`, creating it with defaults when missing.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let config = load_or_create(path)?;
        tracing::info!(
            path = %path.display(),
            database_type = %config.database.kind,
            "Configuration loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            current: ArcSwap::from_pointee(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for FileConfigProvider {
    fn current(&self) -> Arc<HcfConfig> {
        self.current.load_full()
    }

    fn reload(&self) -> Result<Arc<HcfConfig>, ConfigError> {
        let config = Arc::new(load_config(&self.path)?);
        self.current.store(config.clone());
        tracing::info!(path = %self.path.display(), "Configuration reloaded");
        Ok(config)
    }
}

/// In-memory provider; `reload` keeps whatever was last `set`.
pub struct StaticConfigProvider {
    current: ArcSwap<HcfConfig>,
}

impl StaticConfigProvider {
    pub fn new(config: HcfConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    pub fn set(&self, config: HcfConfig) {
        self.current.store(Arc::new(config));
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn current(&self) -> Arc<HcfConfig> {
        self.current.load_full()
    }

    fn reload(&self) -> Result<Arc<HcfConfig>, ConfigError> {
        Ok(self.current.load_full())
    }
}
