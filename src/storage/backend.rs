//! Backend selection and connection strings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use url::Url;

use crate::config::DatabaseConfig;
use crate::error::{HcfError, Result};

/// Supported relational backends.
///
/// `H2` is the historical name of the embedded file store; it is served by
/// SQLite here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    MySql,
    Embedded,
}

impl BackendKind {
    /// Whether the backend is reached over the network.
    pub fn is_networked(&self) -> bool {
        !matches!(self, BackendKind::Embedded)
    }

    fn scheme(&self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgres",
            BackendKind::MySql => "mysql",
            BackendKind::Embedded => "sqlite",
        }
    }
}

impl FromStr for BackendKind {
    type Err = HcfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POSTGRESQL" | "POSTGRES" => Ok(BackendKind::Postgres),
            "MYSQL" => Ok(BackendKind::MySql),
            "H2" | "SQLITE" => Ok(BackendKind::Embedded),
            _ => Err(HcfError::Config(format!("unsupported database type: {}", s))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Postgres => "POSTGRESQL",
            BackendKind::MySql => "MYSQL",
            BackendKind::Embedded => "SQLITE",
        };
        f.write_str(name)
    }
}

/// File backing the embedded store: `<data_dir>/data/<name>.db`.
pub fn embedded_path(config: &DatabaseConfig) -> PathBuf {
    Path::new(&config.data_dir)
        .join("data")
        .join(format!("{}.db", config.name))
}

/// Build the connection string for `config`.
///
/// For the embedded backend the `data` directory is created first.
pub fn connection_url(kind: BackendKind, config: &DatabaseConfig) -> Result<String> {
    match kind {
        BackendKind::Embedded => {
            let path = embedded_path(config);
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    HcfError::initialization(
                        "database",
                        format!("cannot create {}: {}", dir.display(), e),
                    )
                })?;
            }
            Ok(format!("sqlite://{}?mode=rwc", path.display()))
        }
        BackendKind::Postgres | BackendKind::MySql => {
            let invalid = |what: &str| {
                HcfError::Config(format!("invalid database {}: {}", what, config.host))
            };
            let mut url = Url::parse(&format!("{}://{}:{}", kind.scheme(), config.host, config.port))
                .map_err(|_| invalid("host"))?;
            url.set_path(&config.name);
            url.set_username(&config.username)
                .map_err(|_| invalid("username for host"))?;
            url.set_password(Some(&config.password))
                .map_err(|_| invalid("password for host"))?;
            Ok(url.to_string())
        }
    }
}

/// Loggable target without credentials.
pub fn describe_target(kind: BackendKind, config: &DatabaseConfig) -> String {
    match kind {
        BackendKind::Embedded => embedded_path(config).display().to_string(),
        _ => format!("{}:{}/{}", config.host, config.port, config.name),
    }
}
