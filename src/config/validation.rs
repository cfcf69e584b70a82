//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool bounds, ports)
//! - Check that networked backends have somewhere to connect to
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HcfConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::HcfConfig;
use crate::storage::BackendKind;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &HcfConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let db = &config.database;
    if db.kind.trim().is_empty() {
        errors.push(ValidationError::new("database.type", "must not be empty"));
    } else {
        match db.kind.parse::<BackendKind>() {
            Ok(kind) if kind.is_networked() => {
                if db.host.trim().is_empty() {
                    errors.push(ValidationError::new("database.host", "must not be empty"));
                }
                if db.port == 0 {
                    errors.push(ValidationError::new("database.port", "must be greater than 0"));
                }
            }
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::new(
                "database.type",
                format!("unsupported database type '{}'", db.kind),
            )),
        }
    }
    if db.name.trim().is_empty() {
        errors.push(ValidationError::new("database.name", "must not be empty"));
    }

    let pool = &db.pool;
    if pool.maximum_pool_size == 0 {
        errors.push(ValidationError::new(
            "database.pool.maximum_pool_size",
            "must be at least 1",
        ));
    }
    if pool.minimum_idle > pool.maximum_pool_size {
        errors.push(ValidationError::new(
            "database.pool.minimum_idle",
            "must not exceed maximum_pool_size",
        ));
    }
    for (field, value) in [
        ("database.pool.connection_timeout", pool.connection_timeout),
        ("database.pool.idle_timeout", pool.idle_timeout),
        ("database.pool.max_lifetime", pool.max_lifetime),
        ("database.pool.leak_detection_threshold", pool.leak_detection_threshold),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let lifecycle = &config.lifecycle;
    for (field, value) in [
        ("lifecycle.health_check_interval_secs", lifecycle.health_check_interval_secs),
        ("lifecycle.cleanup_interval_secs", lifecycle.cleanup_interval_secs),
        ("lifecycle.statistics_interval_secs", lifecycle.statistics_interval_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.teams.max_members == 0 {
        errors.push(ValidationError::new("teams.max_members", "must be greater than 0"));
    }
    if config.combat.tag_duration == 0 {
        errors.push(ValidationError::new("combat.tag_duration", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&HcfConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = HcfConfig::default();
        config.database.pool.maximum_pool_size = 2;
        config.database.pool.minimum_idle = 3;
        config.teams.max_members = 0;
        config.combat.tag_duration = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["database.pool.minimum_idle", "teams.max_members", "combat.tag_duration"]
        );
    }

    #[test]
    fn test_networked_backend_needs_host() {
        let mut config = HcfConfig::default();
        config.database.kind = "postgresql".into();
        config.database.host = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "database.host");
    }

    #[test]
    fn test_unsupported_backend_is_named() {
        let mut config = HcfConfig::default();
        config.database.kind = "oracle".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("oracle"));
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config = HcfConfig::default();
        config.lifecycle.cleanup_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "lifecycle.cleanup_interval_secs");
    }
}
