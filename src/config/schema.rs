//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the add-on.
//! All types derive Serde traits for deserialization from config files, and
//! every group falls back to its defaults so a partial file is accepted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct HcfConfig {
    /// Persistent storage backend and pool sizing.
    pub database: DatabaseConfig,

    /// Scheduler periods and shutdown behaviour.
    pub lifecycle: LifecycleConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    pub teams: TeamsConfig,
    pub combat: CombatConfig,
    pub deathban: DeathbanConfig,
    pub claims: ClaimsConfig,
    pub koth: KothConfig,
    pub classes: ClassesConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend kind: `POSTGRESQL`, `MYSQL`, `H2` or `SQLITE` (case-insensitive).
    #[serde(rename = "type")]
    pub kind: String,
    pub host: String,
    pub port: u16,
    /// Database name; for the embedded backend, the file stem.
    pub name: String,
    pub username: String,
    pub password: String,
    /// Root directory for the embedded backend's `data/` folder.
    pub data_dir: String,
    pub pool: PoolConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: "H2".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            name: "strafehcf".to_string(),
            username: "strafehcf".to_string(),
            password: "changeme".to_string(),
            data_dir: ".".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

/// Connection pool sizing and timeouts (milliseconds).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    pub maximum_pool_size: u32,
    pub minimum_idle: u32,
    pub connection_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
    /// Connections held longer than this are reported as possible leaks.
    pub leak_detection_threshold: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            maximum_pool_size: 10,
            minimum_idle: 5,
            connection_timeout: 30_000,
            idle_timeout: 600_000,
            max_lifetime: 1_800_000,
            leak_detection_threshold: 60_000,
        }
    }
}

impl PoolConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_millis(self.max_lifetime)
    }

    pub fn leak_detection_threshold(&self) -> Duration {
        Duration::from_millis(self.leak_detection_threshold)
    }
}

/// Recurring task periods and shutdown settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    pub health_check_interval_secs: u64,
    pub cleanup_interval_secs: u64,
    pub statistics_interval_secs: u64,
    /// Grace period for in-flight tasks before they are aborted.
    pub shutdown_timeout_secs: u64,
    /// Stop the scheduler on SIGINT/SIGTERM.
    ///
    /// Installing the handlers replaces the default terminate disposition;
    /// the host must exit the process itself (the binary's signal loop does).
    pub termination_hook: bool,
    /// Reload when the config file changes on disk.
    pub watch_config: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: 300,
            cleanup_interval_secs: 3600,
            statistics_interval_secs: 1800,
            shutdown_timeout_secs: 10,
            termination_hook: true,
            watch_config: false,
        }
    }
}

impl LifecycleConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn statistics_interval(&self) -> Duration {
        Duration::from_secs(self.statistics_interval_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit logs as JSON.
    pub json_format: bool,
    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,
    /// Exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_format: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TeamsConfig {
    pub max_members: u32,
    pub max_claims: u32,
    pub min_members_to_claim: u32,
    pub leader_only_disband: bool,
    pub ally_limit: u32,
    pub dtr: DtrConfig,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            max_members: 15,
            max_claims: 1,
            min_members_to_claim: 3,
            leader_only_disband: true,
            ally_limit: 3,
            dtr: DtrConfig::default(),
        }
    }
}

/// Deaths-till-raidable tuning.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DtrConfig {
    pub starting_dtr: f64,
    pub max_dtr: f64,
    pub loss_per_death: f64,
    pub regen_rate: f64,
    /// Seconds.
    pub regen_interval: u32,
    /// Minutes.
    pub freeze_time: u32,
}

impl Default for DtrConfig {
    fn default() -> Self {
        Self {
            starting_dtr: 1.01,
            max_dtr: 7.2,
            loss_per_death: 1.0,
            regen_rate: 0.1,
            regen_interval: 30,
            freeze_time: 45,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CombatConfig {
    pub tag_duration: u32,
    pub logout_timer: u32,
    pub pvp_protection: PvpProtectionConfig,
    pub cooldowns: CooldownConfig,
    pub strength_nerf: StrengthNerfConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            tag_duration: 45,
            logout_timer: 10,
            pvp_protection: PvpProtectionConfig::default(),
            cooldowns: CooldownConfig::default(),
            strength_nerf: StrengthNerfConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PvpProtectionConfig {
    pub enabled: bool,
    /// Minutes.
    pub duration: u32,
}

impl Default for PvpProtectionConfig {
    fn default() -> Self {
        Self { enabled: true, duration: 30 }
    }
}

/// Item cooldowns in seconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CooldownConfig {
    pub enderpearl: u32,
    pub golden_apple: u32,
    pub enchanted_golden_apple: u32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            enderpearl: 16,
            golden_apple: 45,
            enchanted_golden_apple: 10_800,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StrengthNerfConfig {
    pub enabled: bool,
    pub nerf_percentage: f64,
}

impl Default for StrengthNerfConfig {
    fn default() -> Self {
        Self { enabled: true, nerf_percentage: 33.5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DeathbanConfig {
    /// Minutes.
    pub default_time: u32,
    pub arena: ArenaConfig,
}

impl Default for DeathbanConfig {
    fn default() -> Self {
        Self { default_time: 45, arena: ArenaConfig::default() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub enabled: bool,
    pub world: String,
    /// Minutes removed from a deathban per arena kill.
    pub kill_reduction_time: u32,
    pub spawn_location: SpawnLocation,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            world: "world".to_string(),
            kill_reduction_time: 5,
            spawn_location: SpawnLocation::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SpawnLocation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for SpawnLocation {
    fn default() -> Self {
        Self { x: 0.0, y: 100.0, z: 0.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClaimsConfig {
    pub tool: String,
    pub cost_per_block: f64,
    pub min_size: u32,
    pub max_size: u32,
    pub buffer_distance: u32,
    pub allowed_worlds: Vec<String>,
    pub overclaim: OverclaimConfig,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            tool: "GOLDEN_HOE".to_string(),
            cost_per_block: 0.5,
            min_size: 10,
            max_size: 50,
            buffer_distance: 5,
            allowed_worlds: vec!["world".to_string()],
            overclaim: OverclaimConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OverclaimConfig {
    pub enabled: bool,
    pub only_when_raidable: bool,
}

impl Default for OverclaimConfig {
    fn default() -> Self {
        Self { enabled: true, only_when_raidable: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KothConfig {
    /// Seconds.
    pub capture_time: u32,
    pub contest_radius: u32,
    pub max_simultaneous: u32,
    pub rewards: Vec<String>,
    pub schedule: KothScheduleConfig,
}

impl Default for KothConfig {
    fn default() -> Self {
        Self {
            capture_time: 900,
            contest_radius: 10,
            max_simultaneous: 1,
            rewards: Vec::new(),
            schedule: KothScheduleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct KothScheduleConfig {
    pub enabled: bool,
    /// Wall-clock start times, `HH:MM`.
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct ClassesConfig {
    pub diamond: DiamondClassConfig,
    pub archer: ArcherClassConfig,
    pub bard: BardClassConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiamondClassConfig {
    pub enabled: bool,
}

impl Default for DiamondClassConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ArcherClassConfig {
    pub enabled: bool,
    pub bow_damage_multiplier: f64,
    pub speed_bonus: u32,
    pub tag_duration: u32,
}

impl Default for ArcherClassConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bow_damage_multiplier: 1.25,
            speed_bonus: 1,
            tag_duration: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BardClassConfig {
    pub enabled: bool,
    pub energy: u32,
}

impl Default for BardClassConfig {
    fn default() -> Self {
        Self { enabled: true, energy: 120 }
    }
}
