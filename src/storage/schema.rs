//! Table definitions created on pool initialization.
//!
//! Statements are additive only (`CREATE TABLE IF NOT EXISTS`) and use a
//! column vocabulary accepted by PostgreSQL, MySQL and SQLite alike.

pub const CREATE_TEAMS: &str = "CREATE TABLE IF NOT EXISTS teams (
    id VARCHAR(36) PRIMARY KEY,
    name VARCHAR(16) NOT NULL UNIQUE,
    leader_id VARCHAR(36) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    dtr DECIMAL(4,2) NOT NULL DEFAULT 1.01,
    is_raidable BOOLEAN DEFAULT FALSE,
    last_death_time TIMESTAMP NULL
)";

pub const CREATE_PLAYERS: &str = "CREATE TABLE IF NOT EXISTS players (
    id VARCHAR(36) PRIMARY KEY,
    minecraft_uuid VARCHAR(36) NOT NULL UNIQUE,
    username VARCHAR(16) NOT NULL,
    team_id VARCHAR(36) NULL,
    team_role VARCHAR(20) DEFAULT 'MEMBER',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    pvp_protection_until TIMESTAMP NULL,
    deathban_until TIMESTAMP NULL,
    FOREIGN KEY (team_id) REFERENCES teams(id) ON DELETE SET NULL
)";

pub const CREATE_CLAIMS: &str = "CREATE TABLE IF NOT EXISTS claims (
    id VARCHAR(36) PRIMARY KEY,
    team_id VARCHAR(36) NOT NULL,
    world_name VARCHAR(50) NOT NULL,
    min_x INT NOT NULL,
    min_z INT NOT NULL,
    max_x INT NOT NULL,
    max_z INT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (team_id) REFERENCES teams(id) ON DELETE CASCADE
)";

pub const CREATE_KOTH_EVENTS: &str = "CREATE TABLE IF NOT EXISTS koth_events (
    id VARCHAR(36) PRIMARY KEY,
    name VARCHAR(50) NOT NULL,
    world_name VARCHAR(50) NOT NULL,
    center_x INT NOT NULL,
    center_z INT NOT NULL,
    radius INT NOT NULL,
    capture_time INT NOT NULL,
    is_active BOOLEAN DEFAULT FALSE,
    current_controller VARCHAR(36) NULL,
    control_start_time TIMESTAMP NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Creation order respects foreign keys.
pub const TABLES: [(&str, &str); 4] = [
    ("teams", CREATE_TEAMS),
    ("players", CREATE_PLAYERS),
    ("claims", CREATE_CLAIMS),
    ("koth_events", CREATE_KOTH_EVENTS),
];
