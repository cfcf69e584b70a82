//! StrafeHCF service core.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ FileConfigProvider ──▶ ServiceOrchestrator
//!                                            │ start (in order)
//!                                            ├─▶ PoolManager      (database)
//!                                            ├─▶ CommandRegistry  (/hcf ...)
//!                                            └─▶ EventBridge      (player events)
//!
//!   LifecycleScheduler ──▶ health check / cleanup / statistics
//!
//!   SIGHUP, file change ──▶ reload     SIGINT/SIGTERM ──▶ shutdown
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use strafe_hcf::lifecycle::startup::{self, StartupOptions};

#[derive(Parser, Debug)]
#[command(name = "strafe-hcf", version, about = "StrafeHCF service core")]
struct Cli {
    /// Path to the TOML configuration (created with defaults if missing)
    #[arg(short, long, default_value = "hcf.toml")]
    config: PathBuf,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = StartupOptions {
        config_path: cli.config,
        log_level: cli.log_level,
        json_logs: cli.json_logs,
    };

    match startup::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("strafe-hcf: {e}");
            ExitCode::FAILURE
        }
    }
}
