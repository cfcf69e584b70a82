//! The `/hcf` administrative command.

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::commands::registry::{filter_starting_with, Command};
use crate::commands::sender::CommandSender;
use crate::error::Result;
use crate::lifecycle::ServiceOrchestrator;

pub const ADMIN_PERMISSION: &str = "strafehcf.admin";
pub const RELOAD_PERMISSION: &str = "strafehcf.admin.reload";
pub const DEBUG_PERMISSION: &str = "strafehcf.admin.debug";

const PUBLIC_SUBCOMMANDS: [&str; 3] = ["help", "version", "status"];
const ADMIN_SUBCOMMANDS: [&str; 5] = ["help", "version", "reload", "status", "debug"];
const DEBUG_TOPICS: [&str; 3] = ["database", "services", "config"];

/// Help, version, status, reload and debug for the service core.
///
/// Holds the orchestrator weakly: the orchestrator owns the command surface
/// that owns this command.
pub struct HcfCommand {
    orchestrator: Weak<ServiceOrchestrator>,
}

impl HcfCommand {
    pub fn new(orchestrator: Weak<ServiceOrchestrator>) -> Self {
        Self { orchestrator }
    }

    fn orchestrator(&self, sender: &CommandSender) -> Option<Arc<ServiceOrchestrator>> {
        let orchestrator = self.orchestrator.upgrade();
        if orchestrator.is_none() {
            sender.send_message("The application service is not available.");
        }
        orchestrator
    }

    fn send_help(&self, sender: &CommandSender) {
        sender.send_message("=== StrafeHCF ===");
        sender.send_message("/hcf help - Show this help");
        sender.send_message("/hcf version - Show version information");
        sender.send_message("/hcf status - Show service status");
        if sender.has_permission(ADMIN_PERMISSION) {
            sender.send_message("Administrator commands:");
            sender.send_message("/hcf reload - Reload the configuration");
            sender.send_message("/hcf debug <database|services|config> - Debug information");
        }
    }

    fn send_version(&self, sender: &CommandSender) {
        sender.send_message(format!("StrafeHCF v{}", env!("CARGO_PKG_VERSION")));
    }

    async fn status(&self, sender: &CommandSender) {
        let Some(orchestrator) = self.orchestrator(sender) else {
            return;
        };
        let healthy = orchestrator.is_healthy().await;
        sender.send_message("=== HCF Server Status ===");
        sender.send_message(format!(
            "Services: {}",
            if healthy { "healthy" } else { "problems detected" }
        ));
        sender.send_message(format!("Active services: {}", orchestrator.active_services()));
        let database = orchestrator.persistence().is_initialized()
            && orchestrator.persistence().is_healthy().await;
        sender.send_message(format!(
            "Database: {}",
            if database { "connected" } else { "disconnected" }
        ));
    }

    async fn reload(&self, sender: &CommandSender) {
        if !sender.has_permission(RELOAD_PERMISSION) {
            sender.send_message("You don't have permission to reload the plugin.");
            return;
        }
        let Some(orchestrator) = self.orchestrator(sender) else {
            return;
        };

        sender.send_message("Reloading StrafeHCF...");
        match orchestrator.reload().await {
            Ok(()) => sender.send_message("StrafeHCF reloaded."),
            Err(e) => {
                tracing::error!(sender = sender.name(), error = %e, "Reload command failed");
                sender.send_message(format!("Reload failed: {}", e));
            }
        }
    }

    async fn debug(&self, sender: &CommandSender, topic: Option<&str>) {
        if !sender.has_permission(DEBUG_PERMISSION) {
            sender.send_message("You don't have permission to use debug commands.");
            return;
        }
        let Some(topic) = topic else {
            sender.send_message("Usage: /hcf debug <database|services|config>");
            return;
        };
        let Some(orchestrator) = self.orchestrator(sender) else {
            return;
        };

        match topic.to_lowercase().as_str() {
            "database" => {
                let persistence = orchestrator.persistence();
                sender.send_message("=== Database Debug ===");
                sender.send_message(format!(
                    "State: {}",
                    if persistence.is_healthy().await { "healthy" } else { "problems" }
                ));
                match persistence.pool_status() {
                    Some(status) => sender.send_message(status.to_string()),
                    None => sender.send_message("Database not initialized"),
                }
            }
            "services" => {
                sender.send_message("=== Services Debug ===");
                let info = orchestrator.health_info().await;
                for line in info.to_string().lines() {
                    sender.send_message(line);
                }
            }
            "config" => {
                let config = orchestrator.config().current();
                let db = &config.database;
                sender.send_message("=== Configuration Debug ===");
                sender.send_message(format!("Database type: {}", db.kind));
                sender.send_message(format!("Host: {}:{}", db.host, db.port));
                sender.send_message(format!("Database: {}", db.name));
                sender.send_message(format!("Pool max: {}", db.pool.maximum_pool_size));
            }
            other => {
                sender.send_message(format!("Unknown debug topic: {}", other));
                sender.send_message("Usage: /hcf debug <database|services|config>");
            }
        }
    }
}

#[async_trait]
impl Command for HcfCommand {
    fn name(&self) -> &str {
        "hcf"
    }

    fn aliases(&self) -> &[&'static str] {
        &["strafehcf"]
    }

    async fn execute(&self, sender: &CommandSender, _label: &str, args: &[String]) -> Result<bool> {
        let Some(sub) = args.first() else {
            self.send_help(sender);
            return Ok(true);
        };

        match sub.to_lowercase().as_str() {
            "help" => self.send_help(sender),
            "version" | "ver" => self.send_version(sender),
            "status" => self.status(sender).await,
            "reload" => self.reload(sender).await,
            "debug" => self.debug(sender, args.get(1).map(String::as_str)).await,
            other => {
                sender.send_message(format!("Unknown subcommand: {}", other));
                self.send_help(sender);
            }
        }
        Ok(true)
    }

    fn tab_complete(&self, sender: &CommandSender, args: &[String]) -> Vec<String> {
        match args {
            [first] => {
                let options: &[&str] = if sender.has_permission(ADMIN_PERMISSION) {
                    &ADMIN_SUBCOMMANDS
                } else {
                    &PUBLIC_SUBCOMMANDS
                };
                filter_starting_with(first, options)
            }
            [first, second] if first.eq_ignore_ascii_case("debug") => {
                filter_starting_with(second, &DEBUG_TOPICS)
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_tab_complete_respects_admin() {
        let command = HcfCommand::new(Weak::new());
        let player = CommandSender::player("Steve", Vec::<String>::new());
        let admin = CommandSender::player("Alex", [ADMIN_PERMISSION]);

        assert_eq!(command.tab_complete(&player, &args(&[""])), vec!["help", "version", "status"]);
        assert_eq!(command.tab_complete(&admin, &args(&["re"])), vec!["reload"]);
        assert_eq!(command.tab_complete(&admin, &args(&["DEBUG", "d"])), vec!["database"]);
        assert!(command.tab_complete(&admin, &args(&["status", "x"])).is_empty());
    }

    #[tokio::test]
    async fn test_version_and_help_without_orchestrator() {
        let command = HcfCommand::new(Weak::new());
        let sender = CommandSender::player("Steve", Vec::<String>::new());

        assert!(command.execute(&sender, "hcf", &args(&["ver"])).await.unwrap());
        assert!(command.execute(&sender, "hcf", &[]).await.unwrap());
        let messages = sender.take_messages();
        assert!(messages[0].starts_with("StrafeHCF v"));
        assert!(!messages.iter().any(|m| m.contains("/hcf reload")));
    }

    #[tokio::test]
    async fn test_reload_requires_permission() {
        let command = HcfCommand::new(Weak::new());
        let sender = CommandSender::player("Steve", [ADMIN_PERMISSION]);

        command.execute(&sender, "hcf", &args(&["reload"])).await.unwrap();
        assert_eq!(
            sender.take_messages(),
            vec!["You don't have permission to reload the plugin."]
        );
    }

    #[tokio::test]
    async fn test_dropped_orchestrator_reported() {
        let command = HcfCommand::new(Weak::new());
        let sender = CommandSender::console();

        command.execute(&sender, "hcf", &args(&["status"])).await.unwrap();
        assert_eq!(
            sender.take_messages(),
            vec!["The application service is not available."]
        );
    }
}
