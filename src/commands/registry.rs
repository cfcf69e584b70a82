//! Command registry and dispatch.
//!
//! # Responsibilities
//! - Map command names and aliases to implementations
//! - Gate execution on the command's permission check
//! - Contain handler errors and panics so one bad command cannot take the
//!   dispatcher down

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::FutureExt;

use crate::commands::sender::CommandSender;
use crate::error::Result;
use crate::lifecycle::Subsystem;

pub const NO_PERMISSION: &str = "You don't have permission to use this command.";
pub const INTERNAL_ERROR: &str = "An internal error occurred while executing this command.";

/// A chat command.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    fn has_permission(&self, _sender: &CommandSender) -> bool {
        true
    }

    /// Returns `Ok(false)` to signal a usage error.
    async fn execute(&self, sender: &CommandSender, label: &str, args: &[String]) -> Result<bool>;

    fn tab_complete(&self, _sender: &CommandSender, _args: &[String]) -> Vec<String> {
        Vec::new()
    }
}

/// Options that start with `input`, ignoring case.
pub fn filter_starting_with(input: &str, options: &[&str]) -> Vec<String> {
    let prefix = input.to_lowercase();
    options
        .iter()
        .filter(|o| o.to_lowercase().starts_with(&prefix))
        .map(|o| o.to_string())
        .collect()
}

/// The command surface.
pub struct CommandRegistry {
    commands: DashMap<String, Arc<dyn Command>>,
    running: AtomicBool,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: DashMap::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Register `command` under its name and every alias.
    pub fn register(&self, command: Arc<dyn Command>) {
        let labels = std::iter::once(command.name().to_string())
            .chain(command.aliases().iter().map(|a| a.to_string()));
        for label in labels {
            let key = label.to_lowercase();
            if self.commands.insert(key.clone(), command.clone()).is_some() {
                tracing::warn!(label = %key, "Command label re-registered, replacing previous");
            }
        }
        tracing::debug!(command = command.name(), "Command registered");
    }

    pub fn get(&self, label: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&label.to_lowercase()).map(|c| c.value().clone())
    }

    /// Number of registered labels, aliases included.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run the command registered for `label`.
    ///
    /// Returns `false` when no such command exists or the surface is down.
    pub async fn dispatch(&self, sender: &CommandSender, label: &str, args: &[String]) -> bool {
        if !self.is_running() {
            tracing::warn!(label = %label, "Command surface not running, ignoring command");
            return false;
        }
        let Some(command) = self.get(label) else {
            return false;
        };

        if !command.has_permission(sender) {
            sender.send_message(NO_PERMISSION);
            return true;
        }

        let outcome = AssertUnwindSafe(command.execute(sender, label, args))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(handled)) => handled,
            Ok(Err(e)) => {
                tracing::error!(command = command.name(), sender = sender.name(), error = %e, "Command failed");
                sender.send_message(INTERNAL_ERROR);
                true
            }
            Err(_) => {
                tracing::error!(command = command.name(), sender = sender.name(), "Command panicked");
                sender.send_message(INTERNAL_ERROR);
                true
            }
        }
    }

    pub fn tab_complete(&self, sender: &CommandSender, label: &str, args: &[String]) -> Vec<String> {
        match self.get(label) {
            Some(command) if command.has_permission(sender) => command.tab_complete(sender, args),
            _ => Vec::new(),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subsystem for CommandRegistry {
    fn name(&self) -> &'static str {
        "commands"
    }

    async fn initialize(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        tracing::info!(labels = self.commands.len(), "Command surface ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
