//! Command senders.

use std::collections::HashSet;

use parking_lot::Mutex;

/// Whoever issued a command: the console or a player.
///
/// Replies are buffered; the host adapter drains them with
/// [`CommandSender::take_messages`] and forwards them to the client.
#[derive(Debug)]
pub struct CommandSender {
    name: String,
    operator: bool,
    permissions: HashSet<String>,
    messages: Mutex<Vec<String>>,
}

impl CommandSender {
    /// The server console; holds every permission.
    pub fn console() -> Self {
        Self {
            name: "CONSOLE".to_string(),
            operator: true,
            permissions: HashSet::new(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn player<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            operator: false,
            permissions: permissions.into_iter().map(Into::into).collect(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.operator || self.permissions.contains(permission)
    }

    pub fn send_message(&self, message: impl Into<String>) {
        self.messages.lock().push(message.into());
    }

    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }
}
