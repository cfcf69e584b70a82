//! Host event bridge.
//!
//! # Responsibilities
//! - Translate host player join/quit/kick callbacks into [`DomainEvent`]s
//! - Track which players are online while the surface is running
//! - Forget every session on shutdown
//!
//! # Design Decisions
//! - Broadcast channel: slow subscribers lag, they never block the host
//! - Callbacks received while stopped are dropped

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;
use crate::lifecycle::Subsystem;

const CHANNEL_CAPACITY: usize = 256;

/// Player activity published to the rest of the add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    PlayerJoined { player_id: Uuid, name: String },
    PlayerLeft { player_id: Uuid, name: String },
    PlayerKicked { player_id: Uuid, name: String, reason: String },
}

/// The event surface.
pub struct EventBridge {
    online: DashMap<Uuid, String>,
    tx: broadcast::Sender<DomainEvent>,
    running: AtomicBool,
}

impl EventBridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            online: DashMap::new(),
            tx,
            running: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: DomainEvent) {
        tracing::debug!(event = ?event, "Publishing domain event");
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }

    pub fn on_player_join(&self, player_id: Uuid, name: &str) {
        if !self.is_running() {
            tracing::debug!(player = %name, "Event surface stopped, dropping join");
            return;
        }
        self.online.insert(player_id, name.to_string());
        tracing::info!(player = %name, id = %player_id, "Player joined");
        self.publish(DomainEvent::PlayerJoined {
            player_id,
            name: name.to_string(),
        });
    }

    pub fn on_player_quit(&self, player_id: Uuid) {
        if !self.is_running() {
            return;
        }
        if let Some((_, name)) = self.online.remove(&player_id) {
            tracing::info!(player = %name, id = %player_id, "Player left");
            self.publish(DomainEvent::PlayerLeft { player_id, name });
        }
    }

    pub fn on_player_kick(&self, player_id: Uuid, reason: &str) {
        if !self.is_running() {
            return;
        }
        if let Some((_, name)) = self.online.remove(&player_id) {
            tracing::info!(player = %name, id = %player_id, reason = %reason, "Player kicked");
            self.publish(DomainEvent::PlayerKicked {
                player_id,
                name,
                reason: reason.to_string(),
            });
        }
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }

    pub fn is_online(&self, player_id: &Uuid) -> bool {
        self.online.contains_key(player_id)
    }

    pub fn player_name(&self, player_id: &Uuid) -> Option<String> {
        self.online.get(player_id).map(|n| n.value().clone())
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subsystem for EventBridge {
    fn name(&self) -> &'static str {
        "events"
    }

    async fn initialize(&self) -> Result<()> {
        self.running.store(true, Ordering::Release);
        tracing::info!("Event surface ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.running.store(false, Ordering::Release);
        let tracked = self.online.len();
        self.online.clear();
        tracing::info!(cleared_sessions = tracked, "Event surface stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
