//! Event surface: host player callbacks in, domain events out.

pub mod bridge;

pub use bridge::{DomainEvent, EventBridge};
