//! Player notifications for completed construction and research.
//!
//! Delivery is best-effort: callers log a failed publish and carry on, the
//! state change that triggered it is never rolled back.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::world::PlayerId;

pub const SHIP_COMPLETED: &str = "ship:completed";
pub const BUILDING_COMPLETED: &str = "building:completed";
pub const RESEARCH_COMPLETED: &str = "research:completed";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
    #[error("notification sink lock poisoned")]
    Poisoned,
}

/// A single event addressed to one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub player_id: PlayerId,
    pub event: String,
    pub payload: Value,
}

pub trait NotificationSink: Send + Sync {
    fn publish(&self, player_id: PlayerId, event: &str, payload: &Value) -> Result<(), NotifyError>;
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn publish(
        &self,
        _player_id: PlayerId,
        _event: &str,
        _payload: &Value,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Emits every notification as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(
        &self,
        player_id: PlayerId,
        event: &str,
        payload: &Value,
    ) -> Result<(), NotifyError> {
        info!(player_id, event, payload = %payload, "player notification");
        Ok(())
    }
}

/// Keeps notifications in memory so they can be listed later.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Result<Vec<Notification>, NotifyError> {
        let guard = self.events.lock().map_err(|_| NotifyError::Poisoned)?;
        Ok(guard.clone())
    }

    /// Notifications for one player, oldest first.
    pub fn for_player(&self, player_id: PlayerId) -> Result<Vec<Notification>, NotifyError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|n| n.player_id == player_id)
            .collect())
    }
}

impl NotificationSink for MemorySink {
    fn publish(
        &self,
        player_id: PlayerId,
        event: &str,
        payload: &Value,
    ) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().map_err(|_| NotifyError::Poisoned)?;
        guard.push(Notification {
            player_id,
            event: event.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.publish(1, SHIP_COMPLETED, &json!({"ship_id": 4}))
            .unwrap();
        sink.publish(2, BUILDING_COMPLETED, &json!({"building_id": 9}))
            .unwrap();
        sink.publish(1, RESEARCH_COMPLETED, &json!({"research_id": 3}))
            .unwrap();

        let events: Vec<String> = sink
            .for_player(1)
            .unwrap()
            .into_iter()
            .map(|n| n.event)
            .collect();
        assert_eq!(events, vec![SHIP_COMPLETED, RESEARCH_COMPLETED]);
        assert_eq!(sink.list().unwrap().len(), 3);
    }
}
