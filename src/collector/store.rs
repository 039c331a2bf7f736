//! In-memory event store, newest first.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::error::CollectorError;
use crate::dashboard::{NetworkEvent, OrgStats, StatsSummary};
use crate::display::local_timestamp;

/// Org label used when an event has no `recordedBy`.
pub const UNKNOWN_ORG: &str = "Unknown";

/// Bounded, shared list of received events.
///
/// Events are kept as the JSON the reporter sent, plus a `received_at`
/// stamp; nothing else about their shape is enforced.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: Arc<RwLock<VecDeque<Value>>>,
    max_events: usize,
}

impl EventStore {
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(VecDeque::new())),
            max_events,
        }
    }

    #[must_use]
    pub fn max_events(&self) -> usize {
        self.max_events
    }

    /// Stamp and store an event, evicting the oldest beyond capacity.
    ///
    /// Returns the stored event.
    ///
    /// # Errors
    ///
    /// Returns an error if `event` is not a JSON object.
    pub async fn record(&self, mut event: Value) -> Result<Value, CollectorError> {
        let Some(fields) = event.as_object_mut() else {
            return Err(CollectorError::InvalidEvent(format!(
                "expected a JSON object, got {}",
                json_kind(&event)
            )));
        };
        fields.insert(
            "received_at".to_string(),
            Value::String(local_timestamp()),
        );

        let mut events = self.events.write().await;
        events.push_front(event.clone());
        events.truncate(self.max_events);
        Ok(event)
    }

    /// Up to `limit` events, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<Value> {
        self.events.read().await.iter().take(limit).cloned().collect()
    }

    /// Up to `limit` events read as [`NetworkEvent`], newest first.
    pub async fn recent_typed(&self, limit: usize) -> Vec<NetworkEvent> {
        self.events
            .read()
            .await
            .iter()
            .take(limit)
            .map(|event| NetworkEvent::from_value(event.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Totals over every stored event.
    pub async fn stats(&self) -> StatsSummary {
        let events = self.events.read().await;
        let count = |kind: &str| {
            events
                .iter()
                .filter(|event| event.get("eventType").and_then(Value::as_str) == Some(kind))
                .count() as u64
        };

        StatsSummary {
            total: events.len() as u64,
            spoofing: count("spoofing"),
            new_devices: count("new"),
            matches: count("match"),
        }
    }

    /// Report counts per `recordedBy`, in order of first appearance from newest.
    pub async fn org_stats(&self) -> OrgStats {
        let events = self.events.read().await;
        let mut stats = OrgStats::default();
        for event in events.iter() {
            match event.get("recordedBy") {
                None | Some(Value::Null) => stats.increment(UNKNOWN_ORG),
                Some(Value::String(org)) => stats.increment(org),
                Some(other) => stats.increment(&other.to_string()),
            }
        }
        stats
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
