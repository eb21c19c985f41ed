//! Bounded capture of recent webhook deliveries.
//!
//! Backs the `/debug/recent` endpoint so operators can inspect what the
//! provider actually sent without grepping logs. Fixed capacity; the
//! oldest delivery is evicted when full.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::pipeline::types::WebhookReply;

/// How many deliveries are retained.
const RECENT_CAPACITY: usize = 10;

/// One captured delivery: the raw payload plus the acknowledgment we sent.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub payload: Value,
    pub reply: WebhookReply,
}

/// Ring buffer of recent deliveries, shared across request handlers.
#[derive(Clone, Default)]
pub struct RecentEvents {
    inner: Arc<Mutex<VecDeque<StoredEvent>>>,
}

impl RecentEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delivery, evicting the oldest at capacity.
    pub fn push(&self, payload: Value, reply: WebhookReply) {
        let event = StoredEvent {
            event_id: Uuid::new_v4(),
            received_at: Utc::now(),
            payload,
            reply,
        };
        let mut buffer = self.inner.lock().unwrap();
        if buffer.len() == RECENT_CAPACITY {
            buffer.pop_front();
        }
        buffer.push_back(event);
    }

    /// Snapshot, newest last.
    pub fn snapshot(&self) -> Vec<StoredEvent> {
        self.inner.lock().unwrap().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_payload_and_reply() {
        let recent = RecentEvents::new();
        recent.push(json!({"a": 1}), WebhookReply::suppressed("test"));

        let events = recent.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, json!({"a": 1}));
        assert_eq!(events[0].reply.reason.as_deref(), Some("test"));
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let recent = RecentEvents::new();
        for i in 0..(RECENT_CAPACITY + 3) {
            recent.push(json!({"seq": i}), WebhookReply::suppressed("test"));
        }

        let events = recent.snapshot();
        assert_eq!(events.len(), RECENT_CAPACITY);
        assert_eq!(events[0].payload, json!({"seq": 3}));
        assert_eq!(
            events.last().unwrap().payload,
            json!({"seq": RECENT_CAPACITY + 2})
        );
    }
}
