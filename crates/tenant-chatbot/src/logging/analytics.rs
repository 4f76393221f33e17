use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::debug;

use super::types::ChatbotAnalyticsEvent;

/// Destination for analytics events. Implementations must not block.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: ChatbotAnalyticsEvent);
}

/// In-memory, append-only analytics recorder
#[derive(Default)]
pub struct ChatbotAnalytics {
    events: Mutex<Vec<ChatbotAnalyticsEvent>>,
}

impl ChatbotAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_event(&self, name: &str, payload: BTreeMap<String, String>) {
        self.track(ChatbotAnalyticsEvent::new(name, payload));
    }

    /// Snapshot in emission order
    pub fn events(&self) -> Vec<ChatbotAnalyticsEvent> {
        self.events.lock().clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<ChatbotAnalyticsEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.name == name)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AnalyticsSink for ChatbotAnalytics {
    fn track(&self, event: ChatbotAnalyticsEvent) {
        debug!(event = %event.name, payload = ?event.payload, "analytics event");
        self.events.lock().push(event);
    }
}
