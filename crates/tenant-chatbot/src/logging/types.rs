use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MESSAGE_EVENT: &str = "chatbot.message";
pub const WORKFLOW_TRIGGERED_EVENT: &str = "chatbot.workflow_triggered";

/// Named analytics event with a flat string payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatbotAnalyticsEvent {
    pub name: String,
    pub payload: BTreeMap<String, String>,
    pub recorded_at: DateTime<Utc>,
}

impl ChatbotAnalyticsEvent {
    pub fn new(name: impl Into<String>, payload: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            payload,
            recorded_at: Utc::now(),
        }
    }

    /// Create builder for fluent API
    pub fn builder(name: impl Into<String>) -> ChatbotAnalyticsEventBuilder {
        ChatbotAnalyticsEventBuilder::new(name)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

pub struct ChatbotAnalyticsEventBuilder {
    name: String,
    payload: BTreeMap<String, String>,
}

impl ChatbotAnalyticsEventBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: BTreeMap::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.payload.insert(key.into(), value.to_string());
        self
    }

    pub fn build(self) -> ChatbotAnalyticsEvent {
        ChatbotAnalyticsEvent::new(self.name, self.payload)
    }
}
