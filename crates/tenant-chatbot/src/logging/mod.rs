//! Chatbot analytics events and the in-memory sink

mod analytics;
pub mod types;

pub use analytics::{AnalyticsSink, ChatbotAnalytics};
pub use types::{ChatbotAnalyticsEvent, MESSAGE_EVENT, WORKFLOW_TRIGGERED_EVENT};
