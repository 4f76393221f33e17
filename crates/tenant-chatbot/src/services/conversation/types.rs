use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::models::chat::{ChatMessage, LlmResponse, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MaintenanceRequest,
    RentQuestion,
    LeaseQuestion,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaintenanceRequest => "maintenance_request",
            Self::RentQuestion => "rent_question",
            Self::LeaseQuestion => "lease_question",
            Self::General => "general",
        }
    }
}

/// Follow-up action queued on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    MaintenanceRequest,
    RentReminder,
    RenewalOffer,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaintenanceRequest => "maintenance_request",
            Self::RentReminder => "rent_reminder",
            Self::RenewalOffer => "renewal_offer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub intent: Intent,
    pub timestamp: DateTime<Utc>,
    /// Workflows triggered by this turn
    pub actions: Vec<Workflow>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>, intent: Intent) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            intent,
            timestamp: Utc::now(),
            actions: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, intent: Intent, actions: Vec<Workflow>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            intent,
            timestamp: Utc::now(),
            actions,
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

/// Per-user conversation state, created on the first message
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub user_id: String,
    pub session_id: String,
    pub turns: VecDeque<ConversationTurn>,
    pub pending_workflows: Vec<Workflow>,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: Uuid::new_v4().to_string(),
            turns: VecDeque::new(),
            pending_workflows: Vec::new(),
        }
    }

    /// Append and drop the oldest turns beyond `max_turns`
    pub fn add_turn(&mut self, turn: ConversationTurn, max_turns: usize) {
        self.turns.push_back(turn);
        while self.turns.len() > max_turns {
            self.turns.pop_front();
        }
    }

    /// Last `n` turns in chronological order, in provider message shape
    pub fn recent_messages(&self, n: usize) -> Vec<ChatMessage> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).map(ConversationTurn::to_message).collect()
    }

    pub fn history_length(&self) -> usize {
        self.turns.len()
    }
}

/// Outcome of one handled message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResult {
    pub session_id: String,
    pub intent: Intent,
    pub workflow: Option<Workflow>,
    pub response: LlmResponse,
    /// Titles of the retrieved documents
    pub documents: Vec<String>,
    pub history_length: usize,
}
