use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ConversationConfig;
use crate::logging::{AnalyticsSink, ChatbotAnalyticsEvent, MESSAGE_EVENT, WORKFLOW_TRIGGERED_EVENT};
use crate::models::chat::{GenerationRequest, LlmResponse};
use crate::services::rag_service::RagPipeline;
use crate::utils::error::ChatbotError;

use super::cache::SessionStore;
use super::intent::{IntentClassifier, WorkflowContext, WorkflowRules};
use super::types::{ChatResult, ConversationTurn, Workflow};

/// Trait for the completion backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate_response(&self, request: GenerationRequest) -> Result<LlmResponse, ChatbotError>;
}

pub struct ConversationManager {
    sessions: SessionStore,
    rag: Arc<RagPipeline>,
    llm: Arc<dyn ResponseGenerator>,
    analytics: Arc<dyn AnalyticsSink>,
    config: ConversationConfig,
}

impl ConversationManager {
    pub fn new(
        rag: Arc<RagPipeline>,
        llm: Arc<dyn ResponseGenerator>,
        analytics: Arc<dyn AnalyticsSink>,
        config: ConversationConfig,
    ) -> Self {
        Self::with_sessions(rag, llm, analytics, config, SessionStore::new())
    }

    pub fn with_sessions(
        rag: Arc<RagPipeline>,
        llm: Arc<dyn ResponseGenerator>,
        analytics: Arc<dyn AnalyticsSink>,
        config: ConversationConfig,
        sessions: SessionStore,
    ) -> Self {
        info!(
            "Conversation manager ready (history_window={}, max_turns={}, top_k={})",
            config.history_window, config.max_turns, config.retrieval_top_k
        );
        Self {
            sessions,
            rag,
            llm,
            analytics,
            config,
        }
    }

    /// Handle one tenant message end to end.
    ///
    /// Messages for the same user are serialized on the session lock; other
    /// users proceed independently. A moderation rejection leaves the
    /// session untouched and emits no analytics.
    pub async fn handle_message(&self, user_id: &str, message: &str) -> Result<ChatResult, ChatbotError> {
        let session = self.sessions.get_or_create(user_id);
        let mut session = session.lock().await;

        let intent = IntentClassifier::classify(message);
        let retrieval = self.rag.query(message, self.config.retrieval_top_k);
        debug!(
            "Session {} intent={} retrieved={:?}",
            session.session_id,
            intent.as_str(),
            retrieval.titles()
        );

        let request = GenerationRequest::new(message)
            .context(retrieval.context.as_str())
            .history(session.recent_messages(self.config.history_window));

        let started = Instant::now();
        let response = match self.llm.generate_response(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Message from {} rejected: {}", user_id, e);
                return Err(e);
            }
        };
        let latency_ms = started.elapsed().as_millis();

        let workflow = WorkflowRules::select(&WorkflowContext {
            intent,
            message,
            documents: &retrieval.documents,
        });

        if let Some(workflow) = workflow {
            session.pending_workflows.push(workflow);
            info!("Workflow {} queued for session {}", workflow.as_str(), session.session_id);
            self.analytics.track(
                ChatbotAnalyticsEvent::builder(WORKFLOW_TRIGGERED_EVENT)
                    .field("workflow", workflow.as_str())
                    .field("session_id", &session.session_id)
                    .field("intent", intent.as_str())
                    .build(),
            );
        }

        let max_turns = self.config.max_turns;
        session.add_turn(ConversationTurn::user(message, intent), max_turns);
        session.add_turn(
            ConversationTurn::assistant(response.content.clone(), intent, workflow.into_iter().collect()),
            max_turns,
        );

        self.analytics.track(
            ChatbotAnalyticsEvent::builder(MESSAGE_EVENT)
                .field("intent", intent.as_str())
                .field("session_id", &session.session_id)
                .field("latency_ms", latency_ms)
                .field("workflow", workflow.map(|w| w.as_str()).unwrap_or_default())
                .build(),
        );

        Ok(ChatResult {
            session_id: session.session_id.clone(),
            intent,
            workflow,
            response,
            documents: retrieval.titles(),
            history_length: session.history_length(),
        })
    }

    /// Snapshot of a user's turns, oldest first
    pub async fn session_history(&self, user_id: &str) -> Vec<ConversationTurn> {
        let Some(session) = self.sessions.get(user_id) else {
            return Vec::new();
        };
        let session = session.lock().await;
        session.turns.iter().cloned().collect()
    }

    pub async fn pending_workflows(&self, user_id: &str) -> Vec<Workflow> {
        let Some(session) = self.sessions.get(user_id) else {
            return Vec::new();
        };
        let session = session.lock().await;
        session.pending_workflows.clone()
    }

    pub async fn session_id(&self, user_id: &str) -> Option<String> {
        let session = self.sessions.get(user_id)?;
        let id = session.lock().await.session_id.clone();
        Some(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
