//! Conversation state and orchestration
//!
//! Provides per-user session management with:
//! - Thread-safe session registry (DashMap + per-session async mutex)
//! - Ordered keyword rules for intent and workflow selection
//! - The message pipeline tying retrieval, generation and analytics together

mod cache;
pub mod intent;
pub mod manager;
pub mod types;

pub use cache::{SessionStore, SharedSession};
pub use intent::{IntentClassifier, WorkflowRules};
pub use manager::{ConversationManager, ResponseGenerator};
pub use types::{ChatResult, ConversationSession, ConversationTurn, Intent, Workflow};
