pub mod conversation;
pub mod guardrails;
pub mod llm_service;
pub mod provider;
pub mod rag_service;
pub mod retriever;

pub use conversation::{ChatResult, ConversationManager, ResponseGenerator};
pub use guardrails::Guardrails;
pub use llm_service::LlmClient;
pub use provider::Provider;
pub use rag_service::{RagPipeline, RetrievalResult};
pub use retriever::Retriever;
