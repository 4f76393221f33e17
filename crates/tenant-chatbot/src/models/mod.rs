pub mod chat;

pub use chat::{ChatMessage, GenerationRequest, LlmResponse, Role, Usage};
