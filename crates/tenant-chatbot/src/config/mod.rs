pub mod settings;

pub use settings::{
    ConversationConfig, GuardrailsConfig, KnowledgeBaseConfig, LlmConfig, Settings,
};
