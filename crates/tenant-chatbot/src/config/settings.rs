use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::services::provider::Provider;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub conversation: ConversationConfig,
    pub guardrails: GuardrailsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    /// Explicit key; wins over `credential_sources` when non-empty
    pub api_key: Option<String>,
    /// Environment variables checked in order for a key
    pub credential_sources: Vec<String>,
    /// Overrides the provider's default endpoint
    pub endpoint: Option<String>,
    pub max_requests_per_minute: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::AzureOpenAi,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            credential_sources: vec![
                "LLM_API_KEY".to_string(),
                "AZURE_OPENAI_KEY".to_string(),
                "OPENAI_API_KEY".to_string(),
            ],
            endpoint: None,
            max_requests_per_minute: 60,
            temperature: 0.2,
            max_tokens: 800,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub path: String,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: "data/knowledge_base.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ConversationConfig {
    /// Trailing turns replayed to the model as history
    pub history_window: usize,
    /// Turns retained per session
    pub max_turns: usize,
    pub retrieval_top_k: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: 6,
            max_turns: 20,
            retrieval_top_k: 3,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GuardrailsConfig {
    pub banned_terms: Vec<String>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            banned_terms: vec![
                "password".to_string(),
                "ssn".to_string(),
                "wire transfer".to_string(),
                "credit card".to_string(),
            ],
        }
    }
}

impl Settings {
    /// `.env`, then `config/settings.toml` if present, then `APP__*` env overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
