use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::models::chat::{ChatMessage, GenerationRequest, LlmResponse, Role, Usage};
use crate::services::conversation::manager::ResponseGenerator;
use crate::services::guardrails::Guardrails;
use crate::utils::error::ChatbotError;
use crate::utils::limiters::RateLimiter;
use crate::utils::tokenizer::word_count;

pub const SYSTEM_INSTRUCTION: &str = "You are a property management assistant. Answer with actionable steps, \
reference policies, and trigger workflows when appropriate.";

const SUMMARY_MAX_CHARS: usize = 120;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

/// First non-empty credential: the explicit key, then each named source in order.
pub fn resolve_credential<F>(explicit: Option<&str>, sources: &[String], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Some(key.to_string());
    }

    for source in sources {
        if let Some(value) = lookup(source).filter(|v| !v.trim().is_empty()) {
            info!("Using API key from {}", source);
            return Some(value);
        }
    }

    None
}

/// Guarded client for the completion provider.
///
/// Every call is redacted and moderated first. Without a credential or an
/// endpoint the client answers with a deterministic mock completion, and any
/// provider failure degrades to that same mock.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
    api_key: Option<String>,
    endpoint: Option<String>,
    guardrails: Guardrails,
    rate_limiter: Arc<RateLimiter>,
}

impl LlmClient {
    /// Resolve credential and endpoint from the process environment.
    pub fn new(config: LlmConfig, guardrails: Guardrails) -> Self {
        Self::with_env_lookup(config, guardrails, |name| std::env::var(name).ok())
    }

    pub fn with_env_lookup<F>(config: LlmConfig, guardrails: Guardrails, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_credential(config.api_key.as_deref(), &config.credential_sources, &lookup);
        if api_key.is_none() {
            warn!("LLM API key not provided; using mock responses");
        }

        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| config.provider.default_endpoint(&lookup));

        let rate_limiter = Arc::new(RateLimiter::per_minute(config.max_requests_per_minute));

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .expect("Failed to create HTTP client"),
            config,
            api_key,
            endpoint,
            guardrails,
            rate_limiter,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// System instruction, history, optional context note, then the prompt.
    pub fn build_messages(prompt: &str, context: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage::system(SYSTEM_INSTRUCTION));
        messages.extend(history.iter().cloned());
        if !context.is_empty() {
            messages.push(ChatMessage::system(format!("Context documents:\n{}", context)));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    pub fn mock_completion(prompt: &str, context: &str) -> LlmResponse {
        let summary: String = prompt
            .trim()
            .split('?')
            .next()
            .unwrap_or_default()
            .chars()
            .take(SUMMARY_MAX_CHARS)
            .collect();

        let content = format!(
            "Based on our policy library I found: {}. Here's how we can help with '{}'.",
            context, summary
        );

        LlmResponse {
            role: Role::Assistant.as_str().to_string(),
            content: content.trim().to_string(),
            usage: Usage {
                prompt_tokens: Some(word_count(prompt) as u64),
                completion_tokens: Some(word_count(context) as u64),
                ..Default::default()
            },
        }
    }

    pub async fn generate_response(&self, request: GenerationRequest) -> Result<LlmResponse, ChatbotError> {
        let prompt = self.guardrails.redact(&request.prompt);
        self.guardrails.moderate(&prompt)?;

        let history: Vec<ChatMessage> = request
            .history
            .iter()
            .map(|turn| ChatMessage::new(turn.role, self.guardrails.redact(&turn.content)))
            .collect();
        let messages = Self::build_messages(&prompt, &request.context, &history);

        let (Some(api_key), Some(endpoint)) = (self.api_key.as_deref(), self.endpoint.as_deref()) else {
            debug!("No provider credential or endpoint; returning mock completion");
            return Ok(Self::mock_completion(&prompt, &request.context));
        };

        let temperature = request.temperature.unwrap_or(self.config.temperature);
        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        self.rate_limiter.acquire().await;
        debug!("Dispatching LLM request with {} messages", messages.len());

        match self.dispatch(endpoint, api_key, &messages, temperature, max_tokens).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("Falling back to mock completion due to {:#}", e);
                Ok(Self::mock_completion(&prompt, &request.context))
            }
        }
    }

    async fn dispatch(
        &self,
        endpoint: &str,
        api_key: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<LlmResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens,
            stream: false,
        };

        let mut builder = self.client.post(endpoint).json(&request);
        for (name, value) in self.config.provider.auth_headers(api_key) {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.context("Failed to call LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error: {} - {}", status, body);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        Ok(parse_completion(&body))
    }
}

/// Read `choices[0].message` and `usage`, defaulting whatever is missing.
fn parse_completion(body: &Value) -> LlmResponse {
    let message = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"));

    let role = message
        .and_then(|m| m.get("role"))
        .and_then(Value::as_str)
        .unwrap_or(Role::Assistant.as_str());
    let content = message
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let usage = body
        .get("usage")
        .and_then(|u| serde_json::from_value::<Usage>(u.clone()).ok())
        .unwrap_or_default();

    LlmResponse {
        role: role.to_string(),
        content: content.to_string(),
        usage,
    }
}

#[async_trait::async_trait]
impl ResponseGenerator for LlmClient {
    async fn generate_response(&self, request: GenerationRequest) -> Result<LlmResponse, ChatbotError> {
        LlmClient::generate_response(self, request).await
    }
}
