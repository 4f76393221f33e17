use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use tenant_chatbot::config::Settings;
use tenant_chatbot::logging::ChatbotAnalytics;
use tenant_chatbot::services::{ConversationManager, Guardrails, LlmClient, RagPipeline};
use tenant_chatbot::utils::error::ErrorResponse;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tenant_chatbot=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("Starting tenant chatbot...");

    let settings = Settings::load()?;
    info!("Configuration loaded (provider={})", settings.llm.provider.as_str());

    let rag = Arc::new(RagPipeline::from_config(&settings.knowledge_base)?);
    let guardrails = Guardrails::new(&settings.guardrails);
    let llm = Arc::new(LlmClient::new(settings.llm.clone(), guardrails));
    let analytics = Arc::new(ChatbotAnalytics::new());

    let manager = ConversationManager::new(rag, llm, analytics, settings.conversation.clone());

    info!("Reading `<user_id>: <message>` lines from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((user_id, message)) = line.split_once(':') else {
            warn!("Skipping malformed input line");
            let error = ErrorResponse {
                error: "InvalidInput".to_string(),
                message: "Expected `<user_id>: <message>`".to_string(),
            };
            println!("{}", serde_json::to_string(&error)?);
            continue;
        };

        match manager.handle_message(user_id.trim(), message.trim()).await {
            Ok(result) => println!("{}", serde_json::to_string(&result)?),
            Err(e) => println!("{}", serde_json::to_string(&e.to_response())?),
        }
    }

    info!("Input closed, {} sessions handled", manager.session_count());
    Ok(())
}
