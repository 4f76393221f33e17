use serde::Serialize;
use thiserror::Error;

/// Errors that cross the chatbot core boundary.
///
/// Transport and parse failures from the LLM provider never show up here;
/// the client recovers them into a mock completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content policy violation: {0}")]
    ContentPolicy(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ChatbotError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatbotError::Config(_) => "ConfigError",
            ChatbotError::ContentPolicy(_) => "ContentPolicyViolation",
        }
    }

    /// Shape the error for the API layer to serialize.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ChatbotError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                msg.clone()
            }
            ChatbotError::ContentPolicy(msg) => {
                tracing::warn!("Content policy violation: {}", msg);
                msg.clone()
            }
        };

        ErrorResponse {
            error: self.kind().to_string(),
            message,
        }
    }

    pub fn is_content_policy(&self) -> bool {
        matches!(self, ChatbotError::ContentPolicy(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_kind() {
        let err = ChatbotError::ContentPolicy("Message failed moderation policies".to_string());
        let response = err.to_response();
        assert_eq!(response.error, "ContentPolicyViolation");
        assert_eq!(response.message, "Message failed moderation policies");
        assert!(err.is_content_policy());
    }

    #[test]
    fn test_display() {
        let err = ChatbotError::Config("Document source not found: kb.json".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Document source not found: kb.json"
        );
        assert!(!err.is_content_policy());
    }
}
