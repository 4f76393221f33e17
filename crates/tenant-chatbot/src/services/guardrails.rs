//! Guardrails applied before any provider call.
//!
//! Redaction rewrites sensitive substrings in place. Moderation rejects the
//! whole request when the redacted prompt still mentions a banned term.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::config::GuardrailsConfig;
use crate::utils::error::ChatbotError;

pub const SSN_PLACEHOLDER: &str = "***-**-****";
pub const BANKING_PLACEHOLDER: &str = "[redacted banking number]";

static SSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid SSN regex"));

static BANKING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(account|routing) number\s*[:#-]?\s*\d+")
        .expect("valid banking number regex")
});

/// Replace SSN-shaped numbers and account/routing numbers with placeholders.
/// Applying it twice yields the same text as applying it once.
pub fn redact_sensitive_data(content: &str) -> String {
    let content = SSN_PATTERN.replace_all(content, SSN_PLACEHOLDER);
    BANKING_PATTERN
        .replace_all(&content, BANKING_PLACEHOLDER)
        .into_owned()
}

#[derive(Debug, Clone)]
pub struct Guardrails {
    banned_terms: Vec<String>,
}

impl Guardrails {
    pub fn new(config: &GuardrailsConfig) -> Self {
        Self {
            banned_terms: config
                .banned_terms
                .iter()
                .map(|term| term.to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    pub fn banned_terms(&self) -> &[String] {
        &self.banned_terms
    }

    pub fn redact(&self, content: &str) -> String {
        redact_sensitive_data(content)
    }

    /// Case-insensitive banned term scan
    pub fn moderate(&self, content: &str) -> Result<(), ChatbotError> {
        let lowered = content.to_lowercase();
        if let Some(term) = self.banned_terms.iter().find(|term| lowered.contains(term.as_str())) {
            warn!("Message rejected by moderation (matched '{}')", term);
            return Err(ChatbotError::ContentPolicy(
                "Message failed moderation policies".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Guardrails {
    fn default() -> Self {
        Self::new(&GuardrailsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_ssn() {
        assert_eq!(
            redact_sensitive_data("My SSN is 123-45-6789, thanks"),
            "My SSN is ***-**-****, thanks"
        );
        // not SSN shaped
        assert_eq!(redact_sensitive_data("call 555-0100"), "call 555-0100");
        assert_eq!(redact_sensitive_data("id 1123-45-67890"), "id 1123-45-67890");
    }

    #[test]
    fn test_redacts_banking_numbers() {
        assert_eq!(
            redact_sensitive_data("Account Number: 99887766 please"),
            "[redacted banking number] please"
        );
        assert_eq!(
            redact_sensitive_data("routing number #021000021"),
            "[redacted banking number]"
        );
        assert_eq!(
            redact_sensitive_data("my account number is 1234"),
            "my account number is 1234"
        );
    }

    #[test]
    fn test_redaction_idempotent() {
        let samples = [
            "SSN 123-45-6789 and account number 4444",
            "ROUTING NUMBER-021000021, 987-65-4321",
            "nothing sensitive here",
            "",
        ];
        for sample in samples {
            let once = redact_sensitive_data(sample);
            let twice = redact_sensitive_data(&once);
            assert_eq!(once, twice, "sample: {sample}");
        }
    }

    #[test]
    fn test_moderation_rejects_banned_terms() {
        let guardrails = Guardrails::default();
        for message in [
            "What is my PASSWORD?",
            "My SSN is ***-**-****",
            "Can I pay by Wire Transfer?",
            "do you take credit card payments",
        ] {
            let err = guardrails.moderate(message).unwrap_err();
            assert!(err.is_content_policy(), "message: {message}");
        }
    }

    #[test]
    fn test_moderation_allows_clean_messages() {
        let guardrails = Guardrails::default();
        assert!(guardrails.moderate("How do I pay rent online?").is_ok());
        assert!(guardrails.moderate("").is_ok());
    }

    #[test]
    fn test_custom_banned_terms() {
        let guardrails = Guardrails::new(&GuardrailsConfig {
            banned_terms: vec!["Bitcoin".to_string(), String::new()],
        });
        assert_eq!(guardrails.banned_terms(), &["bitcoin".to_string()]);
        assert!(guardrails.moderate("pay rent in BITCOIN").is_err());
        assert!(guardrails.moderate("my password").is_ok());
    }
}
