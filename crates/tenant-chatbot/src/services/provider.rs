//! LLM provider variants.
//!
//! Each provider decides where completions are sent and how the request is
//! authenticated. Unsupported providers have no endpoint, which keeps the
//! client in mock-only mode.

use serde::{Deserialize, Deserializer, Serialize};

pub const AZURE_ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "unsupported")]
    Unsupported,
}

impl Provider {
    /// Any name other than the supported ones maps to `Unsupported`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "azure-openai" => Self::AzureOpenAi,
            "openai" => Self::OpenAi,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AzureOpenAi => "azure-openai",
            Self::OpenAi => "openai",
            Self::Unsupported => "unsupported",
        }
    }

    /// Default completions endpoint. `lookup` reads named environment values.
    pub fn default_endpoint<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::AzureOpenAi => lookup(AZURE_ENDPOINT_ENV).filter(|v| !v.trim().is_empty()),
            Self::OpenAi => Some(OPENAI_CHAT_COMPLETIONS_URL.to_string()),
            Self::Unsupported => None,
        }
    }

    /// Authentication headers for a request carrying `api_key`.
    pub fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        match self {
            Self::AzureOpenAi => vec![
                ("Authorization", format!("Bearer {}", api_key)),
                ("api-key", api_key.to_string()),
            ],
            Self::OpenAi => vec![("Authorization", format!("Bearer {}", api_key))],
            Self::Unsupported => Vec::new(),
        }
    }
}

// Deserialized from a plain string; unknown names become `Unsupported`.
impl<'de> Deserialize<'de> for Provider {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_endpoint_from_env() {
        let endpoint = Provider::AzureOpenAi.default_endpoint(|name| {
            (name == AZURE_ENDPOINT_ENV).then(|| "https://contoso.openai.azure.com/chat".to_string())
        });
        assert_eq!(endpoint.as_deref(), Some("https://contoso.openai.azure.com/chat"));
        assert_eq!(Provider::AzureOpenAi.default_endpoint(|_| None), None);
        assert_eq!(Provider::AzureOpenAi.default_endpoint(|_| Some("  ".into())), None);
    }

    #[test]
    fn test_openai_fixed_endpoint() {
        assert_eq!(
            Provider::OpenAi.default_endpoint(|_| None).as_deref(),
            Some(OPENAI_CHAT_COMPLETIONS_URL)
        );
    }

    #[test]
    fn test_unsupported_has_no_endpoint_or_headers() {
        assert_eq!(Provider::Unsupported.default_endpoint(|_| Some("x".into())), None);
        assert!(Provider::Unsupported.auth_headers("key").is_empty());
    }

    #[test]
    fn test_auth_headers() {
        let azure = Provider::AzureOpenAi.auth_headers("k1");
        assert!(azure.contains(&("Authorization", "Bearer k1".to_string())));
        assert!(azure.contains(&("api-key", "k1".to_string())));

        let openai = Provider::OpenAi.auth_headers("k2");
        assert_eq!(openai, vec![("Authorization", "Bearer k2".to_string())]);
    }

    #[test]
    fn test_serde_names() {
        let p: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(p, Provider::OpenAi);
        let p: Provider = serde_json::from_str("\"anthropic\"").unwrap();
        assert_eq!(p, Provider::Unsupported);
        assert_eq!(serde_json::to_string(&Provider::AzureOpenAi).unwrap(), "\"azure-openai\"");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Provider::from_name("OpenAI"), Provider::OpenAi);
        assert_eq!(Provider::from_name(" azure-openai "), Provider::AzureOpenAi);
        assert_eq!(Provider::from_name("llama-local"), Provider::Unsupported);
        assert_eq!(Provider::from_name(""), Provider::Unsupported);
    }
}
