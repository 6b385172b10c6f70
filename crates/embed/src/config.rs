use serde::{Deserialize, Serialize};

use crate::EmbedError;

/// Which embedding backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic offline hashing embedder.
    #[default]
    Stub,
    #[serde(alias = "gpt")]
    OpenAi,
    #[serde(alias = "hf")]
    HuggingFace,
    Gemini,
    /// `{"texts": [...]}` in, any supported embedding shape out.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub provider: ProviderKind,
    /// Endpoint for HTTP providers.
    pub api_url: Option<String>,
    /// Header value sent with every request, e.g. `Bearer sk-...`.
    pub api_auth_header: Option<String>,
    /// Header name carrying `api_auth_header`.
    pub auth_header_name: String,
    /// Model identifier sent to providers that need one.
    pub model_name: String,
    /// Fixed embedding dimension of the deployment.
    pub dimension: usize,
    /// L2-normalize returned vectors.
    pub normalize: bool,
    pub timeout_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Stub,
            api_url: None,
            api_auth_header: None,
            auth_header_name: "Authorization".into(),
            model_name: "text-embedding-3-small".into(),
            dimension: 768,
            normalize: true,
            timeout_secs: 30,
        }
    }
}

impl EmbedConfig {
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.dimension == 0 {
            return Err(EmbedError::InvalidConfig("dimension must be >= 1".into()));
        }
        if self.provider != ProviderKind::Stub && self.api_url.as_deref().unwrap_or("").is_empty()
        {
            return Err(EmbedError::InvalidConfig(format!(
                "api_url is required for provider {:?}",
                self.provider
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_needs_no_url() {
        assert!(EmbedConfig::default().validate().is_ok());
    }

    #[test]
    fn http_provider_requires_url() {
        let cfg = EmbedConfig {
            provider: ProviderKind::OpenAi,
            ..EmbedConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EmbedError::InvalidConfig(_))));
    }

    #[test]
    fn provider_aliases_deserialize() {
        let hf: ProviderKind = serde_json::from_str("\"hf\"").unwrap();
        let gpt: ProviderKind = serde_json::from_str("\"gpt\"").unwrap();
        let gemini: ProviderKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(hf, ProviderKind::HuggingFace);
        assert_eq!(gpt, ProviderKind::OpenAi);
        assert_eq!(gemini, ProviderKind::Gemini);
    }
}
