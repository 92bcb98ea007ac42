//! Unified LLM client that routes to the appropriate provider based on model name.

use async_trait::async_trait;
use doctorx_config::AgentConfig;
use doctorx_core::AgentError;
use tracing::info;

use crate::client::LlmClient;
use crate::gemini::GeminiClient;
use crate::{Attachment, LlmResponse, ModelInvoker};

/// Provider type determined from model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderType {
    Gemini,
    OpenAI,
}

impl ProviderType {
    fn detect(model: &str) -> Self {
        match model.starts_with("gemini-") {
            true => ProviderType::Gemini,
            false => ProviderType::OpenAI,
        }
    }
}

enum Provider {
    Gemini(GeminiClient),
    OpenAI(LlmClient),
}

/// Client that routes requests to Gemini or an OpenAI-compatible API based on model name.
pub struct UnifiedLlmClient {
    name: String,
    provider: Provider,
}

impl UnifiedLlmClient {
    /// Creates a client for the agent, failing if it has no credential.
    pub fn new(config: &AgentConfig, api_base: Option<&str>) -> Result<Self, AgentError> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Configuration(format!(
                "agent '{}' has no API key",
                config.name
            )));
        }
        if config.model_id.trim().is_empty() {
            return Err(AgentError::Configuration(format!(
                "agent '{}' has no model id",
                config.name
            )));
        }

        let provider = match ProviderType::detect(&config.model_id) {
            ProviderType::Gemini => Provider::Gemini(GeminiClient::new(config)),
            ProviderType::OpenAI => Provider::OpenAI(LlmClient::new(config, api_base)),
        };

        info!("Agent ready: {} ({})", config.name, config.model_id);
        Ok(Self { name: config.name.clone(), provider })
    }

    /// Returns true if this client is configured for Gemini.
    pub fn is_gemini(&self) -> bool {
        matches!(self.provider, Provider::Gemini(_))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ModelInvoker for UnifiedLlmClient {
    async fn invoke(&self, prompt: &str, attachments: &[Attachment]) -> Result<LlmResponse, AgentError> {
        match &self.provider {
            Provider::Gemini(client) => client.invoke(prompt, attachments).await,
            Provider::OpenAI(client) => client.invoke(prompt, attachments).await,
        }
    }
}
