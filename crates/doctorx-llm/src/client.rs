//! OpenAI-compatible chat client.
//!
//! Works with the OpenAI API and any compatible endpoint (including Ollama's
//! /v1 endpoint). Attachments are sent inline as `data:` URL image parts.

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, ImageDetail, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use doctorx_config::{AgentConfig, Capability};
use doctorx_core::AgentError;
use tracing::{debug, info};

use crate::{llm_err, Attachment, LlmMetrics, LlmResponse, ModelInvoker};

/// Extracts content and metrics from a completion response.
fn extract_response(response: CreateChatCompletionResponse, elapsed_ms: u64) -> Result<LlmResponse, AgentError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::LlmError("No response content".into()))?;

    let (input_tokens, output_tokens) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    Ok(LlmResponse {
        content,
        metrics: LlmMetrics { input_tokens, output_tokens, elapsed_ms },
    })
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl LlmClient {
    /// Creates a new client for the given agent and optional API base URL.
    pub fn new(config: &AgentConfig, api_base: Option<&str>) -> Self {
        let mut openai = OpenAIConfig::new().with_api_key(config.api_key.clone());
        if let Some(base) = api_base {
            openai = openai.with_api_base(base);
        }

        if config.has_tool(Capability::WebSearch) {
            debug!("{}: web_search is not available on chat completions, ignoring", config.name);
        }

        Self {
            client: Client::with_config(openai),
            model: config.model_id.clone(),
            system_prompt: config.system_prompt(),
        }
    }

    /// Builds the system + user messages, inlining attachments as image parts.
    async fn build_messages(
        &self,
        prompt: &str,
        attachments: &[Attachment],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let mut parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(prompt)
                .build()
                .map_err(llm_err)?,
        )];

        for attachment in attachments {
            let image_url = ImageUrlArgs::default()
                .url(attachment.data_url().await?)
                .detail(ImageDetail::Auto)
                .build()
                .map_err(llm_err)?;
            parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(image_url)
                    .build()
                    .map_err(llm_err)?,
            ));
        }

        Ok(vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.as_str())
                    .build()
                    .map_err(llm_err)?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(parts))
                    .build()
                    .map_err(llm_err)?,
            ),
        ])
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn invoke(&self, prompt: &str, attachments: &[Attachment]) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();
        let messages = self.build_messages(prompt, attachments).await?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }
}
