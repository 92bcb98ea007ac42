//! Google Gemini client (Generative Language REST API).

use std::time::Instant;

use async_trait::async_trait;
use doctorx_config::{AgentConfig, Capability};
use doctorx_core::AgentError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{llm_err, Attachment, LlmMetrics, LlmResponse, ModelInvoker};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GeminiTool {
    google_search: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Builds the request body; attachments arrive already base64-encoded.
fn build_request(
    system_prompt: &str,
    prompt: &str,
    encoded: Vec<(String, String)>,
    web_search: bool,
) -> GenerateRequest {
    let mut parts = vec![Part::Text { text: prompt.to_string() }];
    parts.extend(encoded.into_iter().map(|(mime_type, data)| Part::InlineData {
        inline_data: InlineData { mime_type, data },
    }));

    let system_instruction = (!system_prompt.is_empty()).then(|| Content {
        role: None,
        parts: vec![Part::Text { text: system_prompt.to_string() }],
    });

    let tools = match web_search {
        true => vec![GeminiTool { google_search: serde_json::json!({}) }],
        false => Vec::new(),
    };

    GenerateRequest {
        system_instruction,
        contents: vec![Content { role: Some("user"), parts }],
        tools,
    }
}

/// Concatenates the first candidate's text parts.
fn extract_response(resp: GenerateResponse, elapsed_ms: u64) -> Result<LlmResponse, AgentError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AgentError::LlmError(format!("Prompt blocked by Gemini: {}", reason)));
    }

    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::LlmError("No response candidates".into()))?;

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if content.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(AgentError::LlmError(format!("No response content (finish reason: {})", reason)));
    }

    let (input_tokens, output_tokens) = resp
        .usage_metadata
        .map(|u| (u.prompt_token_count.unwrap_or(0), u.candidates_token_count.unwrap_or(0)))
        .unwrap_or((0, 0));

    info!("Gemini: {}ms, tokens: {}/{} (in/out)", elapsed_ms, input_tokens, output_tokens);

    Ok(LlmResponse {
        content,
        metrics: LlmMetrics { input_tokens, output_tokens, elapsed_ms },
    })
}

/// Client for Google's Gemini models.
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    system_prompt: String,
    web_search: bool,
}

impl GeminiClient {
    /// Creates a new client for the given agent.
    pub fn new(config: &AgentConfig) -> Self {
        debug!("GeminiClient: agent={}, model={}", config.name, config.model_id);
        Self {
            client: Client::new(),
            model: config.model_id.clone(),
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt(),
            web_search: config.has_tool(Capability::WebSearch),
        }
    }
}

#[async_trait]
impl ModelInvoker for GeminiClient {
    async fn invoke(&self, prompt: &str, attachments: &[Attachment]) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();

        let mut encoded = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            encoded.push((attachment.mime_type().to_string(), attachment.read_base64().await?));
        }
        let request = build_request(&self.system_prompt, prompt, encoded, self.web_search);

        let url = format!("{}/{}:generateContent", GEMINI_API_URL, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(llm_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!("Gemini API error {}: {}", status, body)));
        }

        let resp: GenerateResponse = response.json().await.map_err(llm_err)?;
        extract_response(resp, start.elapsed().as_millis() as u64)
    }
}
