//! Hosted model clients for DoctorX agents.
//!
//! The gateway never talks to a provider directly. It holds a
//! [`ModelInvoker`] per agent, which keeps every handler testable with a
//! stand-in implementation:
//!
//! - [`ModelInvoker`] — The one-method interface to the hosted model
//! - [`UnifiedLlmClient`] — Recommended: picks the provider from the model id
//! - [`GeminiClient`] — Google Generative Language API (default)
//! - [`LlmClient`] — OpenAI-compatible chat completions
//! - [`Attachment`] — A staged file handed to the model alongside the prompt
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use doctorx_config::{AgentKind, ServiceConfig};
//! use doctorx_llm::{ModelInvoker, UnifiedLlmClient};
//!
//! let service = ServiceConfig::from_env()?;
//! let agent = AgentKind::HealthTracking.config(&service);
//! let client = UnifiedLlmClient::new(&agent, service.api_base.as_deref())?;
//!
//! let response = client.invoke("## PATIENT HEALTH TRACKING DATA ...", &[]).await?;
//! println!("{}", response.content);
//! ```

mod attachment;
mod client;
mod gemini;
mod unified;

pub use attachment::Attachment;
pub use client::LlmClient;
pub use doctorx_core::AgentError;
pub use gemini::GeminiClient;
pub use unified::UnifiedLlmClient;

use async_trait::async_trait;

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// Complete response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub metrics: LlmMetrics,
}

impl LlmResponse {
    /// Creates a response with empty metrics.
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), metrics: LlmMetrics::default() }
    }
}

/// The external model collaborator: one prompt plus attachments in, text out.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Sends the prompt (and any staged attachments) to the model.
    async fn invoke(&self, prompt: &str, attachments: &[Attachment]) -> Result<LlmResponse, AgentError>;
}

/// Converts any error into an AgentError::LlmError.
pub(crate) fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}
