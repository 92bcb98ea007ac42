//! Bounded model invocation shared by every agent-backed endpoint.

use std::time::Instant;

use doctorx_config::AgentKind;
use doctorx_core::AgentError;
use doctorx_llm::Attachment;
use tracing::{error, info};

use crate::ServerState;

/// Runs one agent with the configured timeout and returns its text reply.
///
/// Timeouts surface as [`AgentError::Timeout`]; nothing is retried.
pub async fn run_agent(
    state: &ServerState,
    kind: AgentKind,
    prompt: &str,
    attachments: &[Attachment],
) -> Result<String, AgentError> {
    let agent = state.agents.get(kind);
    info!(
        "{}: invoking ({} prompt chars, {} attachments)",
        kind.name(),
        prompt.len(),
        attachments.len()
    );

    let start = Instant::now();
    match tokio::time::timeout(state.model_timeout, agent.invoke(prompt, attachments)).await {
        Ok(Ok(response)) => {
            info!(
                "{}: completed in {} ms ({} in / {} out tokens)",
                kind.name(),
                start.elapsed().as_millis(),
                response.metrics.input_tokens,
                response.metrics.output_tokens
            );
            Ok(response.content)
        }
        Ok(Err(e)) => {
            error!("{}: model call failed: {}", kind.name(), e);
            Err(e)
        }
        Err(_) => {
            let secs = state.model_timeout.as_secs();
            error!("{}: model call timed out after {}s", kind.name(), secs);
            Err(AgentError::Timeout(secs))
        }
    }
}
