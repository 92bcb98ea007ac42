//! Service configuration and agent definitions.
//!
//! This crate resolves everything the gateway needs from the environment
//! exactly once, at startup:
//!
//! - [`ServiceConfig`] — Credentials, model id, limits and paths
//! - [`AgentConfig`] — Explicit description of one hosted-model agent
//! - [`AgentBuilder`] — Fluent API for assembling an [`AgentConfig`]
//! - [`Capability`] — Tool capabilities an agent may be granted
//! - [`AgentKind`] — The four agents the gateway runs, with their presets
//!
//! # Loading from the environment
//!
//! ```rust,ignore
//! use doctorx_config::ServiceConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = ServiceConfig::from_env()?;
//! ```
//!
//! # Builder API
//!
//! ```rust
//! use doctorx_config::{AgentConfig, Capability};
//!
//! let agent = AgentConfig::builder("Lab Analyst", "gemini-2.5-flash", "key")
//!     .description("You review lab reports.")
//!     .tool(Capability::WebSearch)
//!     .instruction("List abnormal values first.")
//!     .markdown(true)
//!     .build();
//!
//! assert!(agent.has_tool(Capability::WebSearch));
//! assert_eq!(agent.instructions.len(), 1);
//! ```

mod presets;

pub use presets::AgentKind;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the key for the medical image agent.
pub const LAB_API_KEY_VAR: &str = "LAB_SERVICE_API_KEY";
/// Environment variable holding the key for the tracking agents.
pub const TRACKING_API_KEY_VAR: &str = "TRACKING_SERVICE_API_KEY";

const MODEL_VAR: &str = "DOCTORX_MODEL";
const API_BASE_VAR: &str = "DOCTORX_API_BASE";
const BIND_ADDR_VAR: &str = "DOCTORX_BIND_ADDR";
const UPLOAD_DIR_VAR: &str = "DOCTORX_UPLOAD_DIR";
const MODEL_TIMEOUT_VAR: &str = "DOCTORX_MODEL_TIMEOUT_SECS";
const CLEANUP_DELAY_VAR: &str = "DOCTORX_CLEANUP_DELAY_MS";
const MAX_UPLOAD_VAR: &str = "DOCTORX_MAX_UPLOAD_BYTES";

/// Default hosted model for every agent.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CLEANUP_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Errors that can occur while resolving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Required environment variable '{0}' is not set")]
    MissingVar(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for '{name}': {message}")]
    InvalidVar {
        name: &'static str,
        message: String,
    },
}

/// Which credential an agent draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGroup {
    /// Medical image agent.
    Lab,
    /// Tracking, trend, and report extraction agents.
    Tracking,
}

/// Immutable service configuration, resolved once at process start.
#[derive(Clone)]
pub struct ServiceConfig {
    pub lab_api_key: String,
    pub tracking_api_key: String,
    /// Model id handed to every agent (e.g. "gemini-2.5-flash").
    pub model_id: String,
    /// Optional OpenAI-compatible base URL for non-Gemini models.
    pub api_base: Option<String>,
    pub bind_addr: String,
    /// Directory where uploads are staged for the duration of one request.
    pub upload_dir: PathBuf,
    pub model_timeout: Duration,
    /// Pause before deleting a staged upload, letting the platform release file locks.
    pub cleanup_delay: Duration,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("lab_api_key", &"<redacted>")
            .field("tracking_api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("api_base", &self.api_base)
            .field("bind_addr", &self.bind_addr)
            .field("upload_dir", &self.upload_dir)
            .field("model_timeout", &self.model_timeout)
            .field("cleanup_delay", &self.cleanup_delay)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServiceConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let lab_api_key = var(LAB_API_KEY_VAR).ok_or(ConfigError::MissingVar(LAB_API_KEY_VAR))?;
        let tracking_api_key =
            var(TRACKING_API_KEY_VAR).ok_or(ConfigError::MissingVar(TRACKING_API_KEY_VAR))?;

        let timeout_secs: u64 = parse_var(var(MODEL_TIMEOUT_VAR), MODEL_TIMEOUT_VAR, DEFAULT_MODEL_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidVar {
                name: MODEL_TIMEOUT_VAR,
                message: "must be greater than zero".into(),
            });
        }
        let cleanup_ms: u64 = parse_var(var(CLEANUP_DELAY_VAR), CLEANUP_DELAY_VAR, DEFAULT_CLEANUP_DELAY_MS)?;

        Ok(Self {
            lab_api_key,
            tracking_api_key,
            model_id: var(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: var(API_BASE_VAR),
            bind_addr: var(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            upload_dir: var(UPLOAD_DIR_VAR).map(PathBuf::from).unwrap_or_else(std::env::temp_dir),
            model_timeout: Duration::from_secs(timeout_secs),
            cleanup_delay: Duration::from_millis(cleanup_ms),
            max_upload_bytes: parse_var(var(MAX_UPLOAD_VAR), MAX_UPLOAD_VAR, DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Returns the credential for the given agent group.
    pub fn api_key(&self, group: KeyGroup) -> &str {
        match group {
            KeyGroup::Lab => &self.lab_api_key,
            KeyGroup::Tracking => &self.tracking_api_key,
        }
    }
}

fn parse_var<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            name,
            message: format!("'{}': {}", value, e),
        }),
        None => Ok(default),
    }
}

/// Tool capabilities an agent can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Grounding with live web search results.
    WebSearch,
}

impl FromStr for Capability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web_search" => Ok(Self::WebSearch),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WebSearch => "web_search",
        };
        write!(f, "{}", s)
    }
}

/// Explicit configuration for one hosted-model agent.
#[derive(Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Human-readable agent name, used in logs.
    pub name: String,
    /// Persona statement placed at the top of the system instruction.
    #[serde(default)]
    pub description: String,
    /// Model identifier (e.g. "gemini-2.5-flash", "gpt-4o").
    pub model_id: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub tools: BTreeSet<Capability>,
    /// Instruction blocks, in order.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Ask the model to format its answer as markdown.
    #[serde(default)]
    pub markdown: bool,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("model_id", &self.model_id)
            .field("tools", &self.tools)
            .field("instructions", &self.instructions.len())
            .field("markdown", &self.markdown)
            .finish()
    }
}

impl AgentConfig {
    /// Creates a new builder for an agent.
    pub fn builder(
        name: impl Into<String>,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> AgentBuilder {
        AgentBuilder::new(name, model_id, api_key)
    }

    /// Returns `true` if the agent was granted the capability.
    pub fn has_tool(&self, capability: Capability) -> bool {
        self.tools.contains(&capability)
    }

    /// Renders the system instruction sent with every request.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::new();
        if !self.description.is_empty() {
            prompt.push_str(&self.description);
            prompt.push_str("\n\n");
        }
        prompt.push_str(&self.instructions.join("\n"));
        if self.markdown {
            prompt.push_str("\n\nUse markdown to format your answers.");
        }
        prompt
    }
}

/// Builder for constructing [`AgentConfig`].
///
/// Use [`AgentConfig::builder()`] to create a new builder.
#[derive(Debug)]
pub struct AgentBuilder {
    config: AgentConfig,
}

impl AgentBuilder {
    fn new(name: impl Into<String>, model_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            config: AgentConfig {
                name: name.into(),
                description: String::new(),
                model_id: model_id.into(),
                api_key: api_key.into(),
                tools: BTreeSet::new(),
                instructions: Vec::new(),
                markdown: false,
            },
        }
    }

    /// Sets the persona statement.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.config.description = desc.into();
        self
    }

    /// Grants a tool capability.
    pub fn tool(mut self, capability: Capability) -> Self {
        self.config.tools.insert(capability);
        self
    }

    /// Appends one instruction block.
    pub fn instruction(mut self, line: impl Into<String>) -> Self {
        self.config.instructions.push(line.into());
        self
    }

    /// Appends several instruction blocks, preserving order.
    pub fn instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.instructions.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn markdown(mut self, enabled: bool) -> Self {
        self.config.markdown = enabled;
        self
    }

    /// Builds the final [`AgentConfig`].
    pub fn build(self) -> AgentConfig {
        self.config
    }
}
