//! Core domain types and error definitions for DoctorX.
//!
//! This crate provides the types shared across the DoctorX workspace:
//!
//! - [`AgentError`] — Error type for agent construction and model calls
//! - [`HealthTrackingSubmission`] and its reading types — Tracking payloads
//! - [`TrendAnalysisRequest`] — Series submitted for trend insights
//! - [`QuickLogRequest`] and [`QuickLogEntry`] — Single-reading log echo
//!
//! Every value here is request-scoped: built from the incoming payload,
//! consumed once, and dropped with the response.
//!
//! # Example
//!
//! ```rust
//! use doctorx_core::HealthTrackingSubmission;
//!
//! let submission: HealthTrackingSubmission = serde_json::from_str(
//!     r#"{"patient_id": "p-1", "condition": "Hypertension", "blood_glucose": null}"#,
//! ).unwrap();
//!
//! assert!(submission.blood_glucose.is_empty());
//! assert!(submission.blood_pressure.is_empty());
//! ```

mod model;

pub use model::{
    BloodPressureReading, HealthTrackingSubmission, Medication, QuickLogEntry, QuickLogRequest,
    TrendAnalysisRequest, TrendReading, VitalReading, DEFAULT_TIME_RANGE_DAYS,
};

use thiserror::Error;

/// Errors that can occur while constructing agents or calling the hosted model.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Agent could not be constructed (missing credential, bad model id).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse a model or API payload.
    #[error("Failed to parse structured output: {0}")]
    ParseError(String),

    /// An attachment could not be read for upload to the model.
    #[error("Failed to read attachment '{path}': {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The model call did not complete within the configured bound.
    #[error("Model call timed out after {0}s")]
    Timeout(u64),
}

impl AgentError {
    /// Creates an attachment error with path context.
    pub fn attachment(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Attachment { path: path.into(), source }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}
