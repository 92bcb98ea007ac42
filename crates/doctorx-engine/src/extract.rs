//! Recovering the JSON object embedded in a model reply.
//!
//! Extraction is two-staged: locate the span from the first `{` to the last
//! `}`, then parse it. There is no attempt to find a smaller inner object
//! when the outer span is not valid JSON; the caller gets the fallback
//! instead.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Error marker carried by [`ExtractionFallback`].
pub const EXTRACTION_ERROR: &str = "Could not parse structured data from report";

/// Degraded result carrying the raw reply for debugging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFallback {
    pub raw_response: String,
    pub blood_pressure: Vec<Value>,
    pub blood_glucose: Vec<Value>,
    pub heart_rate: Vec<Value>,
    pub weight: Vec<Value>,
    pub error: String,
}

impl ExtractionFallback {
    fn new(raw_response: &str) -> Self {
        Self {
            raw_response: raw_response.to_string(),
            blood_pressure: Vec::new(),
            blood_glucose: Vec::new(),
            heart_rate: Vec::new(),
            weight: Vec::new(),
            error: EXTRACTION_ERROR.to_string(),
        }
    }
}

/// What the extractor recovered from a model reply.
///
/// A parsed object is returned as-is; consumers must tolerate missing keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedReportData {
    Structured(Map<String, Value>),
    Fallback(ExtractionFallback),
}

impl ExtractedReportData {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ExtractedReportData::Fallback(_))
    }
}

/// Returns the span from the first `{` to the last `}`, if both exist in that order.
pub fn locate_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Extracts the embedded JSON object, falling back to the raw text.
///
/// Never fails: unparseable replies produce [`ExtractedReportData::Fallback`].
pub fn extract_report_data(text: &str) -> ExtractedReportData {
    let Some(span) = locate_json_span(text) else {
        warn!("No JSON object found in model reply ({} chars)", text.len());
        return ExtractedReportData::Fallback(ExtractionFallback::new(text));
    };

    match serde_json::from_str::<Map<String, Value>>(span) {
        Ok(object) => {
            debug!("Extracted report object with {} keys", object.len());
            ExtractedReportData::Structured(object)
        }
        Err(e) => {
            warn!("Model reply JSON did not parse: {}", e);
            ExtractedReportData::Fallback(ExtractionFallback::new(text))
        }
    }
}

/// Builds the instruction sent with a scanned report.
pub fn report_extraction_prompt(condition: &str) -> String {
    format!(
        r#"Extract vital signs data from this health report.

Patient Condition: {condition}

Please extract and structure the following data in JSON format:
- Blood Pressure readings (with dates, systolic, diastolic, pulse if available)
- Blood Glucose readings (with dates, values, context like fasting/post-meal)
- Heart Rate readings
- Weight measurements
- Any other vital signs present

Return ONLY a valid JSON object with this structure:
{{
  "blood_pressure": [
    {{"date": "2025-01-20T10:30:00", "systolic": 120, "diastolic": 80, "pulse": 72, "context": "Morning"}}
  ],
  "blood_glucose": [
    {{"date": "2025-01-20T10:30:00", "value": 95, "unit": "mg/dL", "context": "Fasting"}}
  ],
  "heart_rate": [
    {{"date": "2025-01-20T10:30:00", "value": 72, "unit": "bpm", "context": "Resting"}}
  ],
  "weight": [
    {{"date": "2025-01-20T10:30:00", "value": 70, "unit": "kg"}}
  ],
  "report_date": "2025-01-20",
  "patient_name": "Name if visible",
  "summary": "Brief summary of findings"
}}

If no data is found for a category, use an empty array []."#
    )
}
