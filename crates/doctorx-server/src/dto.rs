//! Data transfer objects for HTTP message serialization.

use doctorx_core::QuickLogEntry;
use doctorx_engine::{ExtractedReportData, TrendStatistics};
use serde::{Deserialize, Serialize};

// === Analysis Envelopes ===

/// Response from the medical image endpoint.
#[derive(Debug, Serialize)]
pub struct MedicalAnalysisResponse {
    pub analysis: String,
}

/// Optional scan-report parameters passed on the query string.
#[derive(Debug, Deserialize)]
pub struct ScanReportQuery {
    #[serde(default = "default_patient_id")]
    pub patient_id: String,
    #[serde(default = "default_condition")]
    pub condition: String,
}

fn default_patient_id() -> String {
    "demo_patient".into()
}

fn default_condition() -> String {
    "General".into()
}

/// Response from the scan-report endpoint.
#[derive(Debug, Serialize)]
pub struct ScanReportResponse {
    pub success: bool,
    pub patient_id: String,
    pub condition: String,
    pub filename: String,
    pub extracted_data: ExtractedReportData,
    pub scanned_at: String,
}

/// Response from the tracking analysis endpoint.
#[derive(Debug, Serialize)]
pub struct TrackingAnalysisResponse {
    pub success: bool,
    pub patient_id: String,
    pub condition: String,
    pub analysis: String,
    pub analyzed_at: String,
}

/// Response from the trend analysis endpoint.
#[derive(Debug, Serialize)]
pub struct TrendAnalysisResponse {
    pub success: bool,
    pub patient_id: String,
    pub metric_type: String,
    pub time_range: u32,
    pub insights: String,
    pub statistics: TrendStatistics,
}

/// Response from the quick-log endpoint.
#[derive(Debug, Serialize)]
pub struct QuickLogResponse {
    pub success: bool,
    pub message: String,
    pub data: QuickLogEntry,
}

// === Placeholder Request Types ===

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct ChronicCareRequest {
    pub condition: String,
    pub symptoms: String,
    pub age: u32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct RecoveryPlanRequest {
    pub surgery_type: String,
    pub days_post_op: u32,
    pub pain_level: u32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct SpecialistSearchRequest {
    pub symptom: String,
    pub location: String,
}
