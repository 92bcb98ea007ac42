//! HTTP route handlers for the DoctorX gateway.

pub mod medical;
pub mod tracking;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use crate::dto::{ChronicCareRequest, RecoveryPlanRequest, SpecialistSearchRequest};
use crate::error::AppError;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Service metadata and route listing.
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "DoctorX Care API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "medical_analysis": "POST /api/medical-analysis",
            "scan_report": "POST /api/health-tracking/scan-report",
            "tracking_analysis": "POST /api/health-tracking/analyze",
            "trend_analysis": "POST /api/health-tracking/trend-analysis",
            "quick_log": "POST /api/health-tracking/quick-log",
            "chronic_care": "POST /api/chronic-care",
            "recovery_plan": "POST /api/recovery-plan",
            "find_specialist": "POST /api/find-specialist",
            "health": "GET /health"
        }
    }))
}

// Placeholder routes: validate the body, answer with a fixed marker.

pub async fn chronic_care(
    payload: Result<Json<ChronicCareRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    info!("Chronic care request for condition: {}", req.condition);
    Ok(Json(json!({ "plan": "Chronic Care Logic Pending" })))
}

pub async fn recovery_plan(
    payload: Result<Json<RecoveryPlanRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    info!("Recovery plan request for surgery: {}", req.surgery_type);
    Ok(Json(json!({ "status": "Recovery Logic Pending" })))
}

pub async fn find_specialist(
    payload: Result<Json<SpecialistSearchRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    info!("Specialist search for symptom: {}", req.symptom);
    Ok(Json(json!({ "doctors": "Specialist Finder Pending" })))
}
