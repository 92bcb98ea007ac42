//! Health tracking handlers: full analysis, trend insights, and quick logging.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Local;
use doctorx_config::AgentKind;
use doctorx_core::{HealthTrackingSubmission, QuickLogRequest, TrendAnalysisRequest};
use doctorx_engine::{build_trend_prompt, build_tracking_summary, iso_timestamp, summarize};
use tracing::info;

use crate::dto::{QuickLogResponse, TrackingAnalysisResponse, TrendAnalysisResponse};
use crate::error::AppError;
use crate::services::analysis::run_agent;
use crate::ServerState;

/// Summarizes a tracking submission and asks the tracking agent for insights.
pub async fn analyze(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<HealthTrackingSubmission>, JsonRejection>,
) -> Result<Json<TrackingAnalysisResponse>, AppError> {
    let Json(submission) = payload?;
    info!(
        "Tracking analysis for patient {} ({})",
        submission.patient_id, submission.condition
    );

    let summary = build_tracking_summary(&submission, Local::now().naive_local());
    let analysis = run_agent(&state, AgentKind::HealthTracking, &summary, &[])
        .await
        .map_err(|e| AppError::upstream("Analysis", e))?;

    Ok(Json(TrackingAnalysisResponse {
        success: true,
        patient_id: submission.patient_id,
        condition: submission.condition,
        analysis,
        analyzed_at: iso_timestamp(Local::now().naive_local()),
    }))
}

/// Computes series statistics and asks the trend agent to interpret them.
pub async fn trend_analysis(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TrendAnalysisRequest>, JsonRejection>,
) -> Result<Json<TrendAnalysisResponse>, AppError> {
    let Json(request) = payload?;
    info!(
        "Trend analysis for patient {}: {} ({} readings)",
        request.patient_id,
        request.metric_type,
        request.readings.len()
    );

    let stats = summarize(request.readings.iter().map(|r| r.value));
    let prompt = build_trend_prompt(&request, &stats);
    let insights = run_agent(&state, AgentKind::TrendVisualization, &prompt, &[])
        .await
        .map_err(|e| AppError::upstream("Trend analysis", e))?;

    Ok(Json(TrendAnalysisResponse {
        success: true,
        patient_id: request.patient_id,
        metric_type: request.metric_type,
        time_range: request.time_range,
        insights,
        statistics: stats.into(),
    }))
}

/// Acknowledges a single reading. Nothing is stored.
pub async fn quick_log(
    payload: Result<Json<QuickLogRequest>, JsonRejection>,
) -> Result<Json<QuickLogResponse>, AppError> {
    let Json(request) = payload?;
    info!("Quick log for patient {}: {}", request.patient_id, request.metric_type);

    let outcome = doctorx_engine::quick_log(request, Local::now().naive_local());
    Ok(Json(QuickLogResponse {
        success: true,
        message: outcome.message,
        data: outcome.entry,
    }))
}
