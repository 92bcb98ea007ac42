//! Upload-based handlers: medical image analysis and report scanning.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::Local;
use doctorx_config::AgentKind;
use doctorx_engine::{extract_report_data, iso_timestamp, report_extraction_prompt};
use tracing::info;

use crate::dto::{MedicalAnalysisResponse, ScanReportQuery, ScanReportResponse};
use crate::error::AppError;
use crate::services::analysis::run_agent;
use crate::services::upload::{validate_report_extension, StagedUpload, UploadForm};
use crate::ServerState;

const IMAGE_ANALYSIS_PROMPT: &str = "Analyze this medical image for red flags and abnormalities.";

/// Runs the imaging agent over an uploaded image.
pub async fn analyze_image(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MedicalAnalysisResponse>, AppError> {
    let mut form = UploadForm::read(multipart?).await?;
    let file = form.require_file()?;
    info!("Medical image analysis for '{}'", file.filename);

    let staged = StagedUpload::stage(&state.upload_dir, "temp", &file.filename, &file.bytes).await?;
    let result = run_agent(
        &state,
        AgentKind::MedicalImage,
        IMAGE_ANALYSIS_PROMPT,
        &[staged.attachment()],
    )
    .await;
    staged.cleanup(state.cleanup_delay).await;

    let analysis = result.map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(MedicalAnalysisResponse { analysis }))
}

/// Extracts structured vitals from a scanned report.
///
/// `patient_id` and `condition` may arrive as form fields or query
/// parameters; form fields win.
pub async fn scan_report(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ScanReportQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ScanReportResponse>, AppError> {
    let mut form = UploadForm::read(multipart?).await?;
    let file = form.require_file()?;
    validate_report_extension(&file.filename)?;

    let patient_id = form.field("patient_id").map(str::to_string).unwrap_or(query.patient_id);
    let condition = form.field("condition").map(str::to_string).unwrap_or(query.condition);
    info!("Scanning report '{}' for patient {} ({})", file.filename, patient_id, condition);

    let staged =
        StagedUpload::stage(&state.upload_dir, "health_report", &file.filename, &file.bytes).await?;
    let result = run_agent(
        &state,
        AgentKind::ReportExtraction,
        &report_extraction_prompt(&condition),
        &[staged.attachment()],
    )
    .await;
    staged.cleanup(state.cleanup_delay).await;

    let reply = result.map_err(|e| AppError::upstream("Report scanning", e))?;
    let extracted_data = extract_report_data(&reply);
    if extracted_data.is_fallback() {
        info!("Report '{}' returned unstructured data", file.filename);
    }

    Ok(Json(ScanReportResponse {
        success: true,
        patient_id,
        condition,
        filename: file.filename,
        extracted_data,
        scanned_at: iso_timestamp(Local::now().naive_local()),
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{StubInvoker, TestApp};

    #[tokio::test]
    async fn image_analysis_returns_model_text() {
        let stub = StubInvoker::replying("No acute abnormality.");
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart("/api/medical-analysis", Some(("chest.png", b"\x89PNG".as_slice())), &[])
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"analysis": "No acute abnormality."}));
        assert_eq!(stub.last_prompt(), "Analyze this medical image for red flags and abnormalities.");
        assert_eq!(stub.attachments(), vec![("image/png".to_string(), true)]);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn image_analysis_failure_is_server_error_and_cleans_up() {
        let stub = StubInvoker::failing("quota exceeded");
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart("/api/medical-analysis", Some(("xray.jpg", b"jpg".as_slice())), &[])
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("quota exceeded"));
        assert_eq!(stub.calls(), 1);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let stub = StubInvoker::replying("unused");
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart("/api/medical-analysis", None, &[("note", "hello")])
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file provided."}));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn scan_report_rejects_unsupported_extension_before_model_call() {
        let stub = StubInvoker::replying("{}");
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart("/api/health-tracking/scan-report", Some(("scan.txt", b"text".as_slice())), &[])
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Unsupported file type '.txt'. Please upload PNG, JPG, or PDF files."
        );
        assert_eq!(stub.calls(), 0);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn scan_report_returns_structured_data() {
        let reply = "```json\n{\"blood_pressure\": [{\"date\": \"2025-01-20\", \"systolic\": 130, \"diastolic\": 85}], \"summary\": \"Mild elevation\"}\n```";
        let stub = StubInvoker::replying(reply);
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart(
                "/api/health-tracking/scan-report?patient_id=query-patient&condition=Thyroid",
                Some(("Lab Report.PDF", b"%PDF-1.4".as_slice())),
                &[("patient_id", "p-77")],
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["patient_id"], "p-77");
        assert_eq!(body["condition"], "Thyroid");
        assert_eq!(body["filename"], "Lab Report.PDF");
        assert_eq!(body["extracted_data"]["blood_pressure"][0]["systolic"], 130);
        assert_eq!(body["extracted_data"]["summary"], "Mild elevation");
        assert!(body["scanned_at"].as_str().unwrap().contains('T'));

        assert!(stub.last_prompt().contains("Patient Condition: Thyroid"));
        assert_eq!(stub.attachments(), vec![("application/pdf".to_string(), true)]);
        assert_eq!(app.staged_files(), 0);
    }

    #[tokio::test]
    async fn scan_report_defaults_and_fallback() {
        let stub = StubInvoker::replying("The image is too blurry to read.");
        let app = TestApp::new(stub.clone());

        let (status, body) = app
            .post_multipart("/api/health-tracking/scan-report", Some(("report.jpeg", b"jpg".as_slice())), &[])
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patient_id"], "demo_patient");
        assert_eq!(body["condition"], "General");
        assert_eq!(body["extracted_data"]["raw_response"], "The image is too blurry to read.");
        assert_eq!(body["extracted_data"]["error"], "Could not parse structured data from report");
        assert_eq!(body["extracted_data"]["weight"], json!([]));
    }

    #[tokio::test]
    async fn scan_report_timeout_is_server_error() {
        let stub = StubInvoker::stalling(Duration::from_secs(5));
        let app = TestApp::with_timeout(stub.clone(), Duration::from_millis(20));

        let (status, body) = app
            .post_multipart("/api/health-tracking/scan-report", Some(("report.png", b"png".as_slice())), &[])
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Report scanning failed"), "{}", message);
        assert!(message.contains("timed out"), "{}", message);
        assert_eq!(app.staged_files(), 0);
    }
}
