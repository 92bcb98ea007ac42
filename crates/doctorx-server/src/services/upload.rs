//! Multipart upload handling and per-request file staging.
//!
//! An upload is written to the staging directory under a unique name, handed
//! to the model by path, then removed. Removal is attempted after every
//! outcome; a failed removal is logged and never changes the response.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Multipart;
use doctorx_llm::Attachment;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Extensions accepted by the report scanner, lowercase with the dot.
pub const REPORT_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".pdf"];

/// The form field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// A file received in a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// A parsed multipart form: the file part plus any text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drains a multipart body.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
                debug!("Received upload '{}' ({} bytes)", filename, bytes.len());
                form.file = Some(UploadedFile { filename, bytes });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid form field '{}': {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Takes the file part, or fails the request when none was sent.
    pub fn require_file(&mut self) -> Result<UploadedFile, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::BadRequest("No file provided.".into()))
    }

    /// Returns a non-empty text field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Lowercased extension including the dot, or empty when there is none.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Accepts only scanned-report formats.
pub fn validate_report_extension(filename: &str) -> Result<(), AppError> {
    let ext = file_extension(filename);
    match REPORT_EXTENSIONS.contains(&ext.as_str()) {
        true => Ok(()),
        false => Err(AppError::BadRequest(format!(
            "Unsupported file type '{}'. Please upload PNG, JPG, or PDF files.",
            ext
        ))),
    }
}

/// Reduces a client-supplied name to a safe final path component.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| match c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
            true => c,
            false => '_',
        })
        .collect();
    match cleaned.trim_matches('.').is_empty() {
        true => "upload".to_string(),
        false => cleaned,
    }
}

/// An upload written to disk for the lifetime of one request.
///
/// Call [`StagedUpload::cleanup`] on every path. If the request is dropped
/// first (client disconnect), `Drop` removes the file synchronously.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    removed: bool,
}

impl StagedUpload {
    /// Writes `bytes` to `<dir>/<prefix>_<uuid>_<sanitized name>`.
    pub async fn stage(dir: &Path, prefix: &str, filename: &str, bytes: &[u8]) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to prepare upload directory: {}", e))
        })?;

        let path = dir.join(format!(
            "{}_{}_{}",
            prefix,
            Uuid::new_v4().simple(),
            sanitize_filename(filename)
        ));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;

        info!("Staged upload at {}", path.display());
        Ok(Self { path, removed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The staged file as a model attachment.
    pub fn attachment(&self) -> Attachment {
        Attachment::from_path(&self.path)
    }

    /// Waits `delay`, then deletes the file. Failures are only logged.
    pub async fn cleanup(mut self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => info!("Deleted temp file: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not delete temp file {}: {}", self.path.display(), e),
        }
        self.removed = true;
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Could not delete temp file {}: {}", self.path.display(), e);
            }
        }
    }
}
