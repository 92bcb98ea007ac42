//! Files handed to the model alongside a prompt.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use doctorx_core::AgentError;

/// A file on disk plus the MIME type it will be sent as.
#[derive(Debug, Clone)]
pub struct Attachment {
    path: PathBuf,
    mime_type: String,
}

impl Attachment {
    /// Creates an attachment, guessing the MIME type from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self { path, mime_type }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Reads the file and returns its contents as standard base64.
    pub async fn read_base64(&self) -> Result<String, AgentError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AgentError::attachment(self.path.display().to_string(), e))?;
        Ok(STANDARD.encode(bytes))
    }

    /// Reads the file as a `data:` URL.
    pub async fn data_url(&self) -> Result<String, AgentError> {
        Ok(format!("data:{};base64,{}", self.mime_type, self.read_base64().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(Attachment::from_path("scan.png").mime_type(), "image/png");
        assert_eq!(Attachment::from_path("scan.JPG").mime_type(), "image/jpeg");
        assert_eq!(Attachment::from_path("report.pdf").mime_type(), "application/pdf");
        assert_eq!(Attachment::from_path("blob").mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn encodes_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.png");
        std::fs::write(&path, b"hi").unwrap();

        let attachment = Attachment::from_path(&path);
        assert_eq!(attachment.read_base64().await.unwrap(), "aGk=");
        assert_eq!(attachment.data_url().await.unwrap(), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let attachment = Attachment::from_path("/nonexistent/doctorx/scan.png");
        let err = attachment.read_base64().await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/doctorx/scan.png"));
    }
}
