//! HTTP client for the table-extraction backend.

mod api_types;

pub use api_types::{
    AckResponse, CellEdit, DocumentResponse, DocumentsResponse, FindJsonResponse,
    ProcessImageResponse, SaveEditsRequest, SaveResultsRequest, TextEdit,
};

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::models::{DocumentDetail, DocumentSummary, OcrResults};

/// Image extensions the backend accepts for upload.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Errors from backend requests.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response payload: {0}")]
    Validation(String),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether this error is a "not found"-class failure that the edit
    /// resolver recovers from via its fallback cascade. Matches the message
    /// patterns the backend uses alongside the structural cases.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Http { status, .. } => *status == 404,
            Self::Api(message) => {
                message.contains("No matching") || message.contains("not found")
            }
            _ => false,
        }
    }
}

/// The slice of the backend the edit resolver depends on.
///
/// Kept as a trait so resolution and cascade behavior can be exercised
/// against an in-memory backend in tests.
#[async_trait]
pub trait EditStore: Send + Sync {
    /// Look up result JSON filenames matching a base prefix.
    async fn find_json(&self, base_prefix: &str) -> Result<FindJsonResponse, ApiError>;

    /// Persist edits into the named result file.
    async fn save_edits(&self, filename: &str, changes: &SaveEditsRequest)
        -> Result<(), ApiError>;
}

/// Client for the review backend's REST interface.
#[derive(Clone)]
pub struct ReviewClient {
    client: Client,
    base_url: Url,
    request_delay: Duration,
}

impl ReviewClient {
    /// Create a client from settings.
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&settings.server_url)?;
        // Relative endpoint joins need the base path to end with a slash.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = Client::builder()
            .user_agent(concat!("tabledit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            request_delay: Duration::from_millis(settings.request_delay_ms),
        })
    }

    /// Build an endpoint URL, percent-encoding the trailing path segment.
    fn endpoint(&self, path: &str, segment: Option<&str>) -> Result<Url, ApiError> {
        let joined = match segment {
            Some(segment) => format!("{}/{}", path, urlencoding::encode(segment)),
            None => path.to_string(),
        };
        Ok(self.base_url.join(&joined)?)
    }

    /// Apply the configured inter-request delay.
    async fn pace(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Map a non-2xx response to an error, keeping the body for diagnosis.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            Err(ApiError::NotFound(message))
        } else {
            Err(ApiError::Http {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Upload an image for processing.
    ///
    /// Returns the artifact paths and, when the backend includes it, the
    /// parsed result document.
    pub async fn process_image(&self, image_path: &Path) -> Result<ProcessImageResponse, ApiError> {
        let filename = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let extension = image_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::Validation(format!(
                "Unsupported image type '{}' (expected one of: {})",
                extension,
                ALLOWED_IMAGE_EXTENSIONS.join(", ")
            )));
        }

        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| ApiError::Validation(format!("Cannot read {}: {}", filename, e)))?;
        let part = multipart::Part::bytes(bytes).file_name(filename.clone());
        let form = multipart::Form::new().part("file", part);

        let url = self.endpoint("process_image", None)?;
        debug!("Uploading {} to {}", filename, url);
        let response = self.client.post(url).multipart(form).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: ProcessImageResponse = response.json().await?;
        self.pace().await;

        if parsed.status.as_deref() != Some("success") {
            return Err(ApiError::Api(
                parsed
                    .error
                    .unwrap_or_else(|| "Image processing failed".to_string()),
            ));
        }
        Ok(parsed)
    }

    /// Fetch a result JSON file served from the backend's output directory.
    pub async fn fetch_results(&self, filename: &str) -> Result<OcrResults, ApiError> {
        let url = self.endpoint("output", Some(filename))?;
        debug!("Fetching result document {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        self.pace().await;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::Validation(format!("Malformed result document {}: {}", filename, e))
        })
    }

    /// Save the current session as a named document.
    pub async fn save_results(&self, request: &SaveResultsRequest) -> Result<(), ApiError> {
        let url = self.endpoint("save_results", None)?;
        let response = self.client.post(url).json(request).send().await?;
        let response = Self::check_status(response).await?;
        let ack: AckResponse = response.json().await?;
        self.pace().await;

        if ack.success {
            Ok(())
        } else {
            Err(ApiError::Api(
                ack.error.unwrap_or_else(|| "Failed to save document".to_string()),
            ))
        }
    }

    /// List saved documents.
    pub async fn get_documents(&self) -> Result<Vec<DocumentSummary>, ApiError> {
        let url = self.endpoint("get_documents", None)?;
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: DocumentsResponse = response.json().await?;
        self.pace().await;

        if parsed.success {
            Ok(parsed.documents)
        } else {
            Err(ApiError::Api(
                parsed
                    .error
                    .unwrap_or_else(|| "Failed to load documents".to_string()),
            ))
        }
    }

    /// Fetch one saved document with its text items.
    pub async fn get_document(&self, id: &str) -> Result<DocumentDetail, ApiError> {
        let url = self.endpoint("get_document", Some(id))?;
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: DocumentResponse = response.json().await?;
        self.pace().await;

        if !parsed.success {
            return Err(ApiError::Api(
                parsed
                    .error
                    .unwrap_or_else(|| "Failed to load document".to_string()),
            ));
        }
        parsed
            .document
            .ok_or_else(|| ApiError::Validation("Document payload missing".to_string()))
    }
}

#[async_trait]
impl EditStore for ReviewClient {
    async fn find_json(&self, base_prefix: &str) -> Result<FindJsonResponse, ApiError> {
        let url = self.endpoint("find_json", Some(base_prefix))?;
        debug!("Looking up result files for prefix '{}'", base_prefix);
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response).await?;
        let parsed: FindJsonResponse = response.json().await?;
        self.pace().await;

        if parsed.success {
            Ok(parsed)
        } else {
            Err(ApiError::Api(
                parsed
                    .error
                    .unwrap_or_else(|| "Failed to find JSON file".to_string()),
            ))
        }
    }

    async fn save_edits(
        &self,
        filename: &str,
        changes: &SaveEditsRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint("save_edits", Some(filename))?;
        debug!("Saving edits to {}", filename);
        let response = self.client.post(url).json(changes).send().await?;
        let response = Self::check_status(response).await?;
        let ack: AckResponse = response.json().await?;
        self.pace().await;

        if ack.success {
            Ok(())
        } else {
            Err(ApiError::Api(
                ack.error
                    .unwrap_or_else(|| "Unknown error saving changes".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_classification() {
        assert!(ApiError::NotFound("gone".to_string()).is_not_found());
        assert!(ApiError::Http {
            status: 404,
            message: String::new()
        }
        .is_not_found());
        assert!(ApiError::Api("No matching JSON file found".to_string()).is_not_found());
        assert!(ApiError::Api("file not found on disk".to_string()).is_not_found());
        assert!(!ApiError::Api("disk full".to_string()).is_not_found());
        assert!(!ApiError::Http {
            status: 500,
            message: String::new()
        }
        .is_not_found());
    }
}
