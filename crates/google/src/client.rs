//! HTTP client for the Slides and Drive APIs.

use crate::config::GoogleConfig;
use crate::wire::{self, BatchUpdateBody, CopyFileBody, DriveFile, SLIDE_ORDER_FIELDS};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use slides_core::{AdapterError, AdapterErrorKind, Presentation, SlideMutation, SlidesAdapter};

/// Result of probing a presentation through both APIs.
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub presentation_id: String,
    pub file_name: Option<String>,
    pub slides_api_access: bool,
    pub slides_api_error: Option<String>,
    pub drive_api_access: bool,
    pub drive_api_error: Option<String>,
    pub slide_count: usize,
    pub overall_access: bool,
}

/// [`SlidesAdapter`] backed by the Google REST APIs.
#[derive(Debug, Clone)]
pub struct GoogleSlidesClient {
    http: Client,
    config: GoogleConfig,
}

impl GoogleSlidesClient {
    /// Create a client. Every call is bounded by the configured timeout.
    pub fn new(config: GoogleConfig) -> Result<Self, AdapterError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AdapterError::new(
                    AdapterErrorKind::Transport,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;
        log::debug!("Created Google Slides client: {:?}", config);
        Ok(Self { http, config })
    }

    /// Send a request and map any failure to an [`AdapterError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, AdapterError> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AdapterError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(transport_error)
    }

    async fn get_presentation(
        &self,
        presentation_id: &str,
        fields: Option<&str>,
    ) -> Result<Presentation, AdapterError> {
        let mut request = self.http.get(self.config.presentation_url(presentation_id));
        if let Some(fields) = fields {
            request = request.query(&[("fields", fields)]);
        }
        self.send_json(request).await
    }

    /// Drive metadata of a file.
    pub async fn file_metadata(&self, file_id: &str) -> Result<DriveFile, AdapterError> {
        let request = self
            .http
            .get(self.config.file_url(file_id))
            .query(&[("fields", "id,name,mimeType"), ("supportsAllDrives", "true")]);
        self.send_json(request).await
    }

    async fn copy_file(&self, file_id: &str, body: &CopyFileBody) -> Result<DriveFile, AdapterError> {
        let request = self
            .http
            .post(self.config.copy_url(file_id))
            .query(&[("supportsAllDrives", "true")])
            .json(body);
        self.send_json(request).await
    }

    /// Check whether the token can reach a presentation through each API.
    pub async fn verify_access(&self, presentation_id: &str) -> AccessReport {
        log::info!("Verifying access to presentation: {}", presentation_id);

        let (slides_api_access, slides_api_error, slide_count) =
            match self.get_presentation(presentation_id, Some(SLIDE_ORDER_FIELDS)).await {
                Ok(p) => (true, None, p.slide_count()),
                Err(e) => (false, Some(e.to_string()), 0),
            };

        let (drive_api_access, drive_api_error, file_name) =
            match self.file_metadata(presentation_id).await {
                Ok(file) => (true, None, Some(file.name)),
                Err(e) => (false, Some(e.to_string()), None),
            };

        AccessReport {
            presentation_id: presentation_id.to_string(),
            file_name,
            slides_api_access,
            slides_api_error,
            drive_api_access,
            drive_api_error,
            slide_count,
            overall_access: slides_api_access && drive_api_access,
        }
    }
}

/// Map a non-success HTTP status to an adapter error.
pub fn status_error(status: StatusCode, body: &str) -> AdapterError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdapterErrorKind::PermissionDenied,
        StatusCode::NOT_FOUND => AdapterErrorKind::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AdapterErrorKind::Timeout,
        _ => AdapterErrorKind::Api,
    };
    AdapterError::new(kind, format!("HTTP {}: {}", status.as_u16(), wire::error_message(body)))
}

fn transport_error(e: reqwest::Error) -> AdapterError {
    let kind = if e.is_timeout() {
        AdapterErrorKind::Timeout
    } else if e.is_decode() {
        AdapterErrorKind::Decode
    } else {
        AdapterErrorKind::Transport
    };
    AdapterError::new(kind, e.to_string())
}

/// Whether a failed copy into a folder is worth retrying without the folder.
fn retry_without_folder(error: &AdapterError) -> bool {
    matches!(
        error.kind,
        AdapterErrorKind::NotFound | AdapterErrorKind::PermissionDenied | AdapterErrorKind::Api
    )
}

#[async_trait]
impl SlidesAdapter for GoogleSlidesClient {
    async fn fetch_presentation(&self, presentation_id: &str) -> Result<Presentation, AdapterError> {
        log::debug!("Fetching presentation: {}", presentation_id);
        self.get_presentation(presentation_id, None).await
    }

    async fn fetch_slide_order(&self, presentation_id: &str) -> Result<Vec<String>, AdapterError> {
        Ok(self
            .get_presentation(presentation_id, Some(SLIDE_ORDER_FIELDS))
            .await?
            .slide_order())
    }

    async fn fetch_slide_inventory(
        &self,
        presentation_id: &str,
    ) -> Result<Vec<slides_core::SlideDescriptor>, AdapterError> {
        Ok(self
            .get_presentation(presentation_id, Some(SLIDE_ORDER_FIELDS))
            .await?
            .inventory())
    }

    async fn duplicate_presentation(
        &self,
        source_id: &str,
        target_container: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, AdapterError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let source = self.file_metadata(source_id).await?;
                let base = if source.name.is_empty() {
                    "Presentation"
                } else {
                    source.name.as_str()
                };
                format!("Copy of {}", base)
            }
        };

        let mut body = CopyFileBody {
            name,
            parents: target_container.map(|folder| vec![folder.to_string()]),
        };

        let copied = match self.copy_file(source_id, &body).await {
            Ok(file) => file,
            Err(e) if body.parents.is_some() && retry_without_folder(&e) => {
                log::warn!("Copy into folder failed ({}); retrying without parent folder", e);
                body.parents = None;
                self.copy_file(source_id, &body).await?
            }
            Err(e) => return Err(e),
        };

        log::info!("Created copy {} of {}", copied.id, source_id);
        Ok(copied.id)
    }

    async fn apply_slide_mutations(
        &self,
        presentation_id: &str,
        mutations: &[SlideMutation],
    ) -> Result<(), AdapterError> {
        let body = BatchUpdateBody::from_mutations(mutations);
        if body.requests.is_empty() {
            return Ok(());
        }

        log::debug!(
            "Applying {} requests to {}",
            body.requests.len(),
            presentation_id
        );
        let request = self
            .http
            .post(self.config.batch_update_url(presentation_id))
            .json(&body);
        self.send(request).await.map_err(|e| match e.kind {
            AdapterErrorKind::Api => AdapterError::rejected(e.message),
            _ => e,
        })?;
        Ok(())
    }

    async fn delete_presentation(&self, presentation_id: &str) -> Result<(), AdapterError> {
        log::info!("Deleting presentation: {}", presentation_id);
        let request = self
            .http
            .delete(self.config.file_url(presentation_id))
            .query(&[("supportsAllDrives", "true")]);
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let denied = status_error(
            StatusCode::FORBIDDEN,
            r#"{"error": {"code": 403, "message": "The caller does not have permission"}}"#,
        );
        assert_eq!(denied.kind, AdapterErrorKind::PermissionDenied);
        assert_eq!(denied.message, "HTTP 403: The caller does not have permission");

        assert_eq!(status_error(StatusCode::UNAUTHORIZED, "").kind, AdapterErrorKind::PermissionDenied);
        assert_eq!(status_error(StatusCode::NOT_FOUND, "").kind, AdapterErrorKind::NotFound);
        assert_eq!(status_error(StatusCode::GATEWAY_TIMEOUT, "").kind, AdapterErrorKind::Timeout);
        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS, "quota").kind, AdapterErrorKind::Api);
    }

    #[test]
    fn test_folder_retry_policy() {
        assert!(retry_without_folder(&AdapterError::new(AdapterErrorKind::NotFound, "folder")));
        assert!(retry_without_folder(&AdapterError::new(AdapterErrorKind::Api, "bad parent")));
        assert!(!retry_without_folder(&AdapterError::new(AdapterErrorKind::Timeout, "slow")));
        assert!(!retry_without_folder(&AdapterError::new(AdapterErrorKind::Transport, "reset")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let config = GoogleConfig::new("tok")
            .with_slides_base("http://127.0.0.1:9/v1")
            .with_drive_base("http://127.0.0.1:9/drive/v3");
        let client = GoogleSlidesClient::new(config).unwrap();

        let err = client.fetch_slide_order("p1").await.unwrap_err();
        assert!(matches!(
            err.kind,
            AdapterErrorKind::Transport | AdapterErrorKind::Timeout
        ));

        let report = client.verify_access("p1").await;
        assert!(!report.overall_access);
        assert!(report.slides_api_error.is_some());
        assert!(report.drive_api_error.is_some());
        assert_eq!(report.slide_count, 0);
    }
}
