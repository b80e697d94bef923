//! Connection settings for the Google backend.

use std::fmt;
use std::time::Duration;

/// Default Slides API root.
pub const DEFAULT_SLIDES_BASE: &str = "https://slides.googleapis.com/v1";

/// Default Drive API root.
pub const DEFAULT_DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`crate::GoogleSlidesClient`].
#[derive(Clone)]
pub struct GoogleConfig {
    pub(crate) access_token: String,
    pub(crate) slides_base: String,
    pub(crate) drive_base: String,
    pub(crate) timeout: Duration,
}

impl GoogleConfig {
    /// Create settings with the given bearer token and default endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            slides_base: DEFAULT_SLIDES_BASE.to_string(),
            drive_base: DEFAULT_DRIVE_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the Slides API root.
    pub fn with_slides_base(mut self, base: impl Into<String>) -> Self {
        self.slides_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the Drive API root.
    pub fn with_drive_base(mut self, base: impl Into<String>) -> Self {
        self.drive_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_secs(1)); // At least one second
        self
    }

    pub(crate) fn presentation_url(&self, presentation_id: &str) -> String {
        format!("{}/presentations/{}", self.slides_base, presentation_id)
    }

    pub(crate) fn batch_update_url(&self, presentation_id: &str) -> String {
        format!("{}/presentations/{}:batchUpdate", self.slides_base, presentation_id)
    }

    pub(crate) fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.drive_base, file_id)
    }

    pub(crate) fn copy_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/copy", self.drive_base, file_id)
    }
}

// The token stays out of logs.
impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("access_token", &"<redacted>")
            .field("slides_base", &self.slides_base)
            .field("drive_base", &self.drive_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
