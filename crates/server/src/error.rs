//! Failure responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// JSON failure body: `{success, kind, detail, orphaned_target}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub kind: String,
    pub detail: String,
    pub orphaned_target: Option<String>,
}

/// A failed request, ready to become an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &str, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                kind: kind.to_string(),
                detail: detail.into(),
                orphaned_target: None,
            },
        }
    }

    /// No backend is available because no access token was configured.
    pub fn unconfigured() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Unconfigured",
            "No access token configured; set GOOGLE_ACCESS_TOKEN",
        )
    }
}

fn status_for(error: &slides_core::Error) -> StatusCode {
    use slides_core::Error;
    match error {
        Error::MalformedUrl(_) | Error::InvalidSequence { .. } | Error::OutOfRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        Error::SeedFailed(_) | Error::Adapter { .. } => StatusCode::BAD_GATEWAY,
        Error::OrderMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<slides_core::Error> for ApiError {
    fn from(error: slides_core::Error) -> Self {
        let status = status_for(&error);
        if error.is_caller_error() {
            log::warn!("Rejected request ({}): {}", error.kind(), error);
        } else {
            log::error!("Request failed ({}): {}", error.kind(), error);
        }

        let mut api = Self::new(status, error.kind(), error.to_string());
        api.body.orphaned_target = error.orphaned_target().map(str::to_string);
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slides_core::{AdapterError, AdapterErrorKind, Error};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::MalformedUrl("x".into()), StatusCode::BAD_REQUEST),
            (
                Error::OutOfRange {
                    index: 4,
                    slide_count: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::SeedFailed(AdapterError::new(AdapterErrorKind::PermissionDenied, "no")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                Error::OrderMismatch {
                    target: "t".into(),
                    expected: vec!["a".into()],
                    actual: vec![],
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn test_orphaned_target_is_reported() {
        let api = ApiError::from(Error::Adapter {
            target: Some("copy-1".into()),
            source: AdapterError::rejected("bad request"),
        });
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.body.kind, "AdapterError");
        assert_eq!(api.body.orphaned_target.as_deref(), Some("copy-1"));
        assert!(!api.body.success);
    }
}
