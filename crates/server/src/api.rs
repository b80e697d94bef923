//! HTTP API for marker scans and slide composition.

use crate::error::ApiError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use slides_core::{
    extract_folder_id, extract_presentation_id, service, SequenceRequest, SlideDescriptor,
    SlidesAdapter,
};
use slides_google::{AccessReport, GoogleSlidesClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// API state holding the presentation backend.
#[derive(Clone, Default)]
pub struct ApiState {
    backend: Option<Arc<dyn SlidesAdapter>>,
    google: Option<Arc<GoogleSlidesClient>>,
}

impl ApiState {
    /// State serving requests from any backend.
    pub fn new(backend: Arc<dyn SlidesAdapter>) -> Self {
        Self {
            backend: Some(backend),
            google: None,
        }
    }

    /// State serving requests from the Google backend, with access checks.
    pub fn google(client: GoogleSlidesClient) -> Self {
        let client = Arc::new(client);
        let backend: Arc<dyn SlidesAdapter> = client.clone();
        Self {
            backend: Some(backend),
            google: Some(client),
        }
    }

    /// State without credentials; every data route answers 503.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    fn backend(&self) -> Result<Arc<dyn SlidesAdapter>, ApiError> {
        self.backend.clone().ok_or_else(ApiError::unconfigured)
    }
}

/// Creates the API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/api/health", get(health_check))
        .route("/api/extract-slide-ids", post(extract_slide_ids))
        .route("/api/get-slide-components", post(get_slide_components))
        .route("/api/slides", post(list_slides))
        .route("/api/compose", post(compose))
        .route("/api/verify-access", post(verify_access))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresentationRequest {
    pub presentation_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlideComponentsRequest {
    pub presentation_url: String,
    pub slide_index: usize,
}

/// Either `sequence` or `slide_counts` must be given, not both.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeRequest {
    pub presentation_url: String,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub sequence: Option<Vec<usize>>,
    #[serde(default)]
    pub slide_counts: Option<BTreeMap<usize, usize>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideIdsResponse {
    pub success: bool,
    pub slide_identifiers: BTreeMap<usize, Vec<String>>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideComponentsResponse {
    pub success: bool,
    pub slide_index: usize,
    pub components: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlidesResponse {
    pub success: bool,
    pub slides: Vec<SlideDescriptor>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposeResponse {
    pub success: bool,
    pub new_presentation_id: String,
    pub new_presentation_url: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyAccessResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: AccessReport,
    pub message: String,
}

async fn service_info() -> impl IntoResponse {
    Json(json!({
        "service": "slides-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /api/health",
            "extract_ids": "POST /api/extract-slide-ids",
            "get_components": "POST /api/get-slide-components",
            "slides": "POST /api/slides",
            "compose": "POST /api/compose",
            "verify_access": "POST /api/verify-access"
        }
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let body = if state.backend.is_some() {
        HealthResponse {
            status: "healthy".into(),
            message: "Service ready".into(),
        }
    } else {
        log::warn!("Health check: no access token configured");
        HealthResponse {
            status: "warning".into(),
            message: "No access token configured; set GOOGLE_ACCESS_TOKEN".into(),
        }
    };
    (StatusCode::OK, Json(body))
}

pub async fn extract_slide_ids(
    State(state): State<ApiState>,
    Json(request): Json<PresentationRequest>,
) -> Result<Json<SlideIdsResponse>, ApiError> {
    let backend = state.backend()?;
    let id = extract_presentation_id(&request.presentation_url)?;
    let slide_identifiers = service::extract_slide_ids(&*backend, &id).await?;

    log::info!("Extracted identifiers from {} slides of {}", slide_identifiers.len(), id);
    Ok(Json(SlideIdsResponse {
        success: true,
        message: format!("Found {} slides with identifiers", slide_identifiers.len()),
        slide_identifiers,
    }))
}

pub async fn get_slide_components(
    State(state): State<ApiState>,
    Json(request): Json<SlideComponentsRequest>,
) -> Result<Json<SlideComponentsResponse>, ApiError> {
    let backend = state.backend()?;
    let id = extract_presentation_id(&request.presentation_url)?;
    let components = service::slide_components(&*backend, &id, request.slide_index).await?;

    log::info!(
        "Extracted {} components from slide {} of {}",
        components.len(),
        request.slide_index,
        id
    );
    Ok(Json(SlideComponentsResponse {
        success: true,
        slide_index: request.slide_index,
        message: format!(
            "Found {} components on slide {}",
            components.len(),
            request.slide_index
        ),
        components,
    }))
}

pub async fn list_slides(
    State(state): State<ApiState>,
    Json(request): Json<PresentationRequest>,
) -> Result<Json<SlidesResponse>, ApiError> {
    let backend = state.backend()?;
    let id = extract_presentation_id(&request.presentation_url)?;
    let slides = service::list_slides(&*backend, &id).await?;

    Ok(Json(SlidesResponse {
        success: true,
        message: format!("Presentation has {} slides", slides.len()),
        slides,
    }))
}

pub async fn compose(
    State(state): State<ApiState>,
    Json(request): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>, ApiError> {
    let backend = state.backend()?;
    let source_id = extract_presentation_id(&request.presentation_url)?;
    let folder = match request.folder.as_deref().map(str::trim) {
        Some(folder) if !folder.is_empty() => Some(extract_folder_id(folder).ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "MalformedUrl",
                format!("Could not extract a folder id from: {}", folder),
            )
        })?),
        _ => None,
    };

    let composed = match (request.sequence, request.slide_counts) {
        (Some(sequence), None) => {
            let request = SequenceRequest {
                source_presentation_id: source_id,
                target_container: folder,
                new_name: request.new_name,
                sequence,
            };
            service::compose_sequence(&*backend, &request).await?
        }
        (None, Some(counts)) => {
            service::compose_counts(&*backend, &source_id, &counts, folder, request.new_name)
                .await?
        }
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "InvalidSequence",
                "Provide exactly one of sequence or slide_counts",
            ))
        }
    };

    log::info!("Composed presentation {}", composed.presentation_id);
    Ok(Json(ComposeResponse {
        success: true,
        message: format!("Created presentation {}", composed.presentation_id),
        new_presentation_id: composed.presentation_id,
        new_presentation_url: composed.url,
    }))
}

pub async fn verify_access(
    State(state): State<ApiState>,
    Json(request): Json<PresentationRequest>,
) -> Result<Json<VerifyAccessResponse>, ApiError> {
    state.backend()?;
    let client = state.google.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::NOT_IMPLEMENTED,
            "Unsupported",
            "Access checks need the Google backend",
        )
    })?;
    let id = extract_presentation_id(&request.presentation_url)?;
    let report = client.verify_access(&id).await;

    let message = if report.overall_access {
        "Presentation is accessible through both APIs".to_string()
    } else {
        "Presentation is not fully accessible".to_string()
    };
    Ok(Json(VerifyAccessResponse {
        success: report.overall_access,
        report,
        message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slides_core::{MemorySlides, Page, Presentation};

    fn memory() -> Arc<MemorySlides> {
        let memory = MemorySlides::new();
        let mut deck = Presentation::new("src", "Plantilla");
        deck.add_slide(
            Page::new("A")
                .with_text_shape("a1", "Portada $portada")
                .with_text_shape("a2", "#titulo y #fecha"),
        );
        deck.add_slide(Page::new("B").with_text_shape("b1", "cuerpo"));
        deck.add_slide(Page::new("C").with_text_shape("c1", "Fin $cierre"));
        memory.insert(deck);
        Arc::new(memory)
    }

    fn url() -> String {
        "https://docs.google.com/presentation/d/src/edit".to_string()
    }

    #[tokio::test]
    async fn test_extract_slide_ids() {
        let state = ApiState::new(memory());
        let Json(response) = extract_slide_ids(
            State(state),
            Json(PresentationRequest {
                presentation_url: url(),
            }),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.slide_identifiers.len(), 2);
        assert_eq!(response.slide_identifiers[&0], vec!["$portada"]);
        assert_eq!(response.slide_identifiers[&2], vec!["$cierre"]);
    }

    #[tokio::test]
    async fn test_slide_components_out_of_range() {
        let state = ApiState::new(memory());
        let Json(response) = get_slide_components(
            State(state.clone()),
            Json(SlideComponentsRequest {
                presentation_url: url(),
                slide_index: 0,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.components, vec!["#fecha", "#titulo"]);

        let err = get_slide_components(
            State(state),
            Json(SlideComponentsRequest {
                presentation_url: url(),
                slide_index: 3,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.kind, "OutOfRange");
    }

    #[tokio::test]
    async fn test_malformed_url() {
        let err = list_slides(
            State(ApiState::new(memory())),
            Json(PresentationRequest {
                presentation_url: "https://example.com/nothing/here".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.kind, "MalformedUrl");
    }

    #[tokio::test]
    async fn test_compose_sequence() {
        let memory = memory();
        let state = ApiState::new(memory.clone());
        let Json(response) = compose(
            State(state),
            Json(ComposeRequest {
                presentation_url: url(),
                folder: None,
                new_name: Some("Resultado".into()),
                sequence: Some(vec![2, 0, 0]),
                slide_counts: None,
            }),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert!(response.new_presentation_url.ends_with("/edit"));
        let created = memory.get(&response.new_presentation_id).unwrap();
        assert_eq!(created.title, "Resultado");
        assert_eq!(created.slide_count(), 3);
    }

    #[tokio::test]
    async fn test_compose_counts_from_json() {
        let memory = memory();
        let request: ComposeRequest = serde_json::from_value(json!({
            "presentation_url": "src",
            "slide_counts": {"1": 0, "2": 3}
        }))
        .unwrap();

        let Json(response) = compose(State(ApiState::new(memory.clone())), Json(request))
            .await
            .unwrap();
        assert_eq!(memory.get(&response.new_presentation_id).unwrap().slide_count(), 4);
    }

    #[tokio::test]
    async fn test_compose_rejects_empty_sequence_before_any_call() {
        let memory = memory();
        let err = compose(
            State(ApiState::new(memory.clone())),
            Json(ComposeRequest {
                presentation_url: url(),
                folder: None,
                new_name: None,
                sequence: Some(vec![]),
                slide_counts: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.kind, "InvalidSequence");
        assert_eq!(memory.call_count(), 0);
        assert_eq!(memory.presentation_count(), 1);
    }

    #[tokio::test]
    async fn test_compose_needs_exactly_one_mode() {
        let err = compose(
            State(ApiState::new(memory())),
            Json(ComposeRequest {
                presentation_url: url(),
                folder: None,
                new_name: None,
                sequence: None,
                slide_counts: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unconfigured_state() {
        let state = ApiState::unconfigured();
        let err = list_slides(
            State(state.clone()),
            Json(PresentationRequest {
                presentation_url: url(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let response = health_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_compose_rejects_unparseable_folder() {
        let memory = memory();
        let err = compose(
            State(ApiState::new(memory.clone())),
            Json(ComposeRequest {
                presentation_url: url(),
                folder: Some("https://example.com/not/a/folder".into()),
                new_name: None,
                sequence: Some(vec![0]),
                slide_counts: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.kind, "MalformedUrl");
        assert_eq!(memory.presentation_count(), 1);
    }

    #[tokio::test]
    async fn test_compose_accepts_folder_url_or_blank() {
        let memory = memory();
        for folder in ["https://drive.google.com/drive/folders/abc123", "  "] {
            let Json(response) = compose(
                State(ApiState::new(memory.clone())),
                Json(ComposeRequest {
                    presentation_url: url(),
                    folder: Some(folder.into()),
                    new_name: None,
                    sequence: Some(vec![1]),
                    slide_counts: None,
                }),
            )
            .await
            .unwrap();
            assert!(response.success);
        }
        assert_eq!(memory.presentation_count(), 3);
    }

    #[tokio::test]
    async fn test_router_allows_cross_origin_requests() {
        use axum::body::Body;
        use axum::http::{header, Method, Request};
        use tower::ServiceExt;

        let response = create_router(ApiState::new(memory()))
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );

        let preflight = create_router(ApiState::new(memory()))
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/compose")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(preflight.status().is_success());
        assert!(preflight
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn test_verify_access_needs_google_backend() {
        let err = verify_access(
            State(ApiState::new(memory())),
            Json(PresentationRequest {
                presentation_url: url(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_IMPLEMENTED);
    }
}
