use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::handlers::{DetectError, IngredientDetector};
use crate::models::{DetectResponse, ErrorResponse};

pub struct AppState {
    pub detector: Arc<IngredientDetector>,
}

pub fn create_router(detector: Arc<IngredientDetector>) -> Router {
    let state = Arc::new(AppState { detector });

    // Any origin, with credentials: wildcards are not allowed together with
    // credentials, so mirror whatever the browser sends
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(root_handler))
        .route("/detect", post(detect_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        log::error!("❌ Detection failed [{}]: {}", self.kind(), self);

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn detect_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, DetectError> {
    let mut multipart = multipart.map_err(|e| DetectError::Upload(e.to_string()))?;

    let image = read_image_field(&mut multipart).await?;
    log::info!("📸 Received image upload: {} bytes", image.len());

    let ingredient = state.detector.detect(&image).await?;

    Ok(Json(DetectResponse { ingredient }))
}

/// Read the `image` field fully into memory; other fields are skipped
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, DetectError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DetectError::Upload(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| DetectError::Upload(e.to_string()))?;
        return Ok(data.to_vec());
    }

    Err(DetectError::MissingImage)
}

async fn root_handler() -> &'static str {
    "Food Vision Service - POST an image to /detect as multipart field 'image'"
}

async fn health_check() -> &'static str {
    "OK"
}
