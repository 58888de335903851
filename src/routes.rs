use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Extension, Multipart, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::UploadSettings;
use crate::error::AppError;
use crate::image_upload::{self, ImageUpload};
use crate::models::{BilingualAltText, Caption};
use crate::observability::{request_id_middleware, RequestId};
use crate::service::AltTextService;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AltTextService>,
    pub upload: UploadSettings,
    pub fallback_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyQuery {
    pub hugging_face_api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateQuery {
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.upload.max_bytes.saturating_add(MULTIPART_OVERHEAD);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/generate-caption-plain", post(generate_caption_plain))
        .route("/api/generate-caption", post(generate_caption))
        .route("/api/translate", post(translate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

async fn generate_caption_plain(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Caption>, AppError> {
    let api_key = resolve_api_key(&query, &headers, state.fallback_api_key.as_deref())?;
    let upload = read_upload(multipart, &state.upload).await?;

    let caption = state.service.caption(&upload, &api_key).await?;
    Ok(Json(caption))
}

async fn generate_caption(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BilingualAltText>, AppError> {
    let api_key = resolve_api_key(&query, &headers, state.fallback_api_key.as_deref())?;
    let upload = read_upload(multipart, &state.upload).await?;

    tracing::info!(
        request_id = %request_id,
        file_name = upload.file_name.as_deref().unwrap_or("unknown"),
        bytes = upload.data.len(),
        "Generating bilingual alt text"
    );

    let result = state.service.generate(&upload, &api_key).await?;
    Ok(Json(result))
}

async fn translate(
    State(state): State<AppState>,
    Query(query): Query<TranslateQuery>,
    body: Bytes,
) -> Result<Json<BilingualAltText>, AppError> {
    let text = if body.is_empty() {
        query.alt_text.ok_or(AppError::MissingText)?
    } else {
        serde_json::from_slice::<TranslateRequest>(&body)
            .map_err(|_| AppError::MissingText)?
            .text
    };

    let result = state.service.translate(&text).await?;
    Ok(Json(result))
}

/// Query parameter first, then a bearer token, then the server's own key.
fn resolve_api_key(
    query: &ApiKeyQuery,
    headers: &HeaderMap,
    fallback: Option<&str>,
) -> Result<String, AppError> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    query
        .hugging_face_api_key
        .as_deref()
        .into_iter()
        .chain(from_header)
        .chain(fallback)
        .map(str::trim)
        .find(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(AppError::MissingApiKey)
}

/// Takes the `file` field, or failing that the first field carrying a file name.
/// Runs only after the key check, so a non-multipart body never masks a 401.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    settings: &UploadSettings,
) -> Result<ImageUpload, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        AppError::MalformedUpload(format!(
            "expected multipart/form-data: {}",
            rejection.body_text()
        ))
    })?;

    let to_app_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge {
                limit: settings.max_bytes,
            }
        } else {
            AppError::MalformedUpload(err.body_text())
        }
    };

    let mut candidate = None;
    while let Some(field) = multipart.next_field().await.map_err(to_app_error)? {
        let named_file = field.name() == Some(UPLOAD_FIELD);
        if !named_file && (candidate.is_some() || field.file_name().is_none()) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(to_app_error)?;
        candidate = Some((content_type, file_name, data));

        if named_file {
            break;
        }
    }

    let (content_type, file_name, data) = candidate.ok_or(AppError::MissingFile)?;
    tracing::debug!(
        content_type = content_type.as_deref().unwrap_or("none"),
        bytes = data.len(),
        "Upload received"
    );

    image_upload::validate(content_type.as_deref(), file_name, &data, settings)
}
