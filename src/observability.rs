use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use crate::config::{Settings, DEFAULT_LOG_FILTER};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Installs the global subscriber from the logging settings and logs where
/// requests will be relayed to.
pub fn init_tracing(settings: &Settings) -> Result<(), TryInitError> {
    let logging = &settings.logging;
    let (env_filter, filter_ok) = build_filter(&logging.filter);

    if logging.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()?;
    }

    if !filter_ok {
        tracing::warn!(filter = %logging.filter, fallback = DEFAULT_LOG_FILTER, "Invalid RUST_LOG");
    }

    tracing::info!(
        port = settings.server.port,
        environment = %logging.environment,
        caption_api = %settings.caption.api_url,
        translation_api = %settings.translation.api_url,
        target_lang = %settings.translation.target_lang,
        max_upload_bytes = settings.upload.max_bytes,
        "Relay initialized"
    );

    Ok(())
}

/// Parses `directives`, falling back to the default filter when they are invalid.
fn build_filter(directives: &str) -> (EnvFilter, bool) {
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(DEFAULT_LOG_FILTER), false),
    }
}

/// Client-supplied ids are kept only if they are short printable ASCII.
fn accept_request_id(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let printable = trimmed.bytes().all(|b| b.is_ascii_graphic());
    (!trimmed.is_empty() && trimmed.len() <= MAX_REQUEST_ID_LEN && printable).then_some(trimmed)
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(accept_request_id)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
