use crate::config::Config;
use crate::error::HarnessError;
use crate::relay::{OcrRelay, UpstreamOutcome};
use crate::render;
use crate::submission::{Enhancement, OutputFormat, Profile, Submission};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<OcrRelay>,
    pub config: Arc<Config>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_url: String,
    pub upstream_reachable: bool,
}

/// Build the router; factored out so tests can drive it directly
pub fn app(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;
    Router::new()
        .route("/", get(handle_form).post(handle_submit))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let relay = OcrRelay::new(&config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        relay: Arc::new(relay),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Render the empty upload form
async fn handle_form() -> Html<String> {
    Html(render::form_page())
}

/// Handle one form submission: parse the multipart body, relay it to the
/// OCR service, render the outcome above a fresh form
async fn handle_submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, HarnessError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut profile = Profile::default();
    let mut format = OutputFormat::default();
    let mut enhance: Option<Enhancement> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HarnessError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "document" => {
                file_name = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    HarnessError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "profile" => {
                let value = field.text().await.map_err(|e| {
                    HarnessError::InvalidRequest(format!("Invalid profile field: {}", e))
                })?;
                if !value.is_empty() {
                    profile =
                        Profile::from_str(&value).ok_or(HarnessError::UnknownProfile(value))?;
                }
            }
            "format" => {
                let value = field.text().await.map_err(|e| {
                    HarnessError::InvalidRequest(format!("Invalid format field: {}", e))
                })?;
                if !value.is_empty() {
                    format =
                        OutputFormat::from_str(&value).ok_or(HarnessError::UnknownFormat(value))?;
                }
            }
            "enhance" => {
                let value = field.text().await.map_err(|e| {
                    HarnessError::InvalidRequest(format!("Invalid enhance field: {}", e))
                })?;
                if !value.is_empty() {
                    enhance = Some(
                        Enhancement::from_str(&value)
                            .ok_or(HarnessError::UnknownEnhancement(value))?,
                    );
                }
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(HarnessError::MissingDocument)?;

    let submission = Submission {
        file_name: file_name.unwrap_or_else(|| "document".to_string()),
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
        profile,
        format,
        enhance,
    };

    let outcome = state.relay.submit(&submission).await?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &outcome {
        UpstreamOutcome::Unreachable { detail } => {
            tracing::warn!("OCR service unreachable after {}ms: {}", elapsed_ms, detail);
        }
        UpstreamOutcome::Replied { status, body } if *status != 200 => {
            tracing::warn!(
                "OCR service answered {} in {}ms, body length: {}",
                status,
                elapsed_ms,
                body.len()
            );
        }
        UpstreamOutcome::Replied { body, .. } => {
            tracing::info!(
                "Relayed {:?} as {} in {}ms, body length: {}",
                submission.file_name,
                submission.format.as_str(),
                elapsed_ms,
                body.len()
            );
        }
    }

    Ok(Html(render::results_page(submission.format, &outcome)))
}

/// Handle health check requests, probing the upstream OCR service
async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_url: state.config.ocr_url.clone(),
        upstream_reachable: state.relay.upstream_reachable().await,
    })
}
