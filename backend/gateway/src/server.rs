//! HTTP gateway server.
//!
//! Serves the handler over HTTP for container or local deployments.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use imageguard_core::{GuardError, LocationType};

use crate::envelope::ResponseEnvelope;
use crate::event::AnalysisInput;
use crate::handler::EventHandler;

/// Largest accepted request body. Base64 inflates images by a third.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub handler: Arc<EventHandler>,
    pub model: String,
}

impl GatewayState {
    pub fn new(handler: EventHandler, model: impl Into<String>) -> Self {
        Self {
            handler: Arc::new(handler),
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawParams {
    location_type: Option<String>,
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/analyze", post(analyze).fallback(unknown_route))
        .route("/v1/analyze/raw", post(analyze_raw).fallback(unknown_route))
        .route("/v1/invoke", post(invoke).fallback(unknown_route))
        .route("/api/health", get(health).fallback(unknown_route))
        .fallback(unknown_route)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and runs until ctrl-c.
pub async fn start_server(addr: &str, state: GatewayState) -> Result<()> {
    let app = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Gateway HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

/// Body extraction failures answer with an envelope instead of axum's plain-text rejection.
fn body_error(rejection: &BytesRejection) -> ResponseEnvelope {
    let detail = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!("request body exceeds {MAX_BODY_BYTES} bytes")
    } else {
        "request body could not be read".to_string()
    };
    ResponseEnvelope::from_error(&GuardError::InvalidInput(detail))
}

async fn run_event(state: &GatewayState, body: Result<Bytes, BytesRejection>) -> ResponseEnvelope {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_error(&rejection),
    };
    match serde_json::from_slice::<Value>(&body) {
        Ok(event) => state.handler.handle_value(event).await,
        Err(_) => {
            ResponseEnvelope::from_error(&GuardError::InvalidInput("request body is not JSON".into()))
        }
    }
}

/// Handler for `POST /v1/analyze`: the envelope becomes the HTTP response.
async fn analyze(
    State(state): State<GatewayState>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    run_event(&state, body).await
}

/// Handler for `POST /v1/analyze/raw`: the body is the image itself.
async fn analyze_raw(
    State(state): State<GatewayState>,
    params: Result<Query<RawParams>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let Ok(Query(params)) = params else {
        return ResponseEnvelope::from_error(&GuardError::InvalidInput(
            "query string is malformed".into(),
        ));
    };
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return body_error(&rejection),
    };
    if body.is_empty() {
        return ResponseEnvelope::from_error(&GuardError::InvalidInput("'image'".into()));
    }
    let input = AnalysisInput {
        image: body.to_vec(),
        location: LocationType::parse(params.location_type.as_deref()),
    };
    state.handler.handle_input(input).await
}

/// Handler for `POST /v1/invoke`: returns the envelope itself, Lambda style.
async fn invoke(
    State(state): State<GatewayState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<ResponseEnvelope> {
    Json(run_event(&state, body).await)
}

/// Unknown paths and methods still get a JSON envelope.
async fn unknown_route(uri: Uri) -> ResponseEnvelope {
    ResponseEnvelope::from_error(&GuardError::InvalidInput(format!(
        "no route for {}",
        uri.path()
    )))
}

/// Handler for `GET /api/health`
async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "analyzer": state.handler.analyzer_name(),
        "model": state.model,
    }))
}
