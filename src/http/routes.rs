use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::Value;

use super::GateRegistry;
use crate::error::{ErrorCode, InferenceError};
use crate::gate::{InferenceGate, Prediction};

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<GateRegistry>,
}

impl AppState {
    pub fn new(registry: GateRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &GateRegistry {
        &self.registry
    }
}

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    UnknownDomain(String),
    InvalidJson(String),
    Inference(InferenceError),
}

impl HttpServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownDomain(_) => StatusCode::NOT_FOUND,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Inference(err) if err.kind().is_client_error() => StatusCode::BAD_REQUEST,
            Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InferenceError> for HttpServerError {
    fn from(err: InferenceError) -> Self {
        Self::Inference(err)
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::UnknownDomain(domain) => format!("unknown domain '{}'", domain),
            Self::InvalidJson(details) => format!("invalid JSON body: {}", details),
            Self::Inference(err) => err.message(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub domains: Vec<DomainStatus>,
}

#[derive(Debug, Serialize)]
pub struct DomainStatus {
    pub domain: String,
    pub loaded: bool,
    pub expected_rows: usize,
    pub expected_cols: usize,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict_default))
        .route("/predict/:domain", post(predict_domain))
        .with_state(state)
}

/// Run the HTTP server loop until `shutdown` resolves.
pub async fn run_http_server<F>(state: AppState, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding inference listener on {}", addr))?;
    tracing::info!("[HTTP] Serving {} domains on {}", state.registry().len(), addr);

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving inference router")?;
    tracing::info!("[HTTP] Server stopped");
    Ok(())
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let domains = state
        .registry()
        .gates()
        .iter()
        .map(|gate| DomainStatus {
            domain: gate.domain().to_string(),
            loaded: gate.is_loaded(),
            expected_rows: gate.contract().expected_rows,
            expected_cols: gate.contract().expected_cols,
        })
        .collect();

    Json(HealthResponse {
        status: "ok",
        domains,
    })
}

pub async fn predict_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    body: Bytes,
) -> Result<Json<Prediction>, HttpServerError> {
    let gate = state
        .registry()
        .get(&domain)
        .ok_or_else(|| HttpServerError::UnknownDomain(domain.clone()))?;
    serve_prediction(gate, &body)
}

pub async fn predict_default(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Prediction>, HttpServerError> {
    let gate = state
        .registry()
        .default_gate()
        .ok_or_else(|| HttpServerError::UnknownDomain("default".to_string()))?;
    serve_prediction(gate, &body)
}

fn serve_prediction(gate: &InferenceGate, body: &[u8]) -> Result<Json<Prediction>, HttpServerError> {
    tracing::debug!("[HTTP] {} request ({} bytes)", gate.domain(), body.len());
    gate.ensure_loaded()?;

    let payload: Value = serde_json::from_slice(body).map_err(|err| {
        tracing::warn!("[HTTP] {} rejected malformed JSON: {}", gate.domain(), err);
        HttpServerError::InvalidJson(err.to_string())
    })?;

    let prediction = gate.predict(&payload)?;
    tracing::info!(
        "[HTTP] {} probability={:.4}",
        gate.domain(),
        prediction.probability
    );
    Ok(Json(prediction))
}
