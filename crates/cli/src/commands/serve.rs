//! Serve command handler.
//!
//! HTTP boundary over the answering engine:
//! - `POST /ask` with `{query, ...AskParams}` returns an `AnswerResult`
//! - `GET /health` returns `{ready, evidenceRowCount}`
//!
//! Errors are returned as `{error, kind}` with 422 for invalid
//! parameters, 503 when a backend is unavailable, 504 on timeout and
//! 500 otherwise.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Args;
use grounded_core::{config::AppConfig, AppError, AppResult};
use grounded_knowledge::{AnswerEngine, AnswerResult, AskParams, HealthStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use super::open_engine;

/// Serve the answering pipeline over HTTP
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Listen address (overrides server.addr)
    #[arg(long)]
    pub addr: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let engine = open_engine(config)?;
        let health = engine.health();
        tracing::info!(
            "Evidence store loaded: {} rows, ready={}",
            health.evidence_row_count,
            health.ready
        );

        let state = AppState {
            engine,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        };

        let addr = self.addr.as_deref().unwrap_or(&config.server.addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;
        tracing::info!("Listening on http://{}", addr);

        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    engine: AnswerEngine,
    request_timeout: Duration,
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    query: String,
    #[serde(flatten)]
    params: AskParams,
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResult>, ApiError> {
    let answer = tokio::time::timeout(
        state.request_timeout,
        state.engine.ask(&request.query, &request.params),
    )
    .await
    .map_err(|_| ApiError::timeout(state.request_timeout))??;

    Ok(Json(answer))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.engine.health())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn timeout(limit: Duration) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            body: ErrorBody {
                error: format!("Request exceeded {}s", limit.as_secs()),
                kind: "timeout",
            },
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Backend(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::warn!("Request rejected: {}", err);
        }
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                kind: err.kind(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
