//! HTTP routes for the execution service

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use polyrun_common::{ExecutionRequest, LanguageId, RunRequest, RunResponse};
use polyrun_sandbox::Dispatcher;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the execution server.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/execute", post(handle_execute))
        .route("/health", get(handle_health))
        .route("/languages", get(handle_languages))
        .with_state(state)
}

/// Handle one execute request.
///
/// Malformed requests (empty code, unknown language string) are rejected
/// here, before any scratch directory or child process exists. All routine
/// outcomes - including the executed code's own failures - map to the flat
/// `{success, ...}` contract; only an internal sandbox error becomes an
/// HTTP error.
async fn handle_execute(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunResponse>, StatusCode> {
    if request.code.trim().is_empty() {
        return Ok(Json(RunResponse::err("code must not be empty")));
    }

    let Ok(language) = request.language.parse::<LanguageId>() else {
        tracing::debug!(language = %request.language, "rejected unknown language");
        return Ok(Json(RunResponse::err("unsupported language")));
    };

    let mut execution = ExecutionRequest::new(language, request.code);
    if let Some(ms) = request.timeout_ms {
        execution = execution.with_timeout(Duration::from_millis(ms));
    }
    if !request.inputs.is_empty() {
        execution = execution.with_inputs(request.inputs);
    }

    match state.dispatcher.execute(execution).await {
        Ok(result) => Ok(Json(RunResponse::from_result(&result))),
        Err(err) => {
            // The only alert-worthy condition: the host could not manage
            // the child process at all.
            tracing::error!(error = %err, "internal sandbox error");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_languages(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .dispatcher
            .languages()
            .iter()
            .map(|l| l.to_string())
            .collect(),
    )
}
