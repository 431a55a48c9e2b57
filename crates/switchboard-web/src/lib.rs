mod assets;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use switchboard_config::GatewayConfig;
use switchboard_core::agents::coder::EXAMPLE_PROMPTS;
use switchboard_core::{DispatchError, Gateway};
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    gateway: Arc<Gateway>,
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

#[derive(Deserialize)]
struct ExampleRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Serialize)]
struct AnswerResponse {
    answer: String,
    #[serde(rename = "historyError", skip_serializing_if = "Option::is_none")]
    history_error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Serve the interaction surface until ctrl-c.
pub async fn serve(gateway: Arc<Gateway>, config: &GatewayConfig) -> Result<()> {
    let state = AppState { gateway };

    let router = Router::new()
        .route("/", get(serve_index))
        .route("/style.css", get(serve_css))
        .route("/app.js", get(serve_js))
        .route("/api/examples", get(api_examples))
        .route("/api/ask", post(api_ask))
        .route("/api/example", post(api_example))
        .route("/api/history", get(api_history))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid gateway listen address: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Web surface listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down web surface");
        })
        .await?;

    Ok(())
}

// --- Axum Handlers ---

async fn serve_index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::STYLE_CSS)
}

async fn serve_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        assets::APP_JS,
    )
}

async fn api_examples() -> Json<Vec<&'static str>> {
    Json(EXAMPLE_PROMPTS.to_vec())
}

async fn api_ask(State(state): State<AppState>, Json(req): Json<AskRequest>) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "question must not be empty".to_string(),
        );
    }

    match state.gateway.ask(question).await {
        Ok(reply) => answer_response(reply.answer, reply.history_error),
        Err(e) => dispatch_error_response(e),
    }
}

async fn api_example(State(state): State<AppState>, Json(req): Json<ExampleRequest>) -> Response {
    match state.gateway.run_example(&req.prompt).await {
        Ok(reply) => answer_response(reply.answer, reply.history_error),
        Err(e) => dispatch_error_response(e),
    }
}

async fn api_history(State(state): State<AppState>) -> Response {
    match state.gateway.history_lines() {
        Ok(lines) => Json(lines).into_response(),
        Err(e) => {
            error!("History read failed: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// --- Response mapping ---

fn answer_response(answer: String, history_error: Option<String>) -> Response {
    Json(AnswerResponse {
        answer,
        history_error,
    })
    .into_response()
}

/// Map a dispatch failure to an HTTP status. Bad surface input is the
/// client's fault; everything else is a failed upstream call.
fn dispatch_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn dispatch_error_response(err: DispatchError) -> Response {
    error!("Dispatch failed: {err}");
    error_response(dispatch_status(&err), err.to_string())
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
