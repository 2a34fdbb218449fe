use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::error::RelayError;
use crate::morse::{self, LetterCode};
use crate::scheduler::{Coordinator, JobAccepted, RelayStatus, Speed};

#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<Coordinator>,
}

// Query parameters arrive untyped; the coordinator does its own parsing.

#[derive(Debug, Deserialize)]
struct MorseParams {
    data: Option<String>,
    speed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpeedParams {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EncodeParams {
    data: Option<String>,
    speed: Option<String>,
}

#[derive(Serialize)]
struct PingResponse {
    ok: bool,
}

#[derive(Serialize)]
struct MorseResponse {
    ok: bool,
    accepted: bool,
    #[serde(flatten)]
    job: JobAccepted,
}

#[derive(Serialize)]
struct StatusResponse {
    ok: bool,
    #[serde(flatten)]
    status: RelayStatus,
}

#[derive(Serialize)]
struct SpeedResponse {
    ok: bool,
    speed: Speed,
}

#[derive(Serialize)]
struct EncodeResponse {
    ok: bool,
    morse: String,
    letters: Vec<LetterCode>,
    skipped: Vec<char>,
    units: u64,
    duration_ms: u64,
    speed: Speed,
}

#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    error: &'static str,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                ok: false,
                error: self.code(),
            }),
        )
            .into_response()
    }
}

/// Unwrap query parameters, answering a malformed query with the usual
/// JSON error body instead of axum's plain-text rejection.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, RelayError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Malformed query string");
        RelayError::BadQuery(rejection.body_text())
    })
}

/// Routes exposed by the relay.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/ping", get(ping_handler))
        .route("/morse", get(morse_handler))
        .route("/status", get(status_handler))
        .route("/speed", get(speed_handler))
        .route("/encode", get(encode_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the API until `cancel` fires.
pub async fn run_api(
    addr: SocketAddr,
    state: ApiState,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Starting HTTP API");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse { ok: true })
}

async fn morse_handler(
    State(state): State<ApiState>,
    query: Result<Query<MorseParams>, QueryRejection>,
) -> Result<Json<MorseResponse>, RelayError> {
    let params = query_params(query)?;
    let text = params.data.unwrap_or_default();
    let job = state
        .coordinator
        .enqueue(&text, params.speed.as_deref())
        .inspect_err(|e| tracing::debug!(error = %e, "Message rejected"))?;

    Ok(Json(MorseResponse {
        ok: true,
        accepted: true,
        job,
    }))
}

async fn status_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(StatusResponse {
        ok: true,
        status: state.coordinator.status(),
    })
}

/// Without `value`, report the default speed; with it, change it.
async fn speed_handler(
    State(state): State<ApiState>,
    query: Result<Query<SpeedParams>, QueryRejection>,
) -> Result<Json<SpeedResponse>, RelayError> {
    let params = query_params(query)?;
    let speed = match params.value {
        Some(raw) => state.coordinator.set_speed(&raw)?,
        None => state.coordinator.speed(),
    };
    Ok(Json(SpeedResponse { ok: true, speed }))
}

async fn encode_handler(
    State(state): State<ApiState>,
    query: Result<Query<EncodeParams>, QueryRejection>,
) -> Result<Json<EncodeResponse>, RelayError> {
    let params = query_params(query)?;
    let speed = params
        .speed
        .as_deref()
        .and_then(|raw| Speed::parse(raw).ok())
        .unwrap_or_else(|| state.coordinator.speed());
    let encoded = morse::encode(params.data.as_deref().unwrap_or_default());

    Ok(Json(EncodeResponse {
        ok: true,
        morse: encoded.render(),
        letters: encoded.letters(),
        skipped: encoded.skipped().to_vec(),
        units: encoded.units(),
        duration_ms: encoded.duration(speed).as_millis() as u64,
        speed,
    }))
}
