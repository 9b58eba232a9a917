use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::core::{
    PRESETS, Preset, PresetError, PresetName, StressInputs, StressReport, default_inputs,
    evaluate, find_preset,
};

mod cli;
mod config;
mod session;
mod store;

pub use cli::{Cli, CliError, Command, run_cli};
pub use config::{ConfigError, ServerConfig};
pub use session::{DEFAULT_HISTORY_CAPACITY, ScoreHistory, Session, SessionView};
pub use store::{DEFAULT_MAX_SESSIONS, SessionId, SessionIdError, SessionStore};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Slider values sent by the page; absent fields keep their previous value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputOverrides {
    pub rate_shock_pct: Option<f64>,
    pub uninsured_pct: Option<f64>,
    pub duration_years: Option<f64>,
    pub unrealized_loss_pct_cap: Option<f64>,
    pub withdrawal_speed: Option<f64>,
    pub concentration: Option<f64>,
}

impl InputOverrides {
    pub fn apply(&self, base: StressInputs) -> StressInputs {
        StressInputs {
            rate_shock_pct: self.rate_shock_pct.unwrap_or(base.rate_shock_pct),
            uninsured_pct: self.uninsured_pct.unwrap_or(base.uninsured_pct),
            duration_years: self.duration_years.unwrap_or(base.duration_years),
            unrealized_loss_pct_cap: self
                .unrealized_loss_pct_cap
                .unwrap_or(base.unrealized_loss_pct_cap),
            withdrawal_speed: self.withdrawal_speed.unwrap_or(base.withdrawal_speed),
            concentration: self.concentration.unwrap_or(base.concentration),
        }
    }
}

// Kept flat rather than flattening `InputOverrides`: query strings cannot
// carry numbers through `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StressPayload {
    preset: Option<String>,
    rate_shock_pct: Option<f64>,
    uninsured_pct: Option<f64>,
    duration_years: Option<f64>,
    unrealized_loss_pct_cap: Option<f64>,
    withdrawal_speed: Option<f64>,
    concentration: Option<f64>,
}

impl StressPayload {
    fn overrides(&self) -> InputOverrides {
        InputOverrides {
            rate_shock_pct: self.rate_shock_pct,
            uninsured_pct: self.uninsured_pct,
            duration_years: self.duration_years,
            unrealized_loss_pct_cap: self.unrealized_loss_pct_cap,
            withdrawal_speed: self.withdrawal_speed,
            concentration: self.concentration,
        }
    }
}

#[derive(Debug, Serialize)]
struct PresetsResponse {
    presets: &'static [Preset],
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(history_capacity, max_sessions)),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_SESSIONS)
    }
}

fn inputs_from_payload(payload: &StressPayload) -> Result<StressInputs, PresetError> {
    let base = match payload.preset.as_deref() {
        Some(name) => find_preset(name)?.inputs,
        None => default_inputs(),
    };
    Ok(payload.overrides().apply(base))
}

fn presets_response() -> PresetsResponse {
    PresetsResponse { presets: &PRESETS }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route("/api/presets", get(presets_handler))
        .route(
            "/api/stress",
            get(stress_get_handler).post(stress_post_handler),
        )
        .route("/api/session/:id", get(session_handler))
        .route("/api/session/:id/inputs", post(session_inputs_handler))
        .route(
            "/api/session/:id/preset/:name",
            post(session_preset_handler),
        )
        .route("/api/session/:id/reset", post(session_reset_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let app = router(AppState::new(
        config.history_capacity,
        config.max_sessions,
    ));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;
    info!(
        %addr,
        history_capacity = config.history_capacity,
        max_sessions = config.max_sessions,
        "bank stress demo listening"
    );
    info!("Local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn presets_handler() -> Response {
    json_response(StatusCode::OK, presets_response())
}

async fn stress_get_handler(payload: Result<Query<StressPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => stress_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn stress_post_handler(payload: Result<Json<StressPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => stress_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

fn stress_handler_impl(payload: StressPayload) -> Response {
    let inputs = match inputs_from_payload(&payload) {
        Ok(inputs) => inputs,
        Err(err) => return error_response(StatusCode::NOT_FOUND, &err.to_string()),
    };
    let report = evaluate(&inputs);
    log_report("stateless", &report);
    json_response(StatusCode::OK, report)
}

async fn session_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match SessionId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let view = state.sessions().with_session(&id, |session| session.view());
    json_response(StatusCode::OK, view)
}

async fn session_inputs_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InputOverrides>, JsonRejection>,
) -> Response {
    let id = match SessionId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let overrides = match payload {
        Ok(Json(overrides)) => overrides,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let view = state.sessions().with_session(&id, |session| {
        let inputs = overrides.apply(session.inputs());
        log_report(id.as_str(), session.on_input_changed(inputs));
        session.view()
    });
    json_response(StatusCode::OK, view)
}

async fn session_preset_handler(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> Response {
    let id = match SessionId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let name = match PresetName::parse(&name) {
        Ok(name) => name,
        Err(err) => return error_response(StatusCode::NOT_FOUND, &err.to_string()),
    };
    let view = state.sessions().with_session(&id, |session| {
        let report = session.apply_preset(name);
        info!(
            session = id.as_str(),
            preset = name.as_str(),
            score = report.score,
            status = report.classification.label,
            "applied preset"
        );
        session.view()
    });
    json_response(StatusCode::OK, view)
}

async fn session_reset_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let id = match SessionId::parse(&id) {
        Ok(id) => id,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let view = state.sessions().with_session(&id, |session| {
        session.reset();
        session.view()
    });
    info!(session = id.as_str(), "session reset");
    json_response(StatusCode::OK, view)
}

fn log_report(source: &str, report: &StressReport) {
    debug!(
        source,
        score = report.score,
        status = report.classification.label,
        duration_loss_pct = report.duration_loss_pct,
        "evaluated stress scenario"
    );
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn stress_payload_from_json(json: &str) -> Result<StressPayload, String> {
    serde_json::from_str::<StressPayload>(json).map_err(|e| format!("Invalid API JSON payload: {e}"))
}
