//! # simples-api: Simples Nacional HTTP service
//!
//! Serves the annex tables and the monthly calculation to the simulator
//! frontend.
//!
//! ## Routes
//!
//! - `GET  /annex?code={annex}`: bracket table of one annex
//! - `POST /simples-nacional`  : effective rate, tax due and breakdown
//! - `GET  /health/liveness`   : process is up
//! - `GET  /health/readiness`  : annex table is loaded and readable
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → CorsLayer (only when origins are configured) → Handler
//!
//! All errors map to `{"error": {"code", "message"}}` bodies via [`AppError`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::AppError;
pub use state::{AppState, SharedTable, TableSource};

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let mut api = routes::router()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if !state.allowed_origins.is_empty() {
        api = api.layer(cors_layer(&state.allowed_origins));
    }

    api.layer(TraceLayer::new_for_http()).with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Liveness probe: the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the annex table can be read without waiting on a reload.
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.table.try_snapshot() {
        Some(_) => (StatusCode::OK, "ready").into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "annex table reloading").into_response(),
    }
}
