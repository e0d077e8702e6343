//! # HTTP Routes
//!
//! - `GET  /annex?code={annex}`: full bracket table of one annex
//! - `POST /simples-nacional`  : monthly tax calculation

pub mod annex;
pub mod simples_nacional;

use axum::Router;

use crate::state::AppState;

/// Assemble the calculation routers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(annex::router())
        .merge(simples_nacional::router())
}
