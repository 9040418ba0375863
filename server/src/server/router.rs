//! Router assembly

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::scenario::scenario_routes;
use crate::synthetic::synthetic_routes;

use super::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub stress_test_running: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        stress_test_running: state.stress_tester.is_running(),
    })
}

/// Build the API router with every route, CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    // The dashboard is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/scenario", scenario_routes())
        .merge(synthetic_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
