//! HTTP route handlers for synthetic metrics

use axum::{Json, Router, extract::State, routing::get};

use crate::server::AppState;

use super::synthesizer::AppScenarioMetrics;

/// GET /metrics/app-scenarios - Synthetic series for every channel
pub async fn app_scenario_metrics(State(state): State<AppState>) -> Json<AppScenarioMetrics> {
    Json(state.synthesizer.synthesize())
}

/// Build synthetic metrics routes
pub fn synthetic_routes() -> Router<AppState> {
    Router::new().route("/metrics/app-scenarios", get(app_scenario_metrics))
}
