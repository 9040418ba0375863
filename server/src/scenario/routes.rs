//! HTTP route handlers for scenario API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::server::AppState;
use crate::stress::StressTestStats;

use super::types::{Impact, ScenarioError, ScenarioName, ToggleOutcome};

/// Error response for scenario API
#[derive(Debug, Serialize)]
pub struct ScenarioErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl From<ScenarioError> for ScenarioErrorResponse {
    fn from(e: ScenarioError) -> Self {
        let code = match &e {
            ScenarioError::InvalidScenario(_) => "invalid_scenario",
            ScenarioError::Unexpected(_) => "internal_error",
        };
        Self {
            success: false,
            message: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl IntoResponse for ScenarioErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "invalid_scenario" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Response for toggle/enable/disable
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_test_started: Option<bool>,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            success: true,
            enabled: outcome.enabled,
            stress_test_started: outcome.stress_test_started,
        }
    }
}

/// Entry in GET /scenario
#[derive(Debug, Serialize)]
pub struct ScenarioListItem {
    pub name: ScenarioName,
    pub enabled: bool,
    pub description: &'static str,
    pub category: &'static str,
    pub impact: Impact,
}

/// Response for GET /scenario/status/:name
#[derive(Debug, Serialize)]
pub struct ScenarioStatusResponse {
    pub name: ScenarioName,
    pub enabled: bool,
}

fn log_failure(action: &str, name: &str, e: &ScenarioError) {
    match e {
        ScenarioError::InvalidScenario(_) => {
            tracing::warn!("Cannot {} unknown scenario: {}", action, name);
        }
        ScenarioError::Unexpected(_) => {
            tracing::error!("Error trying to {} scenario {}: {}", action, name, e);
        }
    }
}

/// POST|PUT /scenario/toggle/:name - Flip a scenario
pub async fn toggle_scenario(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToggleResponse>, ScenarioErrorResponse> {
    let outcome = state
        .coordinator
        .handle_toggle(&name)
        .await
        .map_err(|e| {
            log_failure("toggle", &name, &e);
            ScenarioErrorResponse::from(e)
        })?;

    Ok(Json(outcome.into()))
}

/// POST /scenario/enable/:name - Force a scenario on
pub async fn enable_scenario(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToggleResponse>, ScenarioErrorResponse> {
    let outcome = state
        .coordinator
        .handle_set(&name, true)
        .await
        .map_err(|e| {
            log_failure("enable", &name, &e);
            ScenarioErrorResponse::from(e)
        })?;

    Ok(Json(outcome.into()))
}

/// POST /scenario/disable/:name - Force a scenario off
pub async fn disable_scenario(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ToggleResponse>, ScenarioErrorResponse> {
    let outcome = state
        .coordinator
        .handle_set(&name, false)
        .await
        .map_err(|e| {
            log_failure("disable", &name, &e);
            ScenarioErrorResponse::from(e)
        })?;

    Ok(Json(outcome.into()))
}

/// GET /scenario - List every scenario with its current flag
pub async fn list_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioListItem>> {
    let items = state
        .registry
        .snapshot()
        .into_iter()
        .map(|(name, enabled)| {
            let info = name.info();
            ScenarioListItem {
                name,
                enabled,
                description: info.description,
                category: info.category,
                impact: info.impact,
            }
        })
        .collect();

    Json(items)
}

/// GET /scenario/status/:name - Current flag of one scenario
pub async fn scenario_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ScenarioStatusResponse>, ScenarioErrorResponse> {
    let scenario = name.parse::<ScenarioName>().map_err(|e| {
        log_failure("read", &name, &e);
        ScenarioErrorResponse::from(e)
    })?;

    let enabled = state.registry.is_enabled(scenario);
    tracing::debug!("Scenario {} is {}", scenario, enabled);

    Ok(Json(ScenarioStatusResponse {
        name: scenario,
        enabled,
    }))
}

/// GET /scenario/stress-test-status - Background stress run statistics
pub async fn stress_test_status(State(state): State<AppState>) -> Json<StressTestStats> {
    Json(state.stress_tester.stats())
}

/// Build scenario API routes (nest under `/scenario`)
pub fn scenario_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_scenarios))
        .route("/status/:name", get(scenario_status))
        .route("/stress-test-status", get(stress_test_status))
        .route("/toggle/:name", post(toggle_scenario).put(toggle_scenario))
        .route("/enable/:name", post(enable_scenario))
        .route("/disable/:name", post(disable_scenario))
}
