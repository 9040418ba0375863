//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chaos_demo_server::clock::FixedClock;
use chaos_demo_server::config::StressConfig;
use chaos_demo_server::synthetic::ValueSource;
use chaos_demo_server::{AppState, MetricsSynthesizer, ScenarioRegistry, StressTester, build_router};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

/// "Now" used by apps built with a fixed clock
pub const TEST_NOW: u64 = 1_700_000_000_000;

/// Stress settings that keep runs short and responsive in tests
pub fn fast_stress_config() -> StressConfig {
    StressConfig {
        workers: 2,
        query_interval: Duration::from_millis(5),
        unit_timeout: Duration::from_millis(50),
        stop_timeout: Duration::from_millis(500),
        table_size: 32,
    }
}

/// Create a test application router with state
pub fn create_test_app_with_state() -> (Router, AppState) {
    let registry = Arc::new(ScenarioRegistry::new());
    let tester = Arc::new(StressTester::new(fast_stress_config()));
    let synthesizer = MetricsSynthesizer::new(Arc::clone(&registry));
    let state = AppState::from_parts(registry, tester, synthesizer);
    (build_router(state.clone()), state)
}

/// Create a test application router with all routes configured
pub fn create_test_app() -> Router {
    create_test_app_with_state().0
}

/// Create a test app whose metrics use the given value source and a fixed clock
#[allow(dead_code)]
pub fn create_test_app_with_source(source: Arc<dyn ValueSource>) -> (Router, AppState) {
    let registry = Arc::new(ScenarioRegistry::new());
    let tester = Arc::new(StressTester::new(fast_stress_config()));
    let synthesizer = MetricsSynthesizer::new(Arc::clone(&registry))
        .with_source(source)
        .with_clock(Arc::new(FixedClock(TEST_NOW)));
    let state = AppState::from_parts(registry, tester, synthesizer);
    (build_router(state.clone()), state)
}

/// Send a request with an empty body and decode the JSON response
pub async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Initialize test logging for detailed output
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaos_demo_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
