//! Chaos Demo Server Library
//!
//! This module exports the server components for use in integration tests
//! and external tooling.

pub mod clock;
pub mod config;
pub mod scenario;
pub mod server;
pub mod stress;
pub mod synthetic;

// Re-export commonly used types
pub use scenario::{ScenarioCoordinator, ScenarioError, ScenarioName, ScenarioRegistry};
pub use server::{AppState, build_router};
pub use stress::StressTester;
pub use synthetic::MetricsSynthesizer;
