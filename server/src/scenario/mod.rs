//! Scenario module
//!
//! This module provides:
//! - `ScenarioRegistry`, the process-wide enabled/disabled flag table
//! - `ScenarioCoordinator`, which applies toggles and runs coupled side effects
//! - HTTP routes for listing, reading and toggling scenarios

pub mod coordinator;
mod registry;
pub mod routes;
mod types;

pub use coordinator::{HookReport, ScenarioCoordinator, ScenarioHook, StressTestHook};
pub use registry::ScenarioRegistry;
pub use routes::scenario_routes;
pub use types::{Impact, ScenarioError, ScenarioInfo, ScenarioName, ToggleOutcome};
