//! Stress-test status and error definitions

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the stress-test lifecycle or its workload
#[derive(Debug, Error)]
pub enum StressError {
    #[error("Invalid stress configuration: {0}")]
    InvalidConfig(String),

    #[error("Workload failed: {0}")]
    Workload(String),

    #[error("Unit of work exceeded {0:?}")]
    Timeout(Duration),
}

/// Lifecycle state of the single stress-test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StressTestStatus {
    Idle,
    Running,
}

/// Point-in-time view of the stress tester, served by `/scenario/stress-test-status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressTestStats {
    pub running: bool,
    #[serde(rename = "activeThreads")]
    pub active_workers: usize,
    pub queries_executed: u64,
    /// Epoch milliseconds when the current run started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
    /// Milliseconds since `start_time`
    #[serde(rename = "runningTime", skip_serializing_if = "Option::is_none")]
    pub running_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
