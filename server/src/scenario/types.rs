//! Scenario identifiers, catalog entries and error definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors surfaced by scenario operations
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("{0}")]
    Unexpected(String),
}

/// A known fault-injection scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioName {
    CpuLoad,
    HighLoad,
    #[serde(rename = "return_404")]
    Return404,
    QueryBlackhole,
    ConnectionKill,
    DiskFault,
    StressTesting,
}

impl ScenarioName {
    /// Every known scenario, in declaration order
    pub const ALL: [ScenarioName; 7] = [
        ScenarioName::CpuLoad,
        ScenarioName::HighLoad,
        ScenarioName::Return404,
        ScenarioName::QueryBlackhole,
        ScenarioName::ConnectionKill,
        ScenarioName::DiskFault,
        ScenarioName::StressTesting,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Wire name used in URLs and logs
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioName::CpuLoad => "cpu_load",
            ScenarioName::HighLoad => "high_load",
            ScenarioName::Return404 => "return_404",
            ScenarioName::QueryBlackhole => "query_blackhole",
            ScenarioName::ConnectionKill => "connection_kill",
            ScenarioName::DiskFault => "disk_fault",
            ScenarioName::StressTesting => "stress_testing",
        }
    }

    /// Position in `ALL`, used as a slot index by the registry
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn info(self) -> ScenarioInfo {
        let (description, category, impact) = match self {
            ScenarioName::CpuLoad => (
                "Simulates sustained high CPU utilisation on the application host",
                "resource",
                Impact::High,
            ),
            ScenarioName::HighLoad => (
                "Simulates a surge of incoming request traffic",
                "traffic",
                Impact::Medium,
            ),
            ScenarioName::Return404 => (
                "Makes application endpoints answer with 404 responses",
                "application",
                Impact::Medium,
            ),
            ScenarioName::QueryBlackhole => (
                "Silently drops database queries so they never return",
                "database",
                Impact::Critical,
            ),
            ScenarioName::ConnectionKill => (
                "Terminates open database connections",
                "database",
                Impact::High,
            ),
            ScenarioName::DiskFault => (
                "Rejects writes as if the disk were failing",
                "storage",
                Impact::Critical,
            ),
            ScenarioName::StressTesting => (
                "Runs a background workload that stresses the storage layer",
                "database",
                Impact::High,
            ),
        };
        ScenarioInfo {
            name: self,
            description,
            category,
            impact,
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioName {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ScenarioError::InvalidScenario(s.to_string()))
    }
}

/// Blast radius of a scenario, shown on dashboard cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

/// Static catalog entry for a scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioInfo {
    pub name: ScenarioName,
    pub description: &'static str,
    pub category: &'static str,
    pub impact: Impact,
}

/// Result of a successful toggle/enable/disable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub scenario: ScenarioName,
    /// Flag value after the operation
    pub enabled: bool,
    /// Whether the flag actually changed
    pub changed: bool,
    /// Set only when enabling `stress_testing` launched (or declined to launch) a run
    pub stress_test_started: Option<bool>,
}
