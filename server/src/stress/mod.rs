//! Background stress-test module
//!
//! This module provides:
//! - `StressTester`, the start/stop lifecycle for a single background run
//! - `StressWorkload` for plugging in the simulated load
//! - `SimulatedQueryWorkload`, the default in-memory query workload

mod lifecycle;
mod types;
mod workload;

pub use lifecycle::StressTester;
pub use types::{StressError, StressTestStats, StressTestStatus};
pub use workload::{SimulatedQueryWorkload, StressWorkload};
