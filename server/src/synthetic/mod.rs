//! Synthetic metrics module
//!
//! Maps the current scenario flags to noisy, bounded time series for the
//! demo dashboards.

pub mod routes;
mod source;
mod synthesizer;

pub use routes::synthetic_routes;
pub use source::{MaxSource, MinSource, ThreadRngSource, ValueSource};
pub use synthesizer::{
    AppScenarioMetrics, Channel, MetricDataPoint, MetricSeries, MetricsSynthesizer, SERIES_LEN,
    SERIES_STEP_MS, ScenarioStates, ValueRange,
};
