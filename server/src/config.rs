//! Server configuration
//!
//! Configuration is loaded from environment variables. Unparseable values
//! fall back to the defaults.

use std::env;
use std::time::Duration;

use crate::stress::StressError;

/// Main server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,

    /// Stress test configuration
    pub stress: StressConfig,
}

/// Background stress-test configuration
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Concurrent simulated clients per run
    pub workers: usize,
    /// Pause between units of work, per worker
    pub query_interval: Duration,
    /// Upper bound on a single unit of work
    pub unit_timeout: Duration,
    /// How long `stop()` waits for a run to drain before aborting it
    pub stop_timeout: Duration,
    /// Key space of the simulated table
    pub table_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            stress: StressConfig::default(),
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            query_interval: Duration::from_millis(50),
            unit_timeout: Duration::from_millis(250),
            stop_timeout: Duration::from_secs(2),
            table_size: 1000,
        }
    }
}

impl StressConfig {
    /// Reject configurations that could never run a bounded workload
    pub fn validate(&self) -> Result<(), StressError> {
        if self.workers == 0 {
            return Err(StressError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.unit_timeout.is_zero() {
            return Err(StressError::InvalidConfig(
                "unit_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Server config
        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT")
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }

        // Stress config
        if let Ok(val) = env::var("STRESS_WORKERS")
            && let Ok(workers) = val.parse()
        {
            config.stress.workers = workers;
        }
        if let Some(interval) = env_millis("STRESS_QUERY_INTERVAL_MS") {
            config.stress.query_interval = interval;
        }
        if let Some(timeout) = env_millis("STRESS_UNIT_TIMEOUT_MS") {
            config.stress.unit_timeout = timeout;
        }
        if let Some(timeout) = env_millis("STRESS_STOP_TIMEOUT_MS") {
            config.stress.stop_timeout = timeout;
        }
        if let Ok(val) = env::var("STRESS_TABLE_SIZE")
            && let Ok(size) = val.parse()
        {
            config.stress.table_size = size;
        }

        config
    }
}
