//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::scenario::{ScenarioCoordinator, ScenarioRegistry};
use crate::stress::StressTester;
use crate::synthetic::MetricsSynthesizer;

/// Shared application state
///
/// Built once at startup; every handler gets a cheap clone of the same handles.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ScenarioRegistry>,
    pub coordinator: Arc<ScenarioCoordinator>,
    pub stress_tester: Arc<StressTester>,
    pub synthesizer: Arc<MetricsSynthesizer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let registry = Arc::new(ScenarioRegistry::new());
        let stress_tester = Arc::new(StressTester::new(config.stress.clone()));
        let synthesizer = MetricsSynthesizer::new(Arc::clone(&registry));
        Self::from_parts(registry, stress_tester, synthesizer)
    }

    /// Assemble state from pre-built components (tests inject sources and workloads here)
    pub fn from_parts(
        registry: Arc<ScenarioRegistry>,
        stress_tester: Arc<StressTester>,
        synthesizer: MetricsSynthesizer,
    ) -> Self {
        let coordinator = Arc::new(ScenarioCoordinator::with_stress_tester(
            Arc::clone(&registry),
            Arc::clone(&stress_tester),
        ));
        Self {
            registry,
            coordinator,
            stress_tester,
            synthesizer: Arc::new(synthesizer),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
