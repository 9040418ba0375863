//! Toggle orchestration and scenario side-effect hooks

use async_trait::async_trait;
use metrics::{counter, gauge};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::stress::StressTester;

use super::registry::ScenarioRegistry;
use super::types::{ScenarioError, ScenarioName, ToggleOutcome};

/// What a hook did in response to a transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookReport {
    pub stress_test_started: Option<bool>,
}

/// Side effect attached to a scenario's enable/disable transitions
#[async_trait]
pub trait ScenarioHook: Send + Sync {
    async fn on_enable(&self) -> Result<HookReport, ScenarioError>;

    async fn on_disable(&self) -> Result<HookReport, ScenarioError>;
}

/// Starts the background stress test on enable and stops it on disable
pub struct StressTestHook {
    tester: Arc<StressTester>,
}

impl StressTestHook {
    pub fn new(tester: Arc<StressTester>) -> Self {
        Self { tester }
    }
}

#[async_trait]
impl ScenarioHook for StressTestHook {
    async fn on_enable(&self) -> Result<HookReport, ScenarioError> {
        let started = self
            .tester
            .start()
            .await
            .map_err(|e| ScenarioError::Unexpected(e.to_string()))?;
        info!("Stress test auto-start on toggle: {}", started);
        Ok(HookReport {
            stress_test_started: Some(started),
        })
    }

    async fn on_disable(&self) -> Result<HookReport, ScenarioError> {
        if self.tester.is_running() {
            self.tester.stop().await;
        }
        Ok(HookReport::default())
    }
}

/// A hook plus the lock that keeps flag flips and hook calls in the same order
struct HookSlot {
    hook: Arc<dyn ScenarioHook>,
    transition: Mutex<()>,
}

/// Routes toggle requests to the registry and runs any coupled side effects
pub struct ScenarioCoordinator {
    registry: Arc<ScenarioRegistry>,
    hooks: HashMap<ScenarioName, HookSlot>,
}

impl ScenarioCoordinator {
    pub fn new(registry: Arc<ScenarioRegistry>) -> Self {
        Self {
            registry,
            hooks: HashMap::new(),
        }
    }

    /// Coordinator with `stress_testing` wired to the given tester
    pub fn with_stress_tester(registry: Arc<ScenarioRegistry>, tester: Arc<StressTester>) -> Self {
        Self::new(registry).with_hook(
            ScenarioName::StressTesting,
            Arc::new(StressTestHook::new(tester)),
        )
    }

    /// Attach a hook to a scenario, replacing any previous one
    pub fn with_hook(mut self, name: ScenarioName, hook: Arc<dyn ScenarioHook>) -> Self {
        self.hooks.insert(
            name,
            HookSlot {
                hook,
                transition: Mutex::new(()),
            },
        );
        self
    }

    fn parse(name: &str) -> Result<ScenarioName, ScenarioError> {
        name.parse::<ScenarioName>().inspect_err(|_| {
            warn!("Rejected toggle for unknown scenario: {}", name);
            counter!("chaos_scenario_toggle_errors_total").increment(1);
        })
    }

    /// Flip a scenario and run its hook for the new state
    pub async fn handle_toggle(&self, name: &str) -> Result<ToggleOutcome, ScenarioError> {
        let scenario = Self::parse(name)?;
        info!("Toggling scenario: {}", scenario);

        let Some(slot) = self.hooks.get(&scenario) else {
            let enabled = self.registry.toggle(scenario);
            return Ok(self.finish(scenario, enabled, true, HookReport::default()));
        };

        let _transition = slot.transition.lock().await;
        let enabled = self.registry.toggle(scenario);
        let report = self.run_hook(slot, scenario, enabled).await?;
        Ok(self.finish(scenario, enabled, true, report))
    }

    /// Force a scenario on or off; the hook runs only if the flag changed
    pub async fn handle_set(
        &self,
        name: &str,
        enabled: bool,
    ) -> Result<ToggleOutcome, ScenarioError> {
        let scenario = Self::parse(name)?;
        info!("Setting scenario {} to {}", scenario, enabled);

        let Some(slot) = self.hooks.get(&scenario) else {
            let changed = self.registry.set(scenario, enabled) != enabled;
            return Ok(self.finish(scenario, enabled, changed, HookReport::default()));
        };

        let _transition = slot.transition.lock().await;
        let changed = self.registry.set(scenario, enabled) != enabled;
        let report = if changed {
            self.run_hook(slot, scenario, enabled).await?
        } else {
            HookReport::default()
        };
        Ok(self.finish(scenario, enabled, changed, report))
    }

    /// Run the hook for a transition to `enabled`, restoring the flag if it fails
    async fn run_hook(
        &self,
        slot: &HookSlot,
        scenario: ScenarioName,
        enabled: bool,
    ) -> Result<HookReport, ScenarioError> {
        let result = if enabled {
            slot.hook.on_enable().await
        } else {
            slot.hook.on_disable().await
        };
        result.inspect_err(|e| {
            self.registry.set(scenario, !enabled);
            counter!("chaos_scenario_toggle_errors_total").increment(1);
            tracing::error!(
                "Hook for scenario {} failed, flag restored to {}: {}",
                scenario,
                !enabled,
                e
            );
        })
    }

    fn finish(
        &self,
        scenario: ScenarioName,
        enabled: bool,
        changed: bool,
        report: HookReport,
    ) -> ToggleOutcome {
        if changed {
            counter!("chaos_scenario_toggles_total", "scenario" => scenario.as_str()).increment(1);
        }
        gauge!("chaos_scenarios_enabled").set(self.registry.enabled_count() as f64);
        info!("Toggle result for {}: {}", scenario, enabled);

        ToggleOutcome {
            scenario,
            enabled,
            changed,
            stress_test_started: report.stress_test_started,
        }
    }
}
