//! Process-wide scenario flag table

use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::types::ScenarioName;

/// Enabled/disabled flags for every known scenario
///
/// One atomic flag per scenario. Each flag is independently linearizable:
/// a toggle is a single `fetch_xor`, so concurrent toggles of the same name
/// never lose a flip. A snapshot reads each flag atomically but makes no
/// cross-name consistency promise.
#[derive(Debug)]
pub struct ScenarioRegistry {
    flags: [AtomicBool; ScenarioName::COUNT],
}

impl ScenarioRegistry {
    /// Create a registry with every scenario disabled
    pub fn new() -> Self {
        Self {
            flags: std::array::from_fn(|_| AtomicBool::new(false)),
        }
    }

    fn flag(&self, name: ScenarioName) -> &AtomicBool {
        &self.flags[name.index()]
    }

    pub fn is_enabled(&self, name: ScenarioName) -> bool {
        self.flag(name).load(Ordering::Acquire)
    }

    /// Lookup by wire name; unknown names read as disabled
    pub fn is_enabled_by_name(&self, name: &str) -> bool {
        name.parse::<ScenarioName>()
            .map(|n| self.is_enabled(n))
            .unwrap_or(false)
    }

    /// Flip the flag and return the new value
    pub fn toggle(&self, name: ScenarioName) -> bool {
        !self.flag(name).fetch_xor(true, Ordering::AcqRel)
    }

    /// Store `enabled` and return the previous value
    pub fn set(&self, name: ScenarioName, enabled: bool) -> bool {
        self.flag(name).swap(enabled, Ordering::AcqRel)
    }

    /// Current value of every scenario, in declaration order
    pub fn snapshot(&self) -> IndexMap<ScenarioName, bool> {
        ScenarioName::ALL
            .into_iter()
            .map(|name| (name, self.is_enabled(name)))
            .collect()
    }

    pub fn enabled_count(&self) -> usize {
        ScenarioName::ALL
            .into_iter()
            .filter(|name| self.is_enabled(*name))
            .count()
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::new()
    }
}
