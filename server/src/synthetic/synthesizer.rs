//! Synthetic time series driven by scenario state
//!
//! Every read builds six fresh series of `SERIES_LEN` points, one second
//! apart and ending at "now". Each point is an independent draw from the
//! channel's enabled or disabled range; nothing is stored between reads.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::scenario::{ScenarioName, ScenarioRegistry};

use super::source::{ThreadRngSource, ValueSource};

/// Points per series
pub const SERIES_LEN: usize = 10;

/// Spacing between consecutive points
pub const SERIES_STEP_MS: u64 = 1000;

/// Closed interval of values a channel may report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub const fn constant(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    fn draw(&self, source: &dyn ValueSource) -> f64 {
        if self.low == self.high {
            return self.low;
        }
        let value = source.sample(self.low, self.high);
        if !value.is_finite() {
            return self.low;
        }
        value.clamp(self.low, self.high)
    }
}

/// One synthetic metric feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    CpuLoad,
    TrafficLoad,
    ResponseTime,
    QueryBlackhole,
    ConnectionKill,
    DiskFault,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::CpuLoad,
        Channel::TrafficLoad,
        Channel::ResponseTime,
        Channel::QueryBlackhole,
        Channel::ConnectionKill,
        Channel::DiskFault,
    ];

    /// The scenario whose flag selects this channel's range
    pub fn driving_scenario(self) -> ScenarioName {
        match self {
            Channel::CpuLoad => ScenarioName::CpuLoad,
            Channel::TrafficLoad => ScenarioName::HighLoad,
            Channel::ResponseTime => ScenarioName::Return404,
            Channel::QueryBlackhole => ScenarioName::QueryBlackhole,
            Channel::ConnectionKill => ScenarioName::ConnectionKill,
            Channel::DiskFault => ScenarioName::DiskFault,
        }
    }

    pub fn range(self, enabled: bool) -> ValueRange {
        match (self, enabled) {
            // percent
            (Channel::CpuLoad, true) => ValueRange::new(70.0, 95.0),
            (Channel::CpuLoad, false) => ValueRange::new(10.0, 30.0),
            // requests per second
            (Channel::TrafficLoad, true) => ValueRange::new(800.0, 1400.0),
            (Channel::TrafficLoad, false) => ValueRange::new(100.0, 300.0),
            // milliseconds
            (Channel::ResponseTime, true) => ValueRange::new(400.0, 700.0),
            (Channel::ResponseTime, false) => ValueRange::new(50.0, 150.0),
            // dropped queries per second
            (Channel::QueryBlackhole, true) => ValueRange::new(20.0, 70.0),
            // killed connections per minute
            (Channel::ConnectionKill, true) => ValueRange::new(5.0, 15.0),
            // rejected writes per second
            (Channel::DiskFault, true) => ValueRange::new(10.0, 40.0),
            (Channel::QueryBlackhole | Channel::ConnectionKill | Channel::DiskFault, false) => {
                ValueRange::constant(0.0)
            }
        }
    }
}

/// A single synthetic sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDataPoint {
    /// Epoch milliseconds
    pub timestamp: u64,
    pub value: f64,
}

/// `SERIES_LEN` points, oldest first
pub type MetricSeries = Vec<MetricDataPoint>;

/// Flags of the six metric-driving scenarios, as sent to dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStates {
    pub cpu_load: bool,
    pub high_load: bool,
    #[serde(rename = "return404")]
    pub return_404: bool,
    pub query_blackhole: bool,
    pub connection_kill: bool,
    pub disk_fault: bool,
}

impl ScenarioStates {
    fn from_snapshot(snapshot: &IndexMap<ScenarioName, bool>) -> Self {
        let flag = |name: ScenarioName| snapshot.get(&name).copied().unwrap_or(false);
        Self {
            cpu_load: flag(ScenarioName::CpuLoad),
            high_load: flag(ScenarioName::HighLoad),
            return_404: flag(ScenarioName::Return404),
            query_blackhole: flag(ScenarioName::QueryBlackhole),
            connection_kill: flag(ScenarioName::ConnectionKill),
            disk_fault: flag(ScenarioName::DiskFault),
        }
    }
}

/// Response body for `GET /metrics/app-scenarios`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppScenarioMetrics {
    pub cpu_load: MetricSeries,
    pub traffic_load: MetricSeries,
    pub response_time: MetricSeries,
    pub query_blackhole: MetricSeries,
    pub connection_kill: MetricSeries,
    pub disk_fault: MetricSeries,
    pub scenario_states: ScenarioStates,
}

impl AppScenarioMetrics {
    pub fn series(&self, channel: Channel) -> &MetricSeries {
        match channel {
            Channel::CpuLoad => &self.cpu_load,
            Channel::TrafficLoad => &self.traffic_load,
            Channel::ResponseTime => &self.response_time,
            Channel::QueryBlackhole => &self.query_blackhole,
            Channel::ConnectionKill => &self.connection_kill,
            Channel::DiskFault => &self.disk_fault,
        }
    }
}

/// Builds synthetic metrics from the current scenario flags
pub struct MetricsSynthesizer {
    registry: Arc<ScenarioRegistry>,
    source: Arc<dyn ValueSource>,
    clock: Arc<dyn Clock>,
}

impl MetricsSynthesizer {
    pub fn new(registry: Arc<ScenarioRegistry>) -> Self {
        Self {
            registry,
            source: Arc::new(ThreadRngSource),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ValueSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn synthesize(&self) -> AppScenarioMetrics {
        let now = self.clock.now_millis();
        let snapshot = self.registry.snapshot();
        let states = ScenarioStates::from_snapshot(&snapshot);

        info!(
            cpu_load = states.cpu_load,
            high_load = states.high_load,
            return_404 = states.return_404,
            query_blackhole = states.query_blackhole,
            connection_kill = states.connection_kill,
            disk_fault = states.disk_fault,
            "Current scenario states"
        );

        let series = |channel: Channel| {
            let enabled = snapshot
                .get(&channel.driving_scenario())
                .copied()
                .unwrap_or(false);
            self.synthesize_series(channel, enabled, now)
        };

        AppScenarioMetrics {
            cpu_load: series(Channel::CpuLoad),
            traffic_load: series(Channel::TrafficLoad),
            response_time: series(Channel::ResponseTime),
            query_blackhole: series(Channel::QueryBlackhole),
            connection_kill: series(Channel::ConnectionKill),
            disk_fault: series(Channel::DiskFault),
            scenario_states: states,
        }
    }

    /// One series for `channel` in the given regime, ending at `now`
    pub fn synthesize_series(&self, channel: Channel, enabled: bool, now: u64) -> MetricSeries {
        let range = channel.range(enabled);
        (0..SERIES_LEN)
            .map(|i| {
                let steps_back = (SERIES_LEN - 1 - i) as u64;
                MetricDataPoint {
                    timestamp: now.saturating_sub(steps_back * SERIES_STEP_MS),
                    value: range.draw(self.source.as_ref()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::synthetic::source::{MaxSource, MinSource};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    const NOW: u64 = 1_700_000_000_000;

    /// Reproducible draws for comparing two synthesizers
    struct SeededSource(Mutex<ChaCha8Rng>);

    impl SeededSource {
        fn new(seed: u64) -> Self {
            Self(Mutex::new(ChaCha8Rng::seed_from_u64(seed)))
        }
    }

    impl ValueSource for SeededSource {
        fn sample(&self, low: f64, high: f64) -> f64 {
            use rand::Rng;
            self.0.lock().unwrap().random_range(low..=high)
        }
    }

    /// Deliberately ignores the requested interval
    struct WildSource;

    impl ValueSource for WildSource {
        fn sample(&self, _low: f64, _high: f64) -> f64 {
            1e9
        }
    }

    struct NanSource;

    impl ValueSource for NanSource {
        fn sample(&self, _low: f64, _high: f64) -> f64 {
            f64::NAN
        }
    }

    fn synthesizer(registry: &Arc<ScenarioRegistry>) -> MetricsSynthesizer {
        MetricsSynthesizer::new(Arc::clone(registry)).with_clock(Arc::new(FixedClock(NOW)))
    }

    fn set_all(registry: &ScenarioRegistry, enabled: bool) {
        for channel in Channel::ALL {
            registry.set(channel.driving_scenario(), enabled);
        }
    }

    #[test]
    fn test_disabled_values_within_disabled_range() {
        let registry = Arc::new(ScenarioRegistry::new());
        let synth = synthesizer(&registry);

        for _ in 0..50 {
            let metrics = synth.synthesize();
            for channel in Channel::ALL {
                let range = channel.range(false);
                for point in metrics.series(channel) {
                    assert!(
                        range.contains(point.value),
                        "{:?} value {} outside {:?}",
                        channel,
                        point.value,
                        range
                    );
                }
            }
        }
    }

    #[test]
    fn test_enabled_values_within_enabled_range() {
        let registry = Arc::new(ScenarioRegistry::new());
        set_all(&registry, true);
        let synth = synthesizer(&registry);

        for _ in 0..50 {
            let metrics = synth.synthesize();
            for channel in Channel::ALL {
                let range = channel.range(true);
                assert!(
                    metrics.series(channel).iter().all(|p| range.contains(p.value)),
                    "{:?} produced a value outside {:?}",
                    channel,
                    range
                );
            }
        }
    }

    #[test]
    fn test_cpu_load_example_ranges() {
        let registry = Arc::new(ScenarioRegistry::new());
        let synth = synthesizer(&registry);

        let metrics = synth.synthesize();
        assert!(metrics.cpu_load.iter().all(|p| (10.0..=30.0).contains(&p.value)));

        registry.toggle(ScenarioName::CpuLoad);
        let metrics = synth.synthesize();
        assert!(metrics.cpu_load.iter().all(|p| (70.0..=95.0).contains(&p.value)));
    }

    #[test]
    fn test_fault_channels_are_zero_when_disabled() {
        let registry = Arc::new(ScenarioRegistry::new());
        let metrics = synthesizer(&registry).synthesize();

        for series in [
            &metrics.query_blackhole,
            &metrics.connection_kill,
            &metrics.disk_fault,
        ] {
            assert!(series.iter().all(|p| p.value == 0.0));
        }
    }

    #[test]
    fn test_series_shape_and_timestamps() {
        let registry = Arc::new(ScenarioRegistry::new());
        let metrics = synthesizer(&registry).synthesize();

        for channel in Channel::ALL {
            let series = metrics.series(channel);
            assert_eq!(series.len(), SERIES_LEN);
            assert_eq!(series.last().unwrap().timestamp, NOW);
            assert_eq!(series[0].timestamp, NOW - 9_000);
            for pair in series.windows(2) {
                assert_eq!(pair[1].timestamp - pair[0].timestamp, SERIES_STEP_MS);
            }
        }
    }

    #[test]
    fn test_min_source_hits_lower_bounds() {
        let registry = Arc::new(ScenarioRegistry::new());
        set_all(&registry, true);
        let synth = synthesizer(&registry).with_source(Arc::new(MinSource));
        let metrics = synth.synthesize();

        assert!(metrics.cpu_load.iter().all(|p| p.value == 70.0));
        assert!(metrics.traffic_load.iter().all(|p| p.value == 800.0));
        assert!(metrics.response_time.iter().all(|p| p.value == 400.0));
        assert!(metrics.query_blackhole.iter().all(|p| p.value == 20.0));
        assert!(metrics.connection_kill.iter().all(|p| p.value == 5.0));
        assert!(metrics.disk_fault.iter().all(|p| p.value == 10.0));
    }

    #[test]
    fn test_max_source_hits_upper_bounds() {
        let registry = Arc::new(ScenarioRegistry::new());
        let synth = synthesizer(&registry).with_source(Arc::new(MaxSource));

        let metrics = synth.synthesize();
        assert!(metrics.cpu_load.iter().all(|p| p.value == 30.0));
        assert!(metrics.traffic_load.iter().all(|p| p.value == 300.0));
        assert!(metrics.response_time.iter().all(|p| p.value == 150.0));
        // Constant channels never consult the source
        assert!(metrics.disk_fault.iter().all(|p| p.value == 0.0));

        set_all(&registry, true);
        let metrics = synth.synthesize();
        assert!(metrics.cpu_load.iter().all(|p| p.value == 95.0));
        assert!(metrics.traffic_load.iter().all(|p| p.value == 1400.0));
        assert!(metrics.response_time.iter().all(|p| p.value == 700.0));
        assert!(metrics.query_blackhole.iter().all(|p| p.value == 70.0));
        assert!(metrics.connection_kill.iter().all(|p| p.value == 15.0));
        assert!(metrics.disk_fault.iter().all(|p| p.value == 40.0));
    }

    #[test]
    fn test_out_of_range_source_is_clamped() {
        let registry = Arc::new(ScenarioRegistry::new());
        let synth = synthesizer(&registry).with_source(Arc::new(WildSource));
        let metrics = synth.synthesize();
        assert!(metrics.cpu_load.iter().all(|p| p.value == 30.0));
    }

    #[test]
    fn test_non_finite_samples_fall_back_to_lower_bound() {
        let registry = Arc::new(ScenarioRegistry::new());
        registry.set(ScenarioName::HighLoad, true);
        let metrics = synthesizer(&registry)
            .with_source(Arc::new(NanSource))
            .synthesize();

        assert!(metrics.cpu_load.iter().all(|p| p.value == 10.0));
        assert!(metrics.traffic_load.iter().all(|p| p.value == 800.0));
        assert!(metrics.query_blackhole.iter().all(|p| p.value == 0.0));
    }

    #[test]
    fn test_seeded_sources_reproduce_series() {
        let registry = Arc::new(ScenarioRegistry::new());
        registry.toggle(ScenarioName::HighLoad);

        let a = synthesizer(&registry).with_source(Arc::new(SeededSource::new(7)));
        let b = synthesizer(&registry).with_source(Arc::new(SeededSource::new(7)));

        assert_eq!(a.synthesize().traffic_load, b.synthesize().traffic_load);
    }

    #[test]
    fn test_seeded_series_is_noisy() {
        let registry = Arc::new(ScenarioRegistry::new());
        let synth = synthesizer(&registry).with_source(Arc::new(SeededSource::new(42)));
        let series = synth.synthesize().response_time;

        let first = series[0].value;
        assert!(
            series.iter().any(|p| p.value != first),
            "independent draws should not all match"
        );
    }

    #[test]
    fn test_scenario_states_follow_registry() {
        let registry = Arc::new(ScenarioRegistry::new());
        registry.toggle(ScenarioName::Return404);
        registry.toggle(ScenarioName::StressTesting);

        let states = synthesizer(&registry).synthesize().scenario_states;
        assert_eq!(
            states,
            ScenarioStates {
                cpu_load: false,
                high_load: false,
                return_404: true,
                query_blackhole: false,
                connection_kill: false,
                disk_fault: false,
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let registry = Arc::new(ScenarioRegistry::new());
        let json = serde_json::to_value(synthesizer(&registry).synthesize()).unwrap();

        for key in [
            "cpuLoad",
            "trafficLoad",
            "responseTime",
            "queryBlackhole",
            "connectionKill",
            "diskFault",
        ] {
            assert_eq!(json[key].as_array().unwrap().len(), SERIES_LEN, "{}", key);
        }
        assert_eq!(json["cpuLoad"][9]["timestamp"], NOW);
        assert!(json["cpuLoad"][0]["value"].is_f64());

        let states = json["scenarioStates"].as_object().unwrap();
        let mut keys: Vec<_> = states.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "connectionKill",
                "cpuLoad",
                "diskFault",
                "highLoad",
                "queryBlackhole",
                "return404"
            ]
        );
    }
}
