//! Progress callbacks for runs and sweeps.
//!
//! The harness produces data; anything that wants to watch it happen
//! implements [`Observer`]. Every method has an empty default.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    BenchError,
    config::{BenchmarkConfiguration, BenchmarkKind},
    series::Sample,
    stats::SummaryStatistics,
};

/// States a single configuration passes through.
///
/// `Idle -> Warmup -> Measuring -> Summarizing -> Recorded`, or `Failed` from
/// any non-terminal state. Warmup is entered even when it has no trials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    Idle,
    Warmup,
    Measuring,
    Summarizing,
    Recorded,
    Failed,
    /// Restoring context state after the configuration.
    Reset,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Warmup => "warmup",
            RunPhase::Measuring => "measuring",
            RunPhase::Summarizing => "summarizing",
            RunPhase::Recorded => "recorded",
            RunPhase::Failed => "failed",
            RunPhase::Reset => "reset",
        };
        f.write_str(name)
    }
}

pub trait Observer {
    fn on_sweep_start(&mut self, _kind: BenchmarkKind, _configurations: &[BenchmarkConfiguration]) {
    }

    fn on_phase(&mut self, _configuration: &BenchmarkConfiguration, _phase: RunPhase) {}

    /// Called for each measured trial; `index` is zero-based.
    fn on_sample(&mut self, _configuration: &BenchmarkConfiguration, _index: usize, _sample: Sample) {
    }

    fn on_recorded(
        &mut self,
        _configuration: &BenchmarkConfiguration,
        _summary: &SummaryStatistics,
    ) {
    }

    fn on_failed(
        &mut self,
        _configuration: &BenchmarkConfiguration,
        _phase: RunPhase,
        _error: &BenchError,
    ) {
    }

    fn on_reset(&mut self) {}
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Emits events through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_sweep_start(&mut self, kind: BenchmarkKind, configurations: &[BenchmarkConfiguration]) {
        info!(%kind, configurations = configurations.len(), "starting sweep");
    }

    fn on_phase(&mut self, configuration: &BenchmarkConfiguration, phase: RunPhase) {
        match phase {
            RunPhase::Warmup | RunPhase::Measuring => {
                info!(configuration = %configuration, %phase, "phase")
            }
            _ => debug!(configuration = %configuration, %phase, "phase"),
        }
    }

    fn on_sample(&mut self, configuration: &BenchmarkConfiguration, index: usize, sample: Sample) {
        debug!(
            configuration = %configuration,
            iter = index + 1,
            ms = sample,
            "trial"
        );
    }

    fn on_recorded(&mut self, configuration: &BenchmarkConfiguration, summary: &SummaryStatistics) {
        info!(
            configuration = %configuration,
            iterations = summary.count,
            mean_ms = summary.mean,
            stddev_ms = summary.stddev,
            median_ms = summary.median,
            "recorded"
        );
    }

    fn on_failed(&mut self, configuration: &BenchmarkConfiguration, phase: RunPhase, error: &BenchError) {
        warn!(configuration = %configuration, %phase, %error, "configuration failed");
    }

    fn on_reset(&mut self) {
        debug!("resetting graphics context");
    }
}

/// Records every event; handy for asserting on harness behavior.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingObserver {
    pub events: Vec<ObservedEvent>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObservedEvent {
    SweepStart(BenchmarkKind),
    Phase(BenchmarkConfiguration, RunPhase),
    Sample(BenchmarkConfiguration, usize, Sample),
    Recorded(BenchmarkConfiguration),
    Failed(BenchmarkConfiguration, RunPhase),
    Reset,
}

impl RecordingObserver {
    pub fn phases_for(&self, configuration: &BenchmarkConfiguration) -> Vec<RunPhase> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ObservedEvent::Phase(c, phase) if c == configuration => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ObservedEvent::Reset))
            .count()
    }
}

impl Observer for RecordingObserver {
    fn on_sweep_start(&mut self, kind: BenchmarkKind, _configurations: &[BenchmarkConfiguration]) {
        self.events.push(ObservedEvent::SweepStart(kind));
    }

    fn on_phase(&mut self, configuration: &BenchmarkConfiguration, phase: RunPhase) {
        self.events.push(ObservedEvent::Phase(*configuration, phase));
    }

    fn on_sample(&mut self, configuration: &BenchmarkConfiguration, index: usize, sample: Sample) {
        self.events
            .push(ObservedEvent::Sample(*configuration, index, sample));
    }

    fn on_recorded(&mut self, configuration: &BenchmarkConfiguration, _summary: &SummaryStatistics) {
        self.events.push(ObservedEvent::Recorded(*configuration));
    }

    fn on_failed(&mut self, configuration: &BenchmarkConfiguration, phase: RunPhase, _error: &BenchError) {
        self.events.push(ObservedEvent::Failed(*configuration, phase));
    }

    fn on_reset(&mut self) {
        self.events.push(ObservedEvent::Reset);
    }
}
