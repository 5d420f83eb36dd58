//! Sweeps a benchmark across its configurations, one run per configuration.
//!
//! Each configuration is run, summarized and recorded, then the context is
//! reset before the next one starts. A failed configuration never reaches the
//! [`ResultSet`]; it is reported alongside whatever did get recorded.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    BenchError,
    config::{BenchmarkConfiguration, BenchmarkKind, RunConfig},
    context::GraphicsContext,
    observer::{Observer, RunPhase},
    results::ResultSet,
    runner::{Benchmark, BenchmarkRunner, RunError},
    timing::{Clock, MonotonicClock},
};

/// What a sweep does after a configuration fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop; remaining configurations are reported as skipped.
    #[default]
    Abort,
    /// Reset and carry on with the next configuration.
    Continue,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConfigurationFailure {
    pub configuration: BenchmarkConfiguration,
    pub phase: RunPhase,
    pub trial: Option<usize>,
    #[serde(serialize_with = "error_as_string")]
    pub error: BenchError,
}

impl ConfigurationFailure {
    fn from_run(configuration: BenchmarkConfiguration, err: RunError) -> Self {
        Self {
            configuration,
            phase: err.phase,
            trial: err.trial,
            error: err.source,
        }
    }

    fn at(configuration: BenchmarkConfiguration, phase: RunPhase, error: BenchError) -> Self {
        Self {
            configuration,
            phase,
            trial: None,
            error,
        }
    }
}

impl fmt::Display for ConfigurationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed during {}", self.configuration, self.phase)?;
        if let Some(index) = self.trial {
            write!(f, " (trial {})", index + 1)?;
        }
        write!(f, ": {}", self.error)
    }
}

pub(crate) fn error_as_string<S: Serializer>(error: &BenchError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Outcome of one sweep: everything recorded plus everything that was not.
#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
    pub kind: BenchmarkKind,
    pub results: ResultSet,
    pub failures: Vec<ConfigurationFailure>,
    pub skipped: Vec<BenchmarkConfiguration>,
}

impl SweepReport {
    fn new(kind: BenchmarkKind) -> Self {
        Self {
            kind,
            results: ResultSet::new(kind),
            failures: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// The results if every configuration was recorded, otherwise a [`SweepError`]
    /// that still carries the partial results.
    pub fn into_result(self) -> Result<ResultSet, SweepError> {
        if self.is_complete() {
            Ok(self.results)
        } else {
            Err(SweepError { report: self })
        }
    }
}

#[derive(Debug)]
pub struct SweepError {
    pub report: SweepReport,
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sweep incomplete: {} recorded, {} failed, {} skipped",
            self.report.kind,
            self.report.results.len(),
            self.report.failures.len(),
            self.report.skipped.len()
        )?;
        if let Some(first) = self.report.failures.first() {
            write!(f, "; {first}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.report
            .failures
            .first()
            .map(|failure| &failure.error as &dyn std::error::Error)
    }
}

pub struct SweepController<K: Clock = MonotonicClock> {
    runner: BenchmarkRunner<K>,
    policy: FailurePolicy,
}

impl SweepController<MonotonicClock> {
    pub fn new(run: RunConfig, policy: FailurePolicy) -> Self {
        Self::with_clock(run, policy, MonotonicClock::new())
    }
}

impl<K: Clock> SweepController<K> {
    pub fn with_clock(run: RunConfig, policy: FailurePolicy, clock: K) -> Self {
        Self {
            runner: BenchmarkRunner::with_clock(run, clock),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn runner_mut(&mut self) -> &mut BenchmarkRunner<K> {
        &mut self.runner
    }

    /// Runs `benchmark` once per configuration, in order.
    ///
    /// Returns `Err` only when the sweep cannot start: a lost context, an
    /// invalid run config, an empty or duplicated configuration list, a
    /// configuration of the wrong kind, or a failing initial reset. Failures
    /// after that are collected in the returned [`SweepReport`].
    pub fn run_sweep<C, B>(
        &mut self,
        ctx: &mut C,
        benchmark: &mut B,
        configurations: &[BenchmarkConfiguration],
        observer: &mut dyn Observer,
    ) -> Result<SweepReport, BenchError>
    where
        C: GraphicsContext + ?Sized,
        B: Benchmark<C> + ?Sized,
    {
        if ctx.is_context_lost() {
            return Err(BenchError::context_unavailable(
                "graphics context lost before sweep",
            ));
        }
        self.runner.config().validate()?;
        let kind = benchmark.kind();
        validate_configurations(kind, configurations)?;

        observer.on_sweep_start(kind, configurations);
        observer.on_reset();
        ctx.reset_state()?;

        let mut report = SweepReport::new(kind);
        for (position, configuration) in configurations.iter().enumerate() {
            let remaining = &configurations[position + 1..];
            observer.on_phase(configuration, RunPhase::Idle);
            let outcome = self.record(ctx, benchmark, configuration, &mut report.results, observer);
            let failed = match outcome {
                Ok(()) => false,
                Err(failure) => {
                    observer.on_failed(configuration, failure.phase, &failure.error);
                    observer.on_phase(configuration, RunPhase::Failed);
                    report.failures.push(failure);
                    true
                }
            };

            if ctx.is_context_lost() {
                report.skipped.extend_from_slice(remaining);
                break;
            }
            observer.on_reset();
            if let Err(error) = ctx.reset_state() {
                observer.on_failed(configuration, RunPhase::Reset, &error);
                report
                    .failures
                    .push(ConfigurationFailure::at(*configuration, RunPhase::Reset, error));
                report.skipped.extend_from_slice(remaining);
                break;
            }
            if failed && self.policy == FailurePolicy::Abort {
                report.skipped.extend_from_slice(remaining);
                break;
            }
        }
        Ok(report)
    }

    fn record<C, B>(
        &mut self,
        ctx: &mut C,
        benchmark: &mut B,
        configuration: &BenchmarkConfiguration,
        results: &mut ResultSet,
        observer: &mut dyn Observer,
    ) -> Result<(), ConfigurationFailure>
    where
        C: GraphicsContext + ?Sized,
        B: Benchmark<C> + ?Sized,
    {
        let series = self
            .runner
            .run(ctx, benchmark, configuration, observer)
            .map_err(|err| ConfigurationFailure::from_run(*configuration, err))?;

        observer.on_phase(configuration, RunPhase::Summarizing);
        let summary = series
            .summarize()
            .map_err(|e| ConfigurationFailure::at(*configuration, RunPhase::Summarizing, e))?;
        results
            .insert(*configuration, series, summary)
            .map_err(|e| ConfigurationFailure::at(*configuration, RunPhase::Summarizing, e))?;

        observer.on_recorded(configuration, &summary);
        observer.on_phase(configuration, RunPhase::Recorded);
        Ok(())
    }
}

fn validate_configurations(
    kind: BenchmarkKind,
    configurations: &[BenchmarkConfiguration],
) -> Result<(), BenchError> {
    if configurations.is_empty() {
        return Err(BenchError::invalid_input("sweep has no configurations"));
    }
    let mut seen = AHashSet::with_capacity(configurations.len());
    for configuration in configurations {
        if configuration.kind() != kind {
            return Err(BenchError::invalid_input(format!(
                "{configuration} cannot be part of a {kind} sweep"
            )));
        }
        if !seen.insert(*configuration) {
            return Err(BenchError::invalid_input(format!(
                "{configuration} appears more than once in the sweep"
            )));
        }
    }
    Ok(())
}
