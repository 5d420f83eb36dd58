//! Warmup and measurement of a single configuration.

use thiserror::Error;

use crate::{
    BenchError,
    config::{BenchmarkConfiguration, BenchmarkKind, RunConfig},
    context::GraphicsContext,
    observer::{Observer, RunPhase},
    series::{TrialSeries, validate_sample},
    timing::{Clock, MonotonicClock, measure},
};

/// A benchmark that can build fresh units of work for its configurations.
///
/// Only [`Benchmark::execute`] is timed. Preparing and finishing a trial
/// happen outside the timestamp pair, so per-trial allocation and cleanup do
/// not leak into the measurement.
pub trait Benchmark<C: GraphicsContext + ?Sized> {
    /// One prepared unit of work.
    type Trial;

    fn kind(&self) -> BenchmarkKind;

    /// Binds whatever the configuration needs before its warmup.
    fn setup(&mut self, _ctx: &mut C, _config: &BenchmarkConfiguration) -> Result<(), BenchError> {
        Ok(())
    }

    /// Creates a fresh unit of work; never reuses a previous trial's resources.
    fn prepare_trial(
        &mut self,
        ctx: &mut C,
        config: &BenchmarkConfiguration,
    ) -> Result<Self::Trial, BenchError>;

    fn execute(&mut self, ctx: &mut C, trial: &mut Self::Trial) -> Result<(), BenchError>;

    fn finish_trial(&mut self, _ctx: &mut C, _trial: Self::Trial) -> Result<(), BenchError> {
        Ok(())
    }
}

/// A run that stopped before producing a complete series.
#[derive(Clone, Debug, Error)]
#[error("{phase} failed{}: {source}", trial_suffix(.trial))]
pub struct RunError {
    pub phase: RunPhase,
    /// Zero-based index of the failing trial within its phase.
    pub trial: Option<usize>,
    pub source: BenchError,
}

fn trial_suffix(trial: &Option<usize>) -> String {
    match trial {
        Some(index) => format!(" at trial {}", index + 1),
        None => String::new(),
    }
}

impl RunError {
    fn new(phase: RunPhase, trial: Option<usize>, source: BenchError) -> Self {
        Self {
            phase,
            trial,
            source,
        }
    }
}

/// Executes warmup and measured trials strictly in sequence.
pub struct BenchmarkRunner<K: Clock = MonotonicClock> {
    config: RunConfig,
    clock: K,
}

impl BenchmarkRunner<MonotonicClock> {
    pub fn new(config: RunConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<K: Clock> BenchmarkRunner<K> {
    pub fn with_clock(config: RunConfig, clock: K) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    /// Runs one configuration and returns its measured samples in execution order.
    ///
    /// The returned series always holds exactly `iterations` samples; warmup
    /// samples are validated and then dropped.
    pub fn run<C, B>(
        &mut self,
        ctx: &mut C,
        benchmark: &mut B,
        configuration: &BenchmarkConfiguration,
        observer: &mut dyn Observer,
    ) -> Result<TrialSeries, RunError>
    where
        C: GraphicsContext + ?Sized,
        B: Benchmark<C> + ?Sized,
    {
        self.config
            .validate()
            .map_err(|e| RunError::new(RunPhase::Idle, None, e))?;
        if configuration.kind() != benchmark.kind() {
            return Err(RunError::new(
                RunPhase::Idle,
                None,
                BenchError::invalid_input(format!(
                    "{} benchmark cannot run configuration {configuration}",
                    benchmark.kind()
                )),
            ));
        }
        benchmark
            .setup(ctx, configuration)
            .map_err(|e| RunError::new(RunPhase::Idle, None, e))?;

        observer.on_phase(configuration, RunPhase::Warmup);
        for index in 0..self.config.warmup {
            self.trial(ctx, benchmark, configuration)
                .map_err(|e| RunError::new(RunPhase::Warmup, Some(index), e))?;
        }

        observer.on_phase(configuration, RunPhase::Measuring);
        let mut series = TrialSeries::with_capacity(self.config.iterations);
        for index in 0..self.config.iterations {
            let sample = self
                .trial(ctx, benchmark, configuration)
                .and_then(|sample| series.push(sample).map(|()| sample))
                .map_err(|e| RunError::new(RunPhase::Measuring, Some(index), e))?;
            observer.on_sample(configuration, index, sample);
        }
        Ok(series)
    }

    fn trial<C, B>(
        &mut self,
        ctx: &mut C,
        benchmark: &mut B,
        configuration: &BenchmarkConfiguration,
    ) -> Result<f64, BenchError>
    where
        C: GraphicsContext + ?Sized,
        B: Benchmark<C> + ?Sized,
    {
        let mut trial = benchmark.prepare_trial(ctx, configuration)?;
        let sample = measure(&mut self.clock, || benchmark.execute(ctx, &mut trial))?;
        benchmark.finish_trial(ctx, trial)?;
        let sample = validate_sample(sample)?;
        if let Some(timeout) = self.config.trial_timeout {
            let limit_ms = timeout.as_secs_f64() * 1_000.0;
            if sample > limit_ms {
                return Err(BenchError::timeout(format!(
                    "{configuration} trial took {sample:.3} ms, limit is {limit_ms:.3} ms"
                )));
            }
        }
        Ok(sample)
    }
}
