//! The bundled suite: a buffer-upload sweep followed by a draw-call sweep.

use serde::Serialize;

use crate::{
    BenchError,
    config::{BenchmarkKind, HarnessConfig},
    context::GraphicsContext,
    observer::Observer,
    sweep::{SweepController, SweepReport},
    timing::{Clock, MonotonicClock},
    workloads::{BufferUploadBenchmark, DrawCallBenchmark},
};

/// A sweep that could not start; later sweeps are not attempted.
#[derive(Clone, Debug, Serialize)]
pub struct SuiteAbort {
    pub kind: BenchmarkKind,
    #[serde(serialize_with = "crate::sweep::error_as_string")]
    pub error: BenchError,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SuiteReport {
    pub sweeps: Vec<SweepReport>,
    pub fatal: Option<SuiteAbort>,
}

impl SuiteReport {
    pub fn sweep(&self, kind: BenchmarkKind) -> Option<&SweepReport> {
        self.sweeps.iter().find(|s| s.kind == kind)
    }

    pub fn is_complete(&self) -> bool {
        self.fatal.is_none() && self.sweeps.iter().all(SweepReport::is_complete)
    }
}

pub fn run_suite<C>(
    ctx: &mut C,
    config: &HarnessConfig,
    observer: &mut dyn Observer,
) -> Result<SuiteReport, BenchError>
where
    C: GraphicsContext + ?Sized,
{
    run_suite_with_clock(ctx, config, MonotonicClock::new(), observer)
}

/// Runs the suite against `ctx`, timing every trial with `clock`.
///
/// Fails up front if the context is already lost or the run config is
/// invalid. Once the first sweep has started, failures are reported inside
/// the returned [`SuiteReport`] so earlier results are never discarded.
pub fn run_suite_with_clock<C, K>(
    ctx: &mut C,
    config: &HarnessConfig,
    clock: K,
    observer: &mut dyn Observer,
) -> Result<SuiteReport, BenchError>
where
    C: GraphicsContext + ?Sized,
    K: Clock,
{
    if ctx.is_context_lost() {
        return Err(BenchError::context_unavailable(
            "graphics context lost before the suite started",
        ));
    }
    config.run.validate()?;

    let mut controller =
        SweepController::with_clock(config.run.clone(), config.failure_policy, clock);
    let mut report = SuiteReport::default();

    let mut uploads = BufferUploadBenchmark::new(config.upload_barrier);
    match controller.run_sweep(ctx, &mut uploads, &config.buffer_configurations(), observer) {
        Ok(sweep) => report.sweeps.push(sweep),
        Err(error) => {
            report.fatal = Some(SuiteAbort {
                kind: BenchmarkKind::BufferUpload,
                error,
            });
            return Ok(report);
        }
    }

    let mut draws = DrawCallBenchmark::default();
    match controller.run_sweep(ctx, &mut draws, &config.draw_configurations(), observer) {
        Ok(sweep) => report.sweeps.push(sweep),
        Err(error) => {
            report.fatal = Some(SuiteAbort {
                kind: BenchmarkKind::DrawCalls,
                error,
            });
        }
    }
    Ok(report)
}
