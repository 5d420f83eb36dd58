//! Micro-benchmark harness for GPU buffer upload and draw submission latency.
//!
//! A [`SweepController`] runs a [`Benchmark`] once per [`BenchmarkConfiguration`]
//! against any [`GraphicsContext`]: warmup trials first, then timed trials,
//! then [`summarize`] into [`SummaryStatistics`], then a context reset before
//! the next configuration. [`HostContext`] is the bundled in-process context.
//!
//! ```rust
//! use gpubench::{
//!     BenchmarkConfiguration, BufferUploadBenchmark, FailurePolicy, HostContext, NoopObserver,
//!     RunConfig, SweepController,
//! };
//!
//! let mut ctx = HostContext::new();
//! let mut sweep = SweepController::new(RunConfig::new(5, 1), FailurePolicy::Abort);
//! let configs = [BenchmarkConfiguration::BufferUpload { bytes: 4096 }];
//! let report = sweep
//!     .run_sweep(&mut ctx, &mut BufferUploadBenchmark::default(), &configs, &mut NoopObserver)
//!     .unwrap();
//! assert_eq!(report.results.get(&configs[0]).unwrap().count, 5);
//! ```

pub mod config;
pub mod context;
pub mod errors;
pub mod fault_injection;
pub mod host;
pub mod observer;
pub mod report;
pub mod results;
pub mod runner;
pub mod series;
pub mod stats;
pub mod suite;
pub mod sweep;
pub mod timing;
pub mod workloads;

pub use crate::config::{BenchmarkConfiguration, BenchmarkKind, HarnessConfig, RunConfig};
pub use crate::context::{
    BufferHandle, BufferTarget, GraphicsContext, PrimitiveKind, ProgramHandle, ShaderHandle,
    ShaderStage, UsageHint,
};
pub use crate::errors::BenchError;
pub use crate::host::{HostContext, HostContextOptions, HostStats};
pub use crate::observer::{LogObserver, NoopObserver, Observer, RecordingObserver, RunPhase};
pub use crate::results::{ResultEntry, ResultSet};
pub use crate::runner::{Benchmark, BenchmarkRunner, RunError};
pub use crate::series::{Sample, TrialSeries};
pub use crate::stats::{SummaryStatistics, summarize};
pub use crate::suite::{SuiteReport, run_suite, run_suite_with_clock};
pub use crate::sweep::{
    ConfigurationFailure, FailurePolicy, SweepController, SweepError, SweepReport,
};
pub use crate::timing::{Clock, ManualClock, MonotonicClock, measure};
pub use crate::workloads::{
    BufferUploadBenchmark, DrawCallBenchmark, ShaderSources, UploadBarrier,
};
