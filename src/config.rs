//! Benchmark identities and the harness constants.
//!
//! Sweep points are described by [`BenchmarkConfiguration`]; how a run is
//! shaped (trial counts, timeout) by [`RunConfig`]; and the full set of
//! constants the bundled suite uses by [`HarnessConfig`].

use std::{env, fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{BenchError, sweep::FailurePolicy, workloads::UploadBarrier};

pub const BYTES_PER_MB: usize = 1024 * 1024;

/// Environment variable selecting the harness profile (`full` or `quick`).
pub const PROFILE_ENV: &str = "GPUBENCH_PROFILE";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkKind {
    BufferUpload,
    DrawCalls,
}

impl BenchmarkKind {
    pub fn name(self) -> &'static str {
        match self {
            BenchmarkKind::BufferUpload => "buffer_upload",
            BenchmarkKind::DrawCalls => "draw_calls",
        }
    }
}

impl fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sweep point. Immutable once a sweep starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkConfiguration {
    BufferUpload { bytes: usize },
    DrawCalls { calls_per_trial: usize },
}

impl BenchmarkConfiguration {
    pub fn buffer_megabytes(megabytes: usize) -> Self {
        BenchmarkConfiguration::BufferUpload {
            bytes: megabytes * BYTES_PER_MB,
        }
    }

    pub fn draw_calls(calls_per_trial: usize) -> Self {
        BenchmarkConfiguration::DrawCalls { calls_per_trial }
    }

    pub fn kind(&self) -> BenchmarkKind {
        match self {
            BenchmarkConfiguration::BufferUpload { .. } => BenchmarkKind::BufferUpload,
            BenchmarkConfiguration::DrawCalls { .. } => BenchmarkKind::DrawCalls,
        }
    }

    /// Short identifier used in report keys, e.g. `4MB` or `1000calls`.
    pub fn label(&self) -> String {
        match *self {
            BenchmarkConfiguration::BufferUpload { bytes } if bytes % BYTES_PER_MB == 0 => {
                format!("{}MB", bytes / BYTES_PER_MB)
            }
            BenchmarkConfiguration::BufferUpload { bytes } => format!("{bytes}B"),
            BenchmarkConfiguration::DrawCalls { calls_per_trial } => {
                format!("{calls_per_trial}calls")
            }
        }
    }
}

impl fmt::Display for BenchmarkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkConfiguration::BufferUpload { .. } => write!(f, "{} buffer", self.label()),
            BenchmarkConfiguration::DrawCalls { calls_per_trial } => {
                write!(f, "{calls_per_trial} draw calls")
            }
        }
    }
}

/// Shape of a single configuration's run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Measured trials per configuration.
    pub iterations: usize,
    /// Discarded trials before measurement starts.
    pub warmup: usize,
    /// Trials running longer than this fail the configuration.
    pub trial_timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(iterations: usize, warmup: usize) -> Self {
        Self {
            iterations,
            warmup,
            trial_timeout: None,
        }
    }

    pub fn with_trial_timeout(mut self, timeout: Duration) -> Self {
        self.trial_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.iterations == 0 {
            return Err(BenchError::invalid_input("iterations must be at least 1"));
        }
        if let Some(timeout) = self.trial_timeout {
            if timeout.is_zero() {
                return Err(BenchError::invalid_input("trial timeout must be positive"));
            }
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(100, 5)
    }
}

/// Constants driving the bundled suite.
///
/// # Examples
///
/// ```rust
/// use gpubench::{BenchmarkConfiguration, HarnessConfig};
///
/// let cfg = HarnessConfig::default();
/// assert_eq!(cfg.run.iterations, 100);
/// assert_eq!(cfg.buffer_configurations()[0], BenchmarkConfiguration::buffer_megabytes(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HarnessConfig {
    pub buffer_sizes_mb: Vec<usize>,
    pub draw_calls_per_trial: usize,
    pub run: RunConfig,
    pub upload_barrier: UploadBarrier,
    pub failure_policy: FailurePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            buffer_sizes_mb: vec![1, 4, 10, 20, 50, 100],
            draw_calls_per_trial: 1000,
            run: RunConfig::default(),
            upload_barrier: UploadBarrier::AwaitIdle,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl HarnessConfig {
    /// Reduced profile for smoke runs.
    pub fn quick() -> Self {
        Self {
            buffer_sizes_mb: vec![1, 4],
            draw_calls_per_trial: 100,
            run: RunConfig::new(10, 2),
            ..Self::default()
        }
    }

    /// Selects a profile by name: `full` or `quick`.
    pub fn profile(name: &str) -> Result<Self, BenchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "full" => Ok(Self::default()),
            "quick" => Ok(Self::quick()),
            other => Err(BenchError::invalid_input(format!(
                "unknown profile {other:?}, expected \"full\" or \"quick\""
            ))),
        }
    }

    /// Reads the profile from `GPUBENCH_PROFILE`, defaulting to `full`.
    pub fn from_env() -> Result<Self, BenchError> {
        match env::var(PROFILE_ENV) {
            Ok(name) => Self::profile(&name),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn buffer_configurations(&self) -> Vec<BenchmarkConfiguration> {
        self.buffer_sizes_mb
            .iter()
            .map(|&mb| BenchmarkConfiguration::buffer_megabytes(mb))
            .collect()
    }

    pub fn draw_configurations(&self) -> Vec<BenchmarkConfiguration> {
        vec![BenchmarkConfiguration::draw_calls(self.draw_calls_per_trial)]
    }
}
