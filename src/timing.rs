//! Timestamp sources and the timed-trial primitive.

use std::{collections::VecDeque, time::Instant};

use crate::{BenchError, series::Sample};

/// Source of monotonic timestamps in milliseconds.
///
/// The harness never trusts the difference of two readings blindly; samples
/// are validated before they are admitted into a series.
pub trait Clock {
    fn now_ms(&mut self) -> f64;
}

impl<F> Clock for F
where
    F: FnMut() -> f64,
{
    fn now_ms(&mut self) -> f64 {
        self()
    }
}

/// Wall-clock timer backed by [`Instant`].
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1_000.0
    }
}

/// Deterministic clock: replays scripted timestamps, then advances by a fixed
/// step on every reading.
#[derive(Clone, Debug)]
pub struct ManualClock {
    scripted: VecDeque<f64>,
    current: f64,
    step_ms: f64,
}

impl ManualClock {
    /// Every reading advances by `step_ms`, so each trial measures exactly `step_ms`.
    pub fn stepping(step_ms: f64) -> Self {
        Self {
            scripted: VecDeque::new(),
            current: 0.0,
            step_ms,
        }
    }

    /// Replays `timestamps` in order before falling back to `step_ms` increments.
    pub fn scripted(timestamps: impl IntoIterator<Item = f64>, step_ms: f64) -> Self {
        Self {
            scripted: timestamps.into_iter().collect(),
            current: 0.0,
            step_ms,
        }
    }

    pub fn readings_remaining(&self) -> usize {
        self.scripted.len()
    }
}

impl Clock for ManualClock {
    fn now_ms(&mut self) -> f64 {
        match self.scripted.pop_front() {
            Some(ts) => {
                self.current = ts;
            }
            None => {
                self.current += self.step_ms;
            }
        }
        self.current
    }
}

/// Runs one unit of work between two clock readings and returns the elapsed time.
///
/// The result is not validated here. If `work` fails, its error is returned and
/// no sample is produced.
pub fn measure<K, F>(clock: &mut K, work: F) -> Result<Sample, BenchError>
where
    K: Clock + ?Sized,
    F: FnOnce() -> Result<(), BenchError>,
{
    let start = clock.now_ms();
    work()?;
    let end = clock.now_ms();
    Ok(end - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_returns_difference_of_readings() {
        let mut clock = ManualClock::scripted([10.0, 12.5], 1.0);
        let sample = measure(&mut clock, || Ok(())).unwrap();
        assert_eq!(sample, 2.5);
        assert_eq!(clock.readings_remaining(), 0);
    }

    #[test]
    fn test_measure_does_not_validate() {
        let mut clock = ManualClock::scripted([5.0, 3.0], 1.0);
        let sample = measure(&mut clock, || Ok(())).unwrap();
        assert_eq!(sample, -2.0);
    }

    #[test]
    fn test_measure_propagates_work_failure() {
        let mut clock = ManualClock::stepping(1.0);
        let err = measure(&mut clock, || Err(BenchError::resource("boom"))).unwrap_err();
        assert!(matches!(err, BenchError::ResourceCreation(_)));
    }

    #[test]
    fn test_closure_clock() {
        let mut ticks = [1.0, 4.0].into_iter();
        let mut clock = move || ticks.next().unwrap_or(0.0);
        assert_eq!(measure(&mut clock, || Ok(())).unwrap(), 3.0);
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let mut clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
