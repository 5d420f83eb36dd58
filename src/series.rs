//! Trial samples and the ordered series a run produces.
//!
//! A sample is a single elapsed duration in milliseconds. Samples only enter a
//! [`TrialSeries`] through [`TrialSeries::push`], which rejects negative and
//! non-finite values, so a series handed to the aggregator is always clean.

use serde::{Deserialize, Serialize};

use crate::{
    BenchError,
    stats::{SummaryStatistics, summarize},
};

/// Elapsed duration of one trial, in milliseconds.
pub type Sample = f64;

/// Checks that a captured duration can be admitted into a series.
pub fn validate_sample(sample: Sample) -> Result<Sample, BenchError> {
    if sample.is_nan() {
        return Err(BenchError::measurement("sample is NaN"));
    }
    if sample.is_infinite() {
        return Err(BenchError::measurement(format!("sample is infinite ({sample})")));
    }
    if sample < 0.0 {
        return Err(BenchError::measurement(format!(
            "sample is negative ({sample} ms)"
        )));
    }
    Ok(sample)
}

/// Samples of one configuration's run, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSeries {
    samples: Vec<Sample>,
}

impl TrialSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Builds a series from raw millisecond values, validating each one.
    pub fn from_millis(values: &[f64]) -> Result<Self, BenchError> {
        let mut series = Self::with_capacity(values.len());
        for &value in values {
            series.push(value)?;
        }
        Ok(series)
    }

    pub fn push(&mut self, sample: Sample) -> Result<(), BenchError> {
        let sample = validate_sample(sample)?;
        self.samples.push(sample);
        Ok(())
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        self.samples.iter().copied()
    }

    pub fn summarize(&self) -> Result<SummaryStatistics, BenchError> {
        summarize(&self.samples)
    }
}
