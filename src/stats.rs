//! Summary statistics over a series of trial durations.

use serde::{Deserialize, Serialize};

use crate::{BenchError, series::validate_sample};

/// Aggregate of one configuration's samples, all values in milliseconds.
///
/// `stddev` is the population standard deviation (divisor `count`), and
/// `median` is the element at index `count / 2` of the ascending sort, so an
/// even-length series reports its upper-middle value rather than an average.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Summarizes `samples` without reordering them.
pub fn summarize(samples: &[f64]) -> Result<SummaryStatistics, BenchError> {
    if samples.is_empty() {
        return Err(BenchError::EmptySeries);
    }
    for &sample in samples {
        validate_sample(sample)?;
    }
    let count = samples.len();
    let n = count as f64;

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let min = sorted[0];
    let max = sorted[count - 1];
    let median = sorted[count / 2];

    // rounding in the sum can push the mean a ulp past the extremes
    let mean = (samples.iter().sum::<f64>() / n).clamp(min, max);
    let variance = samples
        .iter()
        .map(|x| (x - mean) * (x - mean))
        .sum::<f64>()
        / n;

    Ok(SummaryStatistics {
        count,
        mean,
        stddev: variance.sqrt(),
        min,
        max,
        median,
    })
}
