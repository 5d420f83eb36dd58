use serde::{Deserialize, Serialize};

use crate::{
    BenchError,
    config::{BenchmarkConfiguration, BenchmarkKind},
    series::TrialSeries,
    stats::SummaryStatistics,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub configuration: BenchmarkConfiguration,
    pub summary: SummaryStatistics,
    pub series: TrialSeries,
}

/// Summaries of one sweep, keyed by configuration, in the order they were recorded.
///
/// Each configuration is recorded at most once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    kind: BenchmarkKind,
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub fn new(kind: BenchmarkKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> BenchmarkKind {
        self.kind
    }

    pub fn insert(
        &mut self,
        configuration: BenchmarkConfiguration,
        series: TrialSeries,
        summary: SummaryStatistics,
    ) -> Result<(), BenchError> {
        if configuration.kind() != self.kind {
            return Err(BenchError::invalid_input(format!(
                "{configuration} does not belong in a {} result set",
                self.kind
            )));
        }
        if self.contains(&configuration) {
            return Err(BenchError::invalid_input(format!(
                "{configuration} already recorded"
            )));
        }
        if summary.count != series.len() {
            return Err(BenchError::invalid_input(format!(
                "summary of {} samples does not match series of {}",
                summary.count,
                series.len()
            )));
        }
        self.entries.push(ResultEntry {
            configuration,
            summary,
            series,
        });
        Ok(())
    }

    pub fn contains(&self, configuration: &BenchmarkConfiguration) -> bool {
        self.entry(configuration).is_some()
    }

    pub fn get(&self, configuration: &BenchmarkConfiguration) -> Option<&SummaryStatistics> {
        self.entry(configuration).map(|e| &e.summary)
    }

    pub fn series(&self, configuration: &BenchmarkConfiguration) -> Option<&TrialSeries> {
        self.entry(configuration).map(|e| &e.series)
    }

    pub fn entry(&self, configuration: &BenchmarkConfiguration) -> Option<&ResultEntry> {
        self.entries
            .iter()
            .find(|e| &e.configuration == configuration)
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn configurations(&self) -> Vec<BenchmarkConfiguration> {
        self.entries.iter().map(|e| e.configuration).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
