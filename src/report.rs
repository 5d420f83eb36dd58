//! Text, JSON and CSV renderings of benchmark results.

use std::{
    env,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    BenchError,
    config::BenchmarkConfiguration,
    results::ResultSet,
    stats::SummaryStatistics,
    suite::SuiteReport,
    sweep::SweepReport,
};

/// Environment variable overriding where the JSON report is written.
pub const REPORT_FILE_ENV: &str = "GPUBENCH_REPORT_FILE";

const DEFAULT_REPORT_FILE: &str = "gpubench_report.json";

/// Files produced by [`write_reports`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub summary_csv: PathBuf,
    pub samples_csv: PathBuf,
}

pub fn report_file_path() -> PathBuf {
    match env::var(REPORT_FILE_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => Path::new(DEFAULT_REPORT_FILE).to_path_buf(),
    }
}

fn heading(configuration: &BenchmarkConfiguration) -> String {
    match configuration {
        BenchmarkConfiguration::BufferUpload { .. } => configuration.label(),
        BenchmarkConfiguration::DrawCalls { calls_per_trial } => {
            format!("draw calls, {calls_per_trial} calls/iter")
        }
    }
}

/// Summary block for one configuration, values in milliseconds to three decimals.
pub fn format_summary(configuration: &BenchmarkConfiguration, summary: &SummaryStatistics) -> String {
    format!(
        "[{} summary]\niterations: {}\nmean: {:.3} ms\nstd dev: {:.3} ms\nmin: {:.3} ms\nmax: {:.3} ms\nmedian: {:.3} ms\n",
        heading(configuration),
        summary.count,
        summary.mean,
        summary.stddev,
        summary.min,
        summary.max,
        summary.median
    )
}

pub fn render_table(results: &ResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14}{:>8}{:>12}{:>12}{:>12}{:>12}{:>12}",
        "config", "iters", "mean ms", "stddev ms", "min ms", "max ms", "median ms"
    );
    for entry in results.entries() {
        let s = &entry.summary;
        let _ = writeln!(
            out,
            "{:<14}{:>8}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}",
            entry.configuration.label(),
            s.count,
            s.mean,
            s.stddev,
            s.min,
            s.max,
            s.median
        );
    }
    out
}

pub fn render_sweep(report: &SweepReport) -> String {
    let mut out = format!("== {} ==\n", report.kind);
    for entry in report.results.entries() {
        out.push_str(&format_summary(&entry.configuration, &entry.summary));
        out.push('\n');
    }
    out.push_str(&render_table(&report.results));
    for failure in &report.failures {
        let _ = writeln!(out, "FAILED {failure}");
    }
    if !report.skipped.is_empty() {
        let labels: Vec<String> = report.skipped.iter().map(|c| c.label()).collect();
        let _ = writeln!(out, "SKIPPED {}", labels.join(", "));
    }
    out
}

pub fn render_suite(report: &SuiteReport) -> String {
    let mut out = String::new();
    for sweep in &report.sweeps {
        out.push_str(&render_sweep(sweep));
        out.push('\n');
    }
    if let Some(abort) = &report.fatal {
        let _ = writeln!(out, "ABORTED {} sweep: {}", abort.kind, abort.error);
    }
    out
}

pub fn summary_csv(report: &SuiteReport) -> String {
    let mut out = String::from("benchmark,configuration,count,mean_ms,stddev_ms,min_ms,max_ms,median_ms\n");
    for sweep in &report.sweeps {
        for entry in sweep.results.entries() {
            let s = &entry.summary;
            let _ = writeln!(
                out,
                "{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6}",
                sweep.kind,
                entry.configuration.label(),
                s.count,
                s.mean,
                s.stddev,
                s.min,
                s.max,
                s.median
            );
        }
    }
    out
}

/// Every measured trial in execution order.
pub fn samples_csv(report: &SuiteReport) -> String {
    let mut out = String::from("benchmark,configuration,trial,ms\n");
    for sweep in &report.sweeps {
        for entry in sweep.results.entries() {
            for (index, sample) in entry.series.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{},{},{},{:.6}",
                    sweep.kind,
                    entry.configuration.label(),
                    index + 1,
                    sample
                );
            }
        }
    }
    out
}

pub fn to_json(report: &SuiteReport) -> Result<String, BenchError> {
    serde_json::to_string_pretty(report).map_err(|e| BenchError::report(e.to_string()))
}

/// Writes the JSON report to `json_path` and both CSV files next to it.
pub fn write_reports(report: &SuiteReport, json_path: &Path) -> Result<ReportPaths, BenchError> {
    let paths = ReportPaths {
        json: json_path.to_path_buf(),
        summary_csv: json_path.with_extension("summary.csv"),
        samples_csv: json_path.with_extension("samples.csv"),
    };
    if let Some(parent) = json_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| BenchError::report(e.to_string()))?;
        }
    }
    write_file(&paths.json, &to_json(report)?)?;
    write_file(&paths.summary_csv, &summary_csv(report))?;
    write_file(&paths.samples_csv, &samples_csv(report))?;
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<(), BenchError> {
    fs::write(path, contents)
        .map_err(|e| BenchError::report(format!("{}: {e}", path.display())))
}
