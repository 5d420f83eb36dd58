use gpubench::{
    BenchmarkConfiguration, BenchmarkKind, HarnessConfig, HostContext, HostContextOptions,
    ManualClock, NoopObserver, RunConfig, UploadBarrier,
    report::{format_summary, render_suite, samples_csv, summary_csv, to_json, write_reports},
    run_suite_with_clock,
};

fn tiny_config() -> HarnessConfig {
    HarnessConfig {
        buffer_sizes_mb: vec![1, 2],
        draw_calls_per_trial: 20,
        run: RunConfig::new(3, 1),
        upload_barrier: UploadBarrier::AwaitIdle,
        ..HarnessConfig::default()
    }
}

#[test]
fn test_suite_runs_buffer_sweep_then_draw_sweep() {
    let mut ctx = HostContext::new();
    let report =
        run_suite_with_clock(&mut ctx, &tiny_config(), ManualClock::stepping(1.5), &mut NoopObserver)
            .unwrap();
    assert!(report.is_complete());
    let kinds: Vec<BenchmarkKind> = report.sweeps.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![BenchmarkKind::BufferUpload, BenchmarkKind::DrawCalls]);

    let uploads = report.sweep(BenchmarkKind::BufferUpload).unwrap();
    assert_eq!(
        uploads.results.configurations(),
        vec![
            BenchmarkConfiguration::buffer_megabytes(1),
            BenchmarkConfiguration::buffer_megabytes(2),
        ]
    );
    let draws = report.sweep(BenchmarkKind::DrawCalls).unwrap();
    let stats = draws
        .results
        .get(&BenchmarkConfiguration::draw_calls(20))
        .unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.median, 1.5);
    assert_eq!(ctx.stats().draws_submitted, 4 * 20);
}

#[test]
fn test_buffer_failure_does_not_prevent_draw_sweep() {
    let mut ctx = HostContext::open(HostContextOptions {
        max_buffer_bytes: 1024 * 1024,
    })
    .unwrap();
    let report =
        run_suite_with_clock(&mut ctx, &tiny_config(), ManualClock::stepping(1.0), &mut NoopObserver)
            .unwrap();
    assert!(!report.is_complete());
    let uploads = report.sweep(BenchmarkKind::BufferUpload).unwrap();
    assert_eq!(uploads.results.len(), 1);
    assert_eq!(uploads.failures.len(), 1);
    assert!(report.sweep(BenchmarkKind::DrawCalls).unwrap().is_complete());
}

#[test]
fn test_lost_context_is_fatal_before_the_suite() {
    let mut ctx = HostContext::new();
    ctx.lose_context();
    let err =
        run_suite_with_clock(&mut ctx, &tiny_config(), ManualClock::stepping(1.0), &mut NoopObserver)
            .unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_empty_size_list_aborts_the_suite_with_a_reason() {
    let mut ctx = HostContext::new();
    let config = HarnessConfig {
        buffer_sizes_mb: Vec::new(),
        ..tiny_config()
    };
    let report =
        run_suite_with_clock(&mut ctx, &config, ManualClock::stepping(1.0), &mut NoopObserver)
            .unwrap();
    let abort = report.fatal.as_ref().unwrap();
    assert_eq!(abort.kind, BenchmarkKind::BufferUpload);
    assert!(report.sweeps.is_empty());
    assert!(render_suite(&report).contains("ABORTED buffer_upload sweep"));
}

#[test]
fn test_summary_block_matches_console_format() {
    let mut ctx = HostContext::new();
    let report =
        run_suite_with_clock(&mut ctx, &tiny_config(), ManualClock::stepping(1.0), &mut NoopObserver)
            .unwrap();
    let uploads = report.sweep(BenchmarkKind::BufferUpload).unwrap();
    let entry = &uploads.results.entries()[0];
    let block = format_summary(&entry.configuration, &entry.summary);
    assert_eq!(
        block,
        "[1MB summary]\niterations: 3\nmean: 1.000 ms\nstd dev: 0.000 ms\nmin: 1.000 ms\nmax: 1.000 ms\nmedian: 1.000 ms\n"
    );
}

#[test]
fn test_csv_and_json_reports() {
    let mut ctx = HostContext::new();
    let report =
        run_suite_with_clock(&mut ctx, &tiny_config(), ManualClock::stepping(1.0), &mut NoopObserver)
            .unwrap();

    let summary = summary_csv(&report);
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("benchmark,configuration,count"));
    assert!(lines[1].starts_with("buffer_upload,1MB,3,1.000000"));
    assert!(lines[3].starts_with("draw_calls,20calls,3,"));

    // 3 configurations of 3 samples each, plus the header
    assert_eq!(samples_csv(&report).lines().count(), 10);

    let json: serde_json::Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
    assert_eq!(json["sweeps"].as_array().unwrap().len(), 2);
    assert!(json["fatal"].is_null());

    let dir = tempfile::tempdir().unwrap();
    let paths = write_reports(&report, &dir.path().join("out").join("run.json")).unwrap();
    assert!(paths.json.exists());
    assert!(paths.summary_csv.ends_with("run.summary.csv"));
    assert_eq!(std::fs::read_to_string(&paths.summary_csv).unwrap(), summary);
    assert!(paths.samples_csv.exists());
}
