use std::time::Duration;

use gpubench::{
    BenchError, BenchmarkConfiguration, BenchmarkRunner, BufferUploadBenchmark, DrawCallBenchmark,
    HostContext, ManualClock, NoopObserver, RecordingObserver, RunConfig, RunPhase,
    fault_injection::FaultPoint, observer::ObservedEvent,
};

fn small_buffer() -> BenchmarkConfiguration {
    BenchmarkConfiguration::BufferUpload { bytes: 1024 }
}

#[test]
fn test_series_has_exactly_iterations_samples() {
    let mut ctx = HostContext::new();
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(7, 3), ManualClock::stepping(1.0));
    let series = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap();
    assert_eq!(series.len(), 7);
    assert!(series.iter().all(|s| s == 1.0));
    // warmup trials ran too, each with its own buffer
    assert_eq!(ctx.stats().buffers_created, 10);
    assert_eq!(ctx.stats().uploads, 10);
}

#[test]
fn test_each_trial_uses_a_fresh_buffer_and_releases_it() {
    let mut ctx = HostContext::new();
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(4, 0), ManualClock::stepping(0.5));
    runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap();
    assert_eq!(ctx.stats().buffers_created, 4);
    assert_eq!(ctx.stats().buffers_deleted, 4);
    assert_eq!(ctx.live_buffers(), 0);
    assert_eq!(ctx.stats().bytes_uploaded, 4 * 1024);
}

#[test]
fn test_series_preserves_execution_order() {
    let mut ctx = HostContext::new();
    let clock = ManualClock::scripted([0.0, 3.0, 3.0, 4.0, 4.0, 9.0], 1.0);
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(3, 0), clock);
    let mut observer = RecordingObserver::default();
    let series = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut observer,
        )
        .unwrap();
    assert_eq!(series.as_slice(), &[3.0, 1.0, 5.0]);
    let indices: Vec<usize> = observer
        .events
        .iter()
        .filter_map(|e| match e {
            ObservedEvent::Sample(_, index, _) => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_warmup_phase_is_entered_even_when_empty() {
    let mut ctx = HostContext::new();
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(1, 0), ManualClock::stepping(1.0));
    let mut observer = RecordingObserver::default();
    let config = small_buffer();
    runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &config,
            &mut observer,
        )
        .unwrap();
    assert_eq!(
        observer.phases_for(&config),
        vec![RunPhase::Warmup, RunPhase::Measuring]
    );
}

#[test]
fn test_negative_sample_fails_with_measurement_error() {
    let mut ctx = HostContext::new();
    let clock = ManualClock::scripted([0.0, 1.0, 10.0, 12.0, 20.0, 19.0], 1.0);
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(3, 1), clock);
    let err = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert_eq!(err.phase, RunPhase::Measuring);
    assert_eq!(err.trial, Some(1));
    assert!(matches!(err.source, BenchError::Measurement(_)));
}

#[test]
fn test_nan_timer_fails_during_warmup() {
    let mut ctx = HostContext::new();
    let clock = || f64::NAN;
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(3, 2), clock);
    let err = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert_eq!(err.phase, RunPhase::Warmup);
    assert_eq!(err.trial, Some(0));
    assert!(matches!(err.source, BenchError::Measurement(_)));
}

#[test]
fn test_warmup_failure_aborts_the_run() {
    let mut ctx = HostContext::new();
    ctx.faults_mut().configure_after(FaultPoint::UploadData, 1, 1);
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(5, 3), ManualClock::stepping(1.0));
    let err = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert_eq!(err.phase, RunPhase::Warmup);
    assert_eq!(err.trial, Some(1));
    assert!(matches!(err.source, BenchError::ResourceCreation(_)));
    assert_eq!(ctx.stats().uploads, 1);
    assert!(err.to_string().contains("warmup failed at trial 2"));
}

#[test]
fn test_slow_trial_exceeding_timeout_fails() {
    let mut ctx = HostContext::new();
    let clock = ManualClock::scripted([0.0, 1.0, 1.0, 11.0], 1.0);
    let config = RunConfig::new(2, 0).with_trial_timeout(Duration::from_millis(5));
    let mut runner = BenchmarkRunner::with_clock(config, clock);
    let err = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert_eq!(err.trial, Some(1));
    assert!(matches!(err.source, BenchError::Timeout(_)));
}

#[test]
fn test_zero_iterations_is_rejected_before_any_work() {
    let mut ctx = HostContext::new();
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(0, 2), ManualClock::stepping(1.0));
    let err = runner
        .run(
            &mut ctx,
            &mut BufferUploadBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert_eq!(err.phase, RunPhase::Idle);
    assert!(matches!(err.source, BenchError::InvalidInput(_)));
    assert_eq!(ctx.stats().buffers_created, 0);
}

#[test]
fn test_configuration_of_the_wrong_kind_is_rejected() {
    let mut ctx = HostContext::new();
    let mut runner = BenchmarkRunner::with_clock(RunConfig::new(1, 0), ManualClock::stepping(1.0));
    let err = runner
        .run(
            &mut ctx,
            &mut DrawCallBenchmark::default(),
            &small_buffer(),
            &mut NoopObserver,
        )
        .unwrap_err();
    assert!(matches!(err.source, BenchError::InvalidInput(_)));
    assert_eq!(ctx.stats().programs_linked, 0);
}
