use gpubench::{
    BenchError, BenchmarkConfiguration, BufferTarget, BufferUploadBenchmark, DrawCallBenchmark,
    FailurePolicy, GraphicsContext, HostContext, ManualClock, NoopObserver, RunConfig, RunPhase,
    ShaderSources, SweepController, UploadBarrier, fault_injection::FaultPoint,
};

fn sweep(iterations: usize, warmup: usize) -> SweepController<ManualClock> {
    SweepController::with_clock(
        RunConfig::new(iterations, warmup),
        FailurePolicy::Abort,
        ManualClock::stepping(2.0),
    )
}

#[test]
fn test_draw_trials_submit_whole_batches_and_wait_for_them() {
    let mut ctx = HostContext::new();
    let config = BenchmarkConfiguration::draw_calls(50);
    let report = sweep(4, 1)
        .run_sweep(
            &mut ctx,
            &mut DrawCallBenchmark::default(),
            &[config],
            &mut NoopObserver,
        )
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.results.get(&config).unwrap().mean, 2.0);
    let stats = ctx.stats();
    assert_eq!(stats.draws_submitted, 5 * 50);
    assert_eq!(stats.draws_retired, 5 * 50);
    assert_eq!(stats.idle_waits, 5);
    assert_eq!(ctx.pending_draws(), 0);
    assert!(stats.vertex_checksum < 0.0);
}

#[test]
fn test_program_is_compiled_once_and_rebound_after_each_reset() {
    let mut ctx = HostContext::new();
    let mut bench = DrawCallBenchmark::default();
    let configs = [
        BenchmarkConfiguration::draw_calls(10),
        BenchmarkConfiguration::draw_calls(20),
    ];
    let report = sweep(2, 0)
        .run_sweep(&mut ctx, &mut bench, &configs, &mut NoopObserver)
        .unwrap();
    assert_eq!(report.results.len(), 2);
    assert_eq!(ctx.stats().programs_linked, 1);
    assert!(bench.program().is_some());
    assert_eq!(ctx.stats().draws_submitted, 2 * 10 + 2 * 20);
    // the final reset leaves nothing bound
    assert_eq!(ctx.current_program(), None);
    assert_eq!(ctx.bound_buffer(BufferTarget::Array), None);
}

#[test]
fn test_broken_shader_fails_configuration_setup() {
    let mut ctx = HostContext::new();
    let sources = ShaderSources {
        vertex: String::new(),
        ..ShaderSources::default()
    };
    let config = BenchmarkConfiguration::draw_calls(10);
    let report = sweep(2, 0)
        .run_sweep(
            &mut ctx,
            &mut DrawCallBenchmark::new(sources),
            &[config],
            &mut NoopObserver,
        )
        .unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.failures[0].phase, RunPhase::Idle);
    assert!(matches!(
        report.failures[0].error,
        BenchError::ResourceCreation(_)
    ));
    assert_eq!(ctx.stats().draws_submitted, 0);
}

#[test]
fn test_link_failure_is_a_resource_error() {
    let mut ctx = HostContext::new();
    ctx.faults_mut().configure(FaultPoint::LinkProgram, 1);
    let mut bench = DrawCallBenchmark::default();
    let report = sweep(1, 0)
        .run_sweep(
            &mut ctx,
            &mut bench,
            &[BenchmarkConfiguration::draw_calls(5)],
            &mut NoopObserver,
        )
        .unwrap();
    assert!(matches!(
        report.failures[0].error,
        BenchError::ResourceCreation(_)
    ));
    assert!(bench.program().is_none());
}

#[test]
fn test_zero_call_batch_is_rejected() {
    let mut ctx = HostContext::new();
    let report = sweep(1, 0)
        .run_sweep(
            &mut ctx,
            &mut DrawCallBenchmark::default(),
            &[BenchmarkConfiguration::draw_calls(0)],
            &mut NoopObserver,
        )
        .unwrap();
    assert!(matches!(
        report.failures[0].error,
        BenchError::InvalidInput(_)
    ));
}

#[test]
fn test_upload_barrier_choice_is_applied_to_every_trial() {
    let configs = [
        BenchmarkConfiguration::BufferUpload { bytes: 128 },
        BenchmarkConfiguration::BufferUpload { bytes: 256 },
    ];

    let mut ctx = HostContext::new();
    let mut bench = BufferUploadBenchmark::new(UploadBarrier::None);
    sweep(3, 1)
        .run_sweep(&mut ctx, &mut bench, &configs, &mut NoopObserver)
        .unwrap();
    assert_eq!(ctx.stats().idle_waits, 0);
    assert_eq!(ctx.stats().uploads, 8);

    let mut ctx = HostContext::new();
    let mut bench = BufferUploadBenchmark::new(UploadBarrier::AwaitIdle);
    sweep(3, 1)
        .run_sweep(&mut ctx, &mut bench, &configs, &mut NoopObserver)
        .unwrap();
    assert_eq!(ctx.stats().idle_waits, 8);
}

#[test]
fn test_host_context_rejects_draws_without_a_program() {
    let mut ctx = HostContext::new();
    let err = ctx
        .draw_batch(gpubench::PrimitiveKind::Triangles, 3)
        .unwrap_err();
    assert!(matches!(err, BenchError::InvalidOperation(_)));
}

#[test]
fn test_host_context_handles_are_never_reused() {
    let mut ctx = HostContext::new();
    let a = ctx.create_buffer().unwrap();
    ctx.delete_buffer(a).unwrap();
    let b = ctx.create_buffer().unwrap();
    assert_ne!(a, b);
    ctx.reset_state().unwrap();
    let c = ctx.create_buffer().unwrap();
    assert!(c > b);
    assert!(matches!(
        ctx.bind_buffer(BufferTarget::Array, Some(b)),
        Err(BenchError::InvalidOperation(_))
    ));
}

#[test]
fn test_host_context_refuses_impossible_options() {
    let err = HostContext::open(gpubench::HostContextOptions {
        max_buffer_bytes: 0,
    })
    .err()
    .unwrap();
    assert!(matches!(err, BenchError::ContextUnavailable(_)));
}
