use std::process;

use gpubench::{
    HarnessConfig, HostContext, HostContextOptions, LogObserver,
    report::{render_suite, report_file_path, write_reports},
    run_suite,
};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            process::exit(2);
        }
    };
    let mut ctx = match HostContext::open(HostContextOptions::default()) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(%err, "could not open graphics context");
            process::exit(2);
        }
    };

    let report = match run_suite(&mut ctx, &config, &mut LogObserver) {
        Ok(report) => report,
        Err(err) => {
            error!(%err, "suite did not start");
            process::exit(2);
        }
    };
    println!("{}", render_suite(&report));

    let path = report_file_path();
    match write_reports(&report, &path) {
        Ok(paths) => info!(
            json = %paths.json.display(),
            summary = %paths.summary_csv.display(),
            samples = %paths.samples_csv.display(),
            "reports written"
        ),
        Err(err) => {
            error!(%err, "could not write reports");
            process::exit(1);
        }
    }
    if !report.is_complete() {
        process::exit(1);
    }
}
