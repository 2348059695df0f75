mod bind;
mod harness;
mod model;

use std::process::ExitCode;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use harness::{Harness, HarnessError};
use harness::console::{Console, Palette};
use model::config::AppConfig;

const FALLBACK_LOG_FILTER: &str = "sbind=info";

fn main() -> Result<ExitCode> {
    let config = AppConfig::load()?;

    // Logging goes to a file; stdout belongs to the self-test output.
    let _guard = init_logging(&config);

    tracing::info!("sbind self-test starting");

    let palette = Palette::resolve(config.output.color);
    tracing::debug!("color output: {}", palette.colored());

    let console = Console::stdout(palette);
    let harness = Harness::new(console);

    let result = harness.run();
    if let Err(err) = harness.report(&result) {
        let err = HarnessError::from(err);
        tracing::error!("{err}");
        eprintln!("sbind: {err}");
        return Ok(err.exit_code());
    }

    Ok(match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => err.exit_code(),
    })
}

fn init_logging(config: &AppConfig) -> Option<WorkerGuard> {
    let log_dir = config.log_dir();
    if let Err(err) = std::fs::create_dir_all(&log_dir) {
        eprintln!(
            "sbind: logging disabled, cannot create {}: {err}",
            log_dir.display()
        );
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| configured_filter(&config.logging.filter));

    let file_appender = tracing_appender::rolling::daily(&log_dir, "sbind.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Some(guard)
}

fn configured_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!(
            "sbind: invalid logging.filter {directive:?}: {err}; using {FALLBACK_LOG_FILTER}"
        );
        EnvFilter::new(FALLBACK_LOG_FILTER)
    })
}
