//! wsi-inspect - print the pyramid layout and metadata of a Whole Slide Image.
//!
//! The report goes to stdout; logs and diagnostics go to stderr.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wsi_inspect::{inspect, Config, TiffBackend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!(path = %config.path.display(), "Starting inspection");

    let backend = TiffBackend::new();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match inspect(&backend, &config.path, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Keep already printed lines ahead of the diagnostic
            if let Err(flush_err) = out.flush() {
                error!("Failed to flush report: {}", flush_err);
            }
            error!(path = %config.path.display(), "Inspection failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs are written to stderr so stdout carries only the report.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "wsi_inspect=debug"
    } else {
        "wsi_inspect=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
