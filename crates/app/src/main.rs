//! bookcheck - Booking service contract verification
//!
//! Loads the suite configuration, runs the selected scenarios against the
//! service and prints a report. Exits with 0 when every scenario passed,
//! 1 when any failed and 2 when the suite could not be set up.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use bookcheck_application::ContractSuite;
use bookcheck_infrastructure::{ConfigLoader, ReqwestHttpClient, render_json, render_text};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, OutputFormat};

const EXIT_FAILED: u8 = 1;
const EXIT_SETUP: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match cli.resolve_config(&ConfigLoader::from_process_env()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::from(EXIT_SETUP);
        }
    };

    let client = match ReqwestHttpClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "failed to create HTTP client");
            return ExitCode::from(EXIT_SETUP);
        }
    };

    let suite = match ContractSuite::new(client, &config) {
        Ok(suite) => suite,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::from(EXIT_SETUP);
        }
    };

    tracing::info!(
        base_url = %config.base_url,
        "Starting bookcheck v{}",
        env!("CARGO_PKG_VERSION")
    );
    let report = suite.run().await;

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => match render_json(&report) {
            Ok(json) => print!("{json}"),
            Err(e) => {
                error!(error = %e, "failed to render report");
                return ExitCode::from(EXIT_FAILED);
            }
        },
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}
