//! Monitoring plugin for the DSL link of Speedport-class home routers.
//!
//! Fetches the router's encrypted `Status.json`, checks link state and sync
//! rates against the configured thresholds, and reports the result in the
//! monitoring-plugin convention: exactly one line on stdout and the matching
//! exit code (OK 0, WARNING 1, CRITICAL 2, UNKNOWN 3). Diagnostics go to
//! stderr and are controlled with `RUST_LOG`-style filter directives.

#![deny(warnings)]
#![deny(missing_docs)]

use std::process::ExitCode;

use clap::Parser as _;
use speedport_client::DeviceClient;
use tracing::debug;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod check;
mod cli;
mod output;

use self::check::Severity;
use self::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr: stdout belongs to the plugin line and must
    // hold exactly one line per invocation.
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (severity, line) = run(&cli).await;
    println!("{}", line);

    ExitCode::from(severity.exit_code())
}

/// Runs the check and renders its outcome.
///
/// Every failure folds into the UNKNOWN outcome, keeping
/// could-not-determine-status distinct from the known-bad WARNING/CRITICAL
/// states and upholding the output contract even when the device is
/// unreachable.
async fn run(cli: &Cli) -> (Severity, String) {
    let client = match DeviceClient::new(cli.client_config()) {
        Ok(client) => client,
        Err(e) => return (Severity::Unknown, output::render_unknown_line(&e)),
    };

    debug!(url = client.url(), "Checking device status.");

    match client.fetch_status().await {
        Ok(status) => {
            let severity = check::evaluate(&status, &cli.thresholds());
            debug!(
                severity = severity.as_str(),
                link_status = %status.link_status,
                firmware = %status.firmware_version,
                "Evaluation complete."
            );
            (severity, output::render_status_line(severity, &status))
        }
        Err(e) => (Severity::Unknown, output::render_unknown_line(&e)),
    }
}
