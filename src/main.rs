// src/main.rs
use anyhow::Result;
use clap::Parser;
use health_probe::cli::Cli;
use health_probe::health::{Expectation, HealthChecker};
use health_probe::metrics;
use std::process::ExitCode;
use tracing::{info, warn};

/// sysexits EX_CONFIG: the probe never ran.
const EXIT_CONFIG: u8 = 78;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Malformed flags are configuration errors, not clap's usage code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_directive().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(cli: &Cli) -> Result<u8> {
    let config = cli.resolve_config()?;
    let checker = HealthChecker::new(&config.target, Expectation::from(config.expect.clone()))?;

    info!("Checking {} (timeout {}s)", checker.endpoint(), config.target.timeout_secs);
    let report = checker.run().await;

    if let Some(path) = &config.output.metrics_file {
        if let Err(e) = metrics::write_textfile(path, &report) {
            warn!("Failed to write probe metrics: {:#}", e);
        }
    }

    println!("{}", report.render(config.output.format)?);
    Ok(report.exit_code())
}
