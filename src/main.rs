#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use scriptpilot::Config;
use scriptpilot::app::dispatch::dispatch;
use scriptpilot::cli::commands::Cli;
use scriptpilot::ui::style as ui;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Exit code for config and environment failures.
const ENVIRONMENT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();

    // stdout is reserved for script output.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install logger: {e}");
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {e:#}", ui::failure("error:"));
            ExitCode::from(ENVIRONMENT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config = Config::load_or_init()?;
    dispatch(cli, config).await
}
