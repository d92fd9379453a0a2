use std::io;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use keeval_store::{ConfigStore, S3Backend};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod settings;

use settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let settings = Settings::from_cli(&cli)?;
    let mode = cli.mode()?;

    let backend = S3Backend::connect(
        &settings.store.bucket,
        &settings.credentials,
        settings.endpoint_url.as_deref(),
    )
    .await;
    let store = ConfigStore::new(backend, settings.store)?;

    commands::run_command(cli.action, &mode, &store, io::stdin().lock(), io::stdout().lock())
        .await?;
    Ok(())
}

/// Filter used when `RUST_LOG` is unset. The store's `info!` bulk-read
/// line only shows with `-v`.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "keeval=debug,keeval_store=debug"
    } else {
        "warn"
    }
}

/// Logs go to stderr; stdout carries only result payloads.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
