//! Vitrine - signage player controller
//!
//! `vitrine serve` runs the long-lived controller; every other subcommand is
//! a one-shot operation that prints its outcome and exits non-zero on failure.

use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, info, span};
use vitrine::{
    cli::{Cli, CliService, Commands, formatting::format_error},
    tracing_config,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let service = match CliService::load(cli.config.as_deref()) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("{}", format_error(&err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let log_level = service.config().general.log_level;
    let tracing = if matches!(cli.command, Commands::Serve) {
        tracing_config::init_with_file(log_level)
    } else {
        tracing_config::init(log_level)
    };
    if let Err(err) = tracing {
        eprintln!("{}", format_error(&format!("Logging unavailable: {err}")));
    }

    let _span = span!(Level::INFO, "vitrine").entered();
    if matches!(cli.command, Commands::Serve) {
        info!(version = env!("CARGO_PKG_VERSION"), "Starting player controller");
    }

    match service.execute(cli.command).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", format_error(&err.to_string()));
            ExitCode::FAILURE
        }
    }
}
