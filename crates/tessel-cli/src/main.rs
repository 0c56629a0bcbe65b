#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;

use std::process;

use anyhow::Context;

use crate::config::{Cli, Command, Toolkit};

// Tracing target constants
pub const TRACING_TARGET_CLI: &str = "tessel_cli";
pub const TRACING_TARGET_CONFIG: &str = "tessel_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_CLI,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();

    let toolkit = Toolkit::load(&cli.toolkit)
        .with_context(|| format!("failed to load toolkit '{}'", cli.toolkit.display()))?;

    match &cli.command {
        Command::Tools => command::tools(&cli, toolkit).await,
        Command::Call(args) => command::call(&cli, toolkit, args).await,
        Command::Retrieve(args) => command::retrieve(&cli, toolkit, args).await,
    }
}
