// src/main.rs

//! cfn-timings
//!
//! Entry point for the cfn-timings CLI.
//!
//! Reports how long each CloudFormation stack took to create and to update,
//! reconstructed from the stack's event history. All real work happens in
//! the `runner` module.
//!
//! Responsibilities of this file:
//! - Load `.env` and initialise logging
//! - Parse CLI arguments
//! - Initialise the async runtime
//! - Hand off execution to the runner

mod cfn;
mod cli;
mod config;
mod events_file;
mod render;
mod runner;
mod select;
mod timeline;
mod util;
mod validate;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Program entry point.
///
/// Uses Tokio because the AWS SDK is async.
#[tokio::main]
async fn main() -> Result<()> {
    // AWS_PROFILE / AWS_REGION may live in .env
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "cfn_timings=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    runner::run(cli).await
}
