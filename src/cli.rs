// src/cli.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputMode;
use crate::timeline::EventOrder;

/// CloudFormation stack timing report.
///
/// Reconstructs creation and update durations from each stack's event
/// history. `config.yaml` is optional; CLI flags override its values.
#[derive(Parser, Debug)]
#[command(name = "cfn-timings", version, disable_help_subcommand = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// All supported CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report timings for every stack in an account/region.
    Report {
        /// Path to config file
        ///
        /// Defaults to ./config.yaml; a missing default file is fine.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// AWS profile name
        #[arg(long)]
        profile: Option<String>,

        /// AWS region name
        #[arg(long)]
        region: Option<String>,

        /// Only report stacks whose name matches (regex, repeatable)
        #[arg(long = "stack")]
        stacks: Vec<String>,

        /// Record stacks with an unpairable event sequence as failed
        /// and keep going instead of stopping the run
        #[arg(long)]
        skip_invalid: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Parse a saved `describe-stack-events` JSON file.
    ///
    /// Example:
    /// aws cloudformation describe-stack-events --stack-name web > web.json
    /// cfn-timings parse web.json --stack web
    Parse {
        /// Saved event feed
        file: PathBuf,

        /// Stack name (the stack's own logical resource id)
        #[arg(long)]
        stack: String,

        /// Path to config file
        ///
        /// Defaults to ./config.yaml; a missing default file is fine.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Write a starter config.yaml (never overwrites).
    Init,
}

/// Flags shared by commands that produce a report.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// How to order events before pairing
    #[arg(long, value_enum)]
    pub order: Option<EventOrder>,

    /// Output mode
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,

    /// Output file (implies --output file)
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}
