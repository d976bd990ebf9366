use clap::{ArgAction, Parser, Subcommand};

use crate::check::{CheckArgs, run_check};
use crate::config::{ConfigArgs, run_config};
use crate::error::Result;
use crate::layout::{LayoutArgs, run_layout};
use crate::logging::{LogSettings, init_logging};

#[derive(Debug, Parser)]
#[command(
    name = "sessionflow",
    about = "Lay out session interaction flows as Sankey diagrams",
    version
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `SESSIONFLOW_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute a flow layout from an event batch.
    Layout(LayoutArgs),

    /// Compute a layout and report invariant violations and band overflow.
    Check(CheckArgs),

    /// Validate and print the effective layout configuration.
    Config(ConfigArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogSettings {
        verbosity: cli.verbose,
        json: cli.log_json,
    });
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Layout(args) => run_layout(args),
        Commands::Check(args) => run_check(args),
        Commands::Config(args) => run_config(args),
    }
}
