use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sessionflow_layout::{Event, FlowOutcome, LayoutConfig, compute_flow_layout};

use crate::error::{CliError, EXIT_INSUFFICIENT_DATA, Result};
use crate::input::{load_batch, load_config, write_output};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The layout outcome as JSON.
    #[default]
    Json,
    /// A Graphviz digraph, one rank per level.
    Dot,
}

#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Event batch: JSON array, `{"events": [...]}` or JSON Lines.
    #[arg(long)]
    pub events: PathBuf,

    /// Layout config (TOML, or JSON with a `.json` extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Succeed and emit the insufficient-data outcome instead of failing.
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,
}

pub fn run_layout(args: LayoutArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let events = load_batch(&args.events)?;
    let rendered = render_layout(&events, &config, &args)?;
    write_output(args.output.as_deref(), &rendered)
}

/// Compute and render a layout without touching the filesystem.
pub fn render_layout(events: &[Event], config: &LayoutConfig, args: &LayoutArgs) -> Result<String> {
    let outcome = compute_flow_layout(events, config);

    if let FlowOutcome::InsufficientData(summary) = &outcome {
        tracing::warn!(
            events = summary.events_considered,
            sessions = summary.sessions_considered,
            "no session has a transition"
        );
        if !args.allow_empty {
            return Err(CliError::exit(
                EXIT_INSUFFICIENT_DATA,
                format!(
                    "insufficient data: {} sessions, none with a transition (pass --allow-empty to emit anyway)",
                    summary.sessions_considered
                ),
            ));
        }
    }

    let mut rendered = match args.format {
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(&outcome)?,
        OutputFormat::Json => serde_json::to_string(&outcome)?,
        OutputFormat::Dot => match outcome.layout() {
            Some(layout) => layout.export_dot(),
            None => "digraph SessionFlow {\n}\n".to_owned(),
        },
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}
