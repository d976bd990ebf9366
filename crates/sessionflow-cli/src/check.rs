use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use sessionflow_layout::{Event, FlowOutcome, LayoutConfig, compute_flow_layout};

use crate::error::{CliError, EXIT_INSUFFICIENT_DATA, EXIT_VIOLATIONS, Result};
use crate::input::{load_batch, load_config, write_output};

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub events: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Include the per-level report in the output.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckSummary {
    pub text: String,
    pub violations: usize,
    pub overflows: usize,
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let events = load_batch(&args.events)?;
    let summary = check_layout(&events, &config, args.report)?;
    write_output(None, &summary.text)?;

    if summary.violations > 0 {
        return Err(CliError::exit(
            EXIT_VIOLATIONS,
            format!("{} layout invariant violations", summary.violations),
        ));
    }
    Ok(())
}

/// Lay out `events` and describe every broken invariant and overflowing band stack.
///
/// Overflow is informational and never fails the check.
pub fn check_layout(events: &[Event], config: &LayoutConfig, report: bool) -> Result<CheckSummary> {
    let layout = match compute_flow_layout(events, config) {
        FlowOutcome::Ready(layout) => layout,
        FlowOutcome::InsufficientData(summary) => {
            return Err(CliError::exit(
                EXIT_INSUFFICIENT_DATA,
                format!(
                    "insufficient data: {} sessions considered, none with a transition",
                    summary.sessions_considered
                ),
            ));
        }
    };

    let violations = layout.check_invariants(config);
    let overflows = layout.overflowing_nodes();
    let mut text = String::new();

    if report {
        text.push_str(&layout.report(config));
        text.push('\n');
    }
    let _ = writeln!(
        text,
        "{} nodes, {} links, {} levels",
        layout.nodes.len(),
        layout.links.len(),
        layout.level_count
    );
    if violations.is_empty() {
        text.push_str("invariants: ok\n");
    } else {
        let _ = writeln!(text, "invariants: {} violated", violations.len());
        for violation in &violations {
            tracing::warn!(%violation, "layout invariant violated");
            let _ = writeln!(text, "  - {violation}");
        }
    }
    for overflow in &overflows {
        let _ = writeln!(
            text,
            "overflow: {} {} bands exceed node by {:.2}",
            overflow.id, overflow.side, overflow.overflow
        );
    }

    Ok(CheckSummary {
        text,
        violations: violations.len(),
        overflows: overflows.len(),
    })
}
