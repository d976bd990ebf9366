use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::input::{load_config, write_output};

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Config file to validate. Defaults are printed when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    let text = effective_config(&args)?;
    write_output(None, &text)
}

/// The validated config as TOML.
pub fn effective_config(args: &ConfigArgs) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    Ok(config.to_toml_string()?)
}
