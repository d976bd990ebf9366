use std::fs;
use std::io::Write;
use std::path::Path;

use sessionflow_layout::{Event, LayoutConfig, load_events};

use crate::error::Result;

/// Load and validate a layout config, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading layout config");
            LayoutConfig::from_file(path)?
        }
        None => LayoutConfig::default(),
    };
    Ok(config.validated()?)
}

pub fn load_batch(path: &Path) -> Result<Vec<Event>> {
    let events = load_events(path)?;
    tracing::info!(path = %path.display(), events = events.len(), "loaded event batch");
    Ok(events)
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
            tracing::info!(path = %path.display(), bytes = content.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::tempdir;

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None).expect("defaults are valid");
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "canvas_height = -5.0\n").expect("write config");

        let error = load_config(Some(&path)).expect_err("negative height should fail");
        assert!(matches!(error, CliError::Config(_)));
        assert!(error.to_string().contains("canvas_height"));
    }

    #[test]
    fn write_output_creates_parent_dirs() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/out/layout.json");
        write_output(Some(&path), "{}").expect("write");
        assert_eq!(fs::read_to_string(path).expect("read back"), "{}");
    }
}
