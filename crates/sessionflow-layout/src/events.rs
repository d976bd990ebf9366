//! Loading event batches from telemetry exports.
//!
//! Three shapes are accepted:
//! - a JSON array of events,
//! - an object with an `events` array,
//! - JSON Lines, one event object per line (blank lines are skipped).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::event::Event;

/// Errors raised while loading an event batch.
#[derive(Debug, Error)]
pub enum EventLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid event JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct EventBatch {
    events: Vec<Event>,
}

/// Parse an event batch from text.
pub fn parse_events(text: &str) -> Result<Vec<Event>, EventLoadError> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(text).map_err(|source| EventLoadError::Json {
            line: source.line(),
            source,
        });
    }
    match serde_json::from_str::<EventBatch>(text) {
        Ok(batch) => return Ok(batch.events),
        Err(source) if is_wrapped_batch(text) => {
            return Err(EventLoadError::Json {
                line: source.line(),
                source,
            });
        }
        Err(_) => {}
    }
    parse_json_lines(text)
}

/// A single JSON object carrying an `events` key.
fn is_wrapped_batch(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .is_ok_and(|value| value.get("events").is_some())
}

/// Parse JSON Lines, reporting 1-based line numbers on failure.
pub fn parse_json_lines(text: &str) -> Result<Vec<Event>, EventLoadError> {
    let mut events = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| EventLoadError::Json {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Read and parse an event batch from disk.
pub fn load_events(path: impl AsRef<Path>) -> Result<Vec<Event>, EventLoadError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let events = parse_events(&text)?;
    tracing::debug!(path = %path.as_ref().display(), events = events.len(), "event batch loaded");
    Ok(events)
}
