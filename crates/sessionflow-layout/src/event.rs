#![forbid(unsafe_code)]

//! Interaction events consumed by the flow layout engine.

use serde::{Deserialize, Serialize};

/// One timestamped, session-tagged interaction event.
///
/// The wire names match the telemetry export (`type`, `sessionId`,
/// `timestamp`). Unknown fields are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Event kind label, e.g. `page_view` or `survey_submit`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque identifier grouping events of one continuous session.
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// Epoch milliseconds. Only used for ordering within a session.
    pub timestamp: i64,
}

impl Event {
    /// Create a new event.
    pub fn new(kind: impl Into<String>, session_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: kind.into(),
            session_id: session_id.into(),
            timestamp,
        }
    }
}
