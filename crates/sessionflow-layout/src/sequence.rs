//! Session partitioning and run-length collapse.
//!
//! Events are grouped by session id (in order of first appearance), ordered
//! by timestamp within each session, and reduced to the sequence of distinct
//! consecutive event types. A session only contributes to the flow when its
//! collapsed sequence holds at least two entries: the diagram shows
//! transitions, not dwell time.

use rustc_hash::FxHashMap;

use crate::event::Event;

/// Minimum collapsed length for a session to be retained.
pub const MIN_SEQUENCE_LEN: usize = 2;

/// The collapsed type sequence of one retained session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSequence<'a> {
    /// Session identifier shared by every event of the sequence.
    pub session_id: &'a str,
    /// Event types with consecutive duplicates removed.
    pub kinds: Vec<&'a str>,
}

impl SessionSequence<'_> {
    /// Number of positions in the collapsed sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if the sequence holds no positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Adjacent `(source, target)` pairs in sequence order.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.kinds.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

/// All retained session sequences of one event batch, plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SessionSequences<'a> {
    sequences: Vec<SessionSequence<'a>>,
    sessions_considered: usize,
    sessions_discarded: usize,
    events_considered: usize,
}

impl<'a> SessionSequences<'a> {
    /// Retained sequences in order of first session appearance.
    #[inline]
    pub fn sequences(&self) -> &[SessionSequence<'a>] {
        &self.sequences
    }

    /// Number of distinct session ids seen in the batch.
    #[inline]
    pub fn sessions_considered(&self) -> usize {
        self.sessions_considered
    }

    /// Number of sessions whose collapsed sequence was too short.
    #[inline]
    pub fn sessions_discarded(&self) -> usize {
        self.sessions_discarded
    }

    /// Number of raw events in the batch.
    #[inline]
    pub fn events_considered(&self) -> usize {
        self.events_considered
    }

    /// Returns true if no session survived the collapse filter.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Partition `events` by session, order each session by timestamp and
/// collapse consecutive duplicate types.
///
/// Both the partitioning and the per-session sort are stable: sessions keep
/// the order in which their id first appears, and events sharing a timestamp
/// keep their input order.
pub fn collapse_sessions(events: &[Event]) -> SessionSequences<'_> {
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut partitions: Vec<(&str, Vec<&Event>)> = Vec::new();

    for event in events {
        let slot = *slots.entry(event.session_id.as_str()).or_insert_with(|| {
            partitions.push((event.session_id.as_str(), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(event);
    }

    let sessions_considered = partitions.len();
    let mut sequences = Vec::with_capacity(partitions.len());
    let mut sessions_discarded = 0;

    for (session_id, mut batch) in partitions {
        batch.sort_by_key(|event| event.timestamp);
        let kinds = collapse_runs(batch.iter().map(|event| event.kind.as_str()));
        if kinds.len() < MIN_SEQUENCE_LEN {
            sessions_discarded += 1;
            continue;
        }
        sequences.push(SessionSequence { session_id, kinds });
    }

    SessionSequences {
        sequences,
        sessions_considered,
        sessions_discarded,
        events_considered: events.len(),
    }
}

/// Drop every item equal to the one emitted just before it.
pub fn collapse_runs<'a>(kinds: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&'a str> = Vec::new();
    for kind in kinds {
        if out.last() != Some(&kind) {
            out.push(kind);
        }
    }
    out
}
