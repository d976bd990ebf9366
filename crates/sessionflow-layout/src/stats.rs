//! Aggregation of collapsed session sequences.
//!
//! For every retained sequence of length `n`, position `i` contributes:
//! - one occurrence to the total of its type,
//! - the fractional position `i / (n - 1)` to the mean position of its type,
//! - one traversal to the `(type(i), type(i + 1))` transition when `i < n - 1`.
//!
//! Types and transitions are kept in first-seen order so that every later
//! tie-break is deterministic.

use rustc_hash::FxHashMap;

use crate::sequence::SessionSequences;

/// Aggregated counters for one event type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    /// Number of collapsed-sequence positions carrying this type.
    pub total: u64,
    /// Sum of fractional positions over all occurrences.
    pub position_sum: f64,
}

impl KindStats {
    /// Arithmetic mean of the recorded fractional positions.
    #[inline]
    pub fn mean_position(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.position_sum / self.total as f64
        }
    }
}

/// One observed ordered pair of adjacent types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<'a> {
    pub source: &'a str,
    pub target: &'a str,
    /// Number of adjacent occurrences across all sequences.
    pub count: u64,
}

/// Node totals, mean positions and transition counts of one batch.
#[derive(Debug, Clone, Default)]
pub struct FlowStats<'a> {
    kinds: Vec<&'a str>,
    kind_stats: Vec<KindStats>,
    kind_index: FxHashMap<&'a str, usize>,
    transitions: Vec<Transition<'a>>,
    transition_index: FxHashMap<(&'a str, &'a str), usize>,
}

impl<'a> FlowStats<'a> {
    /// Aggregate every retained sequence.
    pub fn aggregate(sequences: &SessionSequences<'a>) -> Self {
        let mut stats = Self::default();
        for sequence in sequences.sequences() {
            let n = sequence.len();
            for (i, &kind) in sequence.kinds.iter().enumerate() {
                stats.record_position(kind, fractional_position(i, n));
                if let Some(&next) = sequence.kinds.get(i + 1) {
                    stats.record_transition(kind, next);
                }
            }
        }
        stats
    }

    fn record_position(&mut self, kind: &'a str, position: f64) {
        let slot = match self.kind_index.get(kind) {
            Some(&slot) => slot,
            None => {
                let slot = self.kinds.len();
                self.kinds.push(kind);
                self.kind_stats.push(KindStats {
                    total: 0,
                    position_sum: 0.0,
                });
                self.kind_index.insert(kind, slot);
                slot
            }
        };
        let entry = &mut self.kind_stats[slot];
        entry.total += 1;
        entry.position_sum += position;
    }

    fn record_transition(&mut self, source: &'a str, target: &'a str) {
        match self.transition_index.get(&(source, target)) {
            Some(&slot) => self.transitions[slot].count += 1,
            None => {
                self.transition_index
                    .insert((source, target), self.transitions.len());
                self.transitions.push(Transition {
                    source,
                    target,
                    count: 1,
                });
            }
        }
    }

    /// Distinct types in first-seen order.
    #[inline]
    pub fn kinds(&self) -> &[&'a str] {
        &self.kinds
    }

    /// Number of distinct types.
    #[inline]
    pub fn distinct_kinds(&self) -> usize {
        self.kinds.len()
    }

    /// First-seen rank of `kind`, if it occurs.
    #[inline]
    pub fn index_of(&self, kind: &str) -> Option<usize> {
        self.kind_index.get(kind).copied()
    }

    /// Counters for `kind`, if it occurs.
    pub fn kind_stats(&self, kind: &str) -> Option<&KindStats> {
        self.index_of(kind).map(|slot| &self.kind_stats[slot])
    }

    /// Counters in the same order as [`FlowStats::kinds`].
    #[inline]
    pub fn all_kind_stats(&self) -> &[KindStats] {
        &self.kind_stats
    }

    /// Total occurrences of `kind` (0 when absent).
    pub fn total(&self, kind: &str) -> u64 {
        self.kind_stats(kind).map_or(0, |s| s.total)
    }

    /// Transitions in first-seen order.
    #[inline]
    pub fn transitions(&self) -> &[Transition<'a>] {
        &self.transitions
    }

    /// Traversal count of `source -> target` (0 when never observed).
    pub fn transition_count(&self, source: &str, target: &str) -> u64 {
        self.transitions
            .iter()
            .find(|t| t.source == source && t.target == target)
            .map_or(0, |t| t.count)
    }
}

/// Fractional position of index `i` in a sequence of length `n`.
///
/// `0.0` is the first position and `1.0` the last. A single-element sequence
/// sits in the middle.
#[inline]
pub fn fractional_position(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        i as f64 / (n - 1) as f64
    }
}
