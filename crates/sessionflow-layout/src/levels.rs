//! Discrete horizontal level assignment.
//!
//! The level count is the number of distinct types clamped into the
//! configured bounds. Each type lands on `round(mean_position * (L - 1))`,
//! except the configured start type (always level 0) and end type (always
//! the last level). The end override is applied after the start override.
//!
//! A type that appears both early and late in different sessions averages
//! to a middle level.

use rustc_hash::FxHashMap;

use crate::config::LayoutConfig;
use crate::stats::FlowStats;

/// Level of every type plus the per-level node order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelAssignment<'a> {
    level_count: usize,
    levels: Vec<Vec<&'a str>>,
    level_of: FxHashMap<&'a str, usize>,
}

impl<'a> LevelAssignment<'a> {
    /// Number of horizontal levels.
    #[inline]
    pub fn level_count(&self) -> usize {
        self.level_count
    }

    /// Types on each level, ordered by descending total (first-seen on ties).
    #[inline]
    pub fn levels(&self) -> &[Vec<&'a str>] {
        &self.levels
    }

    /// Level assigned to `kind`.
    #[inline]
    pub fn level_of(&self, kind: &str) -> Option<usize> {
        self.level_of.get(kind).copied()
    }
}

/// Assign a level to every type in `stats`.
pub fn assign_levels<'a>(stats: &FlowStats<'a>, config: &LayoutConfig) -> LevelAssignment<'a> {
    let level_count = config
        .level_bounds
        .level_count(stats.distinct_kinds())
        .max(1);
    let last = level_count - 1;

    let mut levels: Vec<Vec<&'a str>> = vec![Vec::new(); level_count];
    let mut level_of = FxHashMap::default();

    for (&kind, kind_stats) in stats.kinds().iter().zip(stats.all_kind_stats()) {
        let level = if config.end_type.as_deref() == Some(kind) {
            last
        } else if config.start_type.as_deref() == Some(kind) {
            0
        } else {
            discretize(kind_stats.mean_position(), level_count)
        };
        levels[level].push(kind);
        level_of.insert(kind, level);
    }

    // Stable: equal totals keep first-seen order.
    for level in &mut levels {
        level.sort_by(|a, b| stats.total(b).cmp(&stats.total(a)));
    }

    LevelAssignment {
        level_count,
        levels,
        level_of,
    }
}

/// Map a mean position in `[0, 1]` onto one of `level_count` levels.
#[inline]
pub fn discretize(mean_position: f64, level_count: usize) -> usize {
    let last = level_count.saturating_sub(1);
    let scaled = (mean_position * last as f64).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::sequence::collapse_sessions;

    fn batch(sessions: &[(&str, &[&str])]) -> Vec<Event> {
        sessions
            .iter()
            .flat_map(|(session, kinds)| {
                kinds
                    .iter()
                    .enumerate()
                    .map(move |(i, kind)| Event::new(*kind, *session, i as i64))
            })
            .collect()
    }

    #[test]
    fn discretize_rounds_to_nearest_level() {
        assert_eq!(discretize(0.0, 4), 0);
        assert_eq!(discretize(1.0, 4), 3);
        assert_eq!(discretize(0.5, 4), 2); // 1.5 rounds up
        assert_eq!(discretize(0.49, 4), 1);
        assert_eq!(discretize(0.5, 1), 0);
    }

    #[test]
    fn level_count_is_clamped_distinct_count() {
        let events = batch(&[("s1", &["a", "b"])]);
        let seqs = collapse_sessions(&events);
        let stats = FlowStats::aggregate(&seqs);
        let levels = assign_levels(&stats, &LayoutConfig::default());
        assert_eq!(levels.level_count(), 2);

        let kinds: Vec<String> = (0..10).map(|i| format!("k{i}")).collect();
        let refs: Vec<&str> = kinds.iter().map(String::as_str).collect();
        let events = batch(&[("s1", &refs)]);
        let seqs = collapse_sessions(&events);
        let stats = FlowStats::aggregate(&seqs);
        let levels = assign_levels(&stats, &LayoutConfig::default());
        assert_eq!(levels.level_count(), 7);
        assert_eq!(levels.level_of("k0"), Some(0));
        assert_eq!(levels.level_of("k9"), Some(6));
    }

    #[test]
    fn boundary_types_are_forced() {
        // "session_start" averages to the middle, "session_end" to the start.
        let events = batch(&[
            ("s1", &["a", "session_start", "b"]),
            ("s2", &["session_end", "c", "d"]),
        ]);
        let seqs = collapse_sessions(&events);
        let stats = FlowStats::aggregate(&seqs);
        let levels = assign_levels(&stats, &LayoutConfig::default());
        assert_eq!(levels.level_of("session_start"), Some(0));
        assert_eq!(
            levels.level_of("session_end"),
            Some(levels.level_count() - 1)
        );
    }

    #[test]
    fn unset_boundary_types_use_mean_position() {
        let events = batch(&[("s1", &["a", "session_start", "b"])]);
        let seqs = collapse_sessions(&events);
        let stats = FlowStats::aggregate(&seqs);
        let config = LayoutConfig::default().start_type(None);
        let levels = assign_levels(&stats, &config);
        assert_eq!(levels.level_count(), 3);
        assert_eq!(levels.level_of("session_start"), Some(1));
    }

    #[test]
    fn levels_are_ordered_by_descending_total_then_first_seen() {
        let events = batch(&[
            ("s1", &["start", "x"]),
            ("s2", &["start", "y"]),
            ("s3", &["start", "y"]),
            ("s4", &["start", "z"]),
        ]);
        let seqs = collapse_sessions(&events);
        let stats = FlowStats::aggregate(&seqs);
        let levels = assign_levels(&stats, &LayoutConfig::default());
        // 4 distinct types, x/y/z all sit at position 1.0.
        let last = &levels.levels()[levels.level_count() - 1];
        assert_eq!(last, &vec!["y", "x", "z"]);
    }
}
