#![forbid(unsafe_code)]

//! Flow layout debugging utilities.
//!
//! Provides introspection into a computed [`FlowLayout`]:
//! - Per-level band usage ([`LevelRecord`]) with overflow/underflow detection
//! - Invariant checks ([`FlowLayout::check_invariants`])
//! - Link band overflow past node edges ([`FlowLayout::overflowing_nodes`])
//! - Export to Graphviz DOT format
//!
//! # Usage
//!
//! ```ignore
//! use sessionflow_layout::{compute_flow_layout, LayoutConfig};
//!
//! let config = LayoutConfig::default();
//! if let Some(layout) = compute_flow_layout(&events, &config).layout() {
//!     for violation in layout.check_invariants(&config) {
//!         eprintln!("{violation}");
//!     }
//!     println!("{}", layout.report(&config));
//! }
//! ```

use std::fmt::{self, Write as _};

use crate::config::LayoutConfig;
use crate::layout::{FlowLayout, FlowNode};

const EPS: f64 = 1e-6;

/// Band usage of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
    pub level: usize,
    /// Node ids, top to bottom.
    pub nodes: Vec<String>,
    /// Height available for nodes and gaps.
    pub available_height: f64,
    /// Sum of node heights.
    pub node_height: f64,
    /// Gap between consecutive nodes.
    pub gap: f64,
}

impl LevelRecord {
    fn used(&self) -> f64 {
        let gaps = self.nodes.len().saturating_sub(1) as f64 * self.gap;
        self.node_height + gaps
    }

    /// Check if nodes and gaps exceed the available height.
    ///
    /// Happens when `min_node_height` lifts many small nodes.
    pub fn has_overflow(&self) -> bool {
        self.used() > self.available_height + EPS
    }

    /// Check if more than 20% of the available height is unused.
    pub fn has_underflow(&self) -> bool {
        self.available_height > 0.0
            && (self.available_height - self.used()) / self.available_height > 0.2
    }

    /// Percentage of available height used, clamped to 100.
    pub fn utilization(&self) -> f64 {
        if self.available_height <= 0.0 {
            return 0.0;
        }
        (self.used() / self.available_height).min(1.0) * 100.0
    }
}

/// Which side of a node a band stack belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSide {
    Outgoing,
    Incoming,
}

impl fmt::Display for BandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outgoing => f.write_str("outgoing"),
            Self::Incoming => f.write_str("incoming"),
        }
    }
}

/// Link bands extending past the bottom edge of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct BandOverflow {
    pub id: String,
    pub side: BandSide,
    /// Distance past `y + height`.
    pub overflow: f64,
}

/// A broken layout invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutViolation {
    /// A node is shorter than `min_node_height`.
    NodeBelowMinHeight { id: String, height: f64, min: f64 },
    /// The first node of a level does not start at the top padding.
    LevelStartMisplaced { level: usize, y: f64, expected: f64 },
    /// Two consecutive nodes of a level are not separated by exactly the gap.
    NodeSpacing {
        level: usize,
        upper: String,
        lower: String,
        spacing: f64,
        expected: f64,
    },
    /// Nodes of a level are not ordered by descending value.
    NodeOrder { level: usize, upper: String, lower: String },
    /// A node level is outside `0..level_count`.
    LevelOutOfRange { id: String, level: usize },
    /// A configured start or end type is not on its forced level.
    BoundaryNotForced { id: String, level: usize, expected: usize },
    /// A link's source and target bands differ in width.
    LinkWidthMismatch {
        source: String,
        target: String,
        source_width: f64,
        target_width: f64,
    },
    /// A link band is thinner than `min_link_width`.
    LinkBelowMinWidth {
        source: String,
        target: String,
        width: f64,
        min: f64,
    },
    /// A link refers to a node that is not in the layout.
    LinkMissingEndpoint { source: String, target: String },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeBelowMinHeight { id, height, min } => {
                write!(f, "node {id}: height {height:.3} below minimum {min:.3}")
            }
            Self::LevelStartMisplaced { level, y, expected } => {
                write!(f, "level {level}: first node at {y:.3}, expected {expected:.3}")
            }
            Self::NodeSpacing {
                level,
                upper,
                lower,
                spacing,
                expected,
            } => write!(
                f,
                "level {level}: {upper} -> {lower} spacing {spacing:.3}, expected {expected:.3}"
            ),
            Self::NodeOrder { level, upper, lower } => {
                write!(f, "level {level}: {upper} has a smaller value than {lower} below it")
            }
            Self::LevelOutOfRange { id, level } => {
                write!(f, "node {id}: level {level} out of range")
            }
            Self::BoundaryNotForced {
                id,
                level,
                expected,
            } => write!(f, "node {id}: level {level}, expected {expected}"),
            Self::LinkWidthMismatch {
                source,
                target,
                source_width,
                target_width,
            } => write!(
                f,
                "link {source} -> {target}: source width {source_width:.3} != target width {target_width:.3}"
            ),
            Self::LinkBelowMinWidth {
                source,
                target,
                width,
                min,
            } => write!(
                f,
                "link {source} -> {target}: width {width:.3} below minimum {min:.3}"
            ),
            Self::LinkMissingEndpoint { source, target } => {
                write!(f, "link {source} -> {target}: endpoint missing")
            }
        }
    }
}

impl FlowLayout {
    /// Band usage of every non-empty level.
    pub fn level_records(&self, config: &LayoutConfig) -> Vec<LevelRecord> {
        (0..self.level_count)
            .filter_map(|level| {
                let nodes: Vec<&FlowNode> = self.nodes_at_level(level).collect();
                if nodes.is_empty() {
                    return None;
                }
                Some(LevelRecord {
                    level,
                    nodes: nodes.iter().map(|n| n.id.clone()).collect(),
                    available_height: config.usable_height(),
                    node_height: nodes.iter().map(|n| n.height).sum(),
                    gap: config.inter_node_gap,
                })
            })
            .collect()
    }

    /// Check every structural invariant of the layout against `config`.
    ///
    /// An empty list means the layout is consistent.
    pub fn check_invariants(&self, config: &LayoutConfig) -> Vec<LayoutViolation> {
        let mut violations = Vec::new();
        let last = self.level_count.saturating_sub(1);

        for node in &self.nodes {
            if node.height + EPS < config.min_node_height {
                violations.push(LayoutViolation::NodeBelowMinHeight {
                    id: node.id.clone(),
                    height: node.height,
                    min: config.min_node_height,
                });
            }
            if node.level >= self.level_count {
                violations.push(LayoutViolation::LevelOutOfRange {
                    id: node.id.clone(),
                    level: node.level,
                });
            }
            let forced = if config.end_type.as_deref() == Some(node.id.as_str()) {
                Some(last)
            } else if config.start_type.as_deref() == Some(node.id.as_str()) {
                Some(0)
            } else {
                None
            };
            if let Some(expected) = forced
                && node.level != expected
            {
                violations.push(LayoutViolation::BoundaryNotForced {
                    id: node.id.clone(),
                    level: node.level,
                    expected,
                });
            }
        }

        for level in 0..self.level_count {
            let nodes: Vec<&FlowNode> = self.nodes_at_level(level).collect();
            if let Some(first) = nodes.first()
                && (first.y - config.top_bottom_padding).abs() > EPS
            {
                violations.push(LayoutViolation::LevelStartMisplaced {
                    level,
                    y: first.y,
                    expected: config.top_bottom_padding,
                });
            }
            for pair in nodes.windows(2) {
                let (upper, lower) = (pair[0], pair[1]);
                let spacing = lower.y - upper.bottom();
                if (spacing - config.inter_node_gap).abs() > EPS {
                    violations.push(LayoutViolation::NodeSpacing {
                        level,
                        upper: upper.id.clone(),
                        lower: lower.id.clone(),
                        spacing,
                        expected: config.inter_node_gap,
                    });
                }
                if upper.value < lower.value {
                    violations.push(LayoutViolation::NodeOrder {
                        level,
                        upper: upper.id.clone(),
                        lower: lower.id.clone(),
                    });
                }
            }
        }

        for link in &self.links {
            if self.node(&link.source).is_none() || self.node(&link.target).is_none() {
                violations.push(LayoutViolation::LinkMissingEndpoint {
                    source: link.source.clone(),
                    target: link.target.clone(),
                });
            }
            let source_width = link.sy1 - link.sy0;
            let target_width = link.ty1 - link.ty0;
            if (source_width - target_width).abs() > EPS {
                violations.push(LayoutViolation::LinkWidthMismatch {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    source_width,
                    target_width,
                });
            }
            if source_width + EPS < config.min_link_width {
                violations.push(LayoutViolation::LinkBelowMinWidth {
                    source: link.source.clone(),
                    target: link.target.clone(),
                    width: source_width,
                    min: config.min_link_width,
                });
            }
        }

        violations
    }

    /// Nodes whose stacked link bands extend past their bottom edge.
    ///
    /// Link widths use the tighter per-unit height of both endpoints rather
    /// than a conservation solve, so skewed fan-out can overflow a node.
    pub fn overflowing_nodes(&self) -> Vec<BandOverflow> {
        let mut out = Vec::new();
        for node in &self.nodes {
            for side in [BandSide::Outgoing, BandSide::Incoming] {
                let stacked_end = match side {
                    BandSide::Outgoing => self.outgoing(&node.id).map(|l| l.sy1).fold(None, max_opt),
                    BandSide::Incoming => self.incoming(&node.id).map(|l| l.ty1).fold(None, max_opt),
                };
                if let Some(end) = stacked_end {
                    let overflow = end - node.bottom();
                    if overflow > EPS {
                        out.push(BandOverflow {
                            id: node.id.clone(),
                            side,
                            overflow,
                        });
                    }
                }
            }
        }
        out
    }

    /// Generate a human-readable report of levels, nodes and links.
    pub fn report(&self, config: &LayoutConfig) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "=== Flow Layout ({} levels, {} nodes, {} links) ===",
            self.level_count,
            self.nodes.len(),
            self.links.len()
        );
        let _ = writeln!(
            s,
            "Sessions: {} considered, {} discarded, {} events",
            self.summary.sessions_considered,
            self.summary.sessions_discarded,
            self.summary.events_considered
        );

        for record in self.level_records(config) {
            let _ = writeln!(
                s,
                "\nLevel {} ({:.1}% of {:.1}):",
                record.level,
                record.utilization(),
                record.available_height
            );
            for node in self.nodes_at_level(record.level) {
                let _ = writeln!(
                    s,
                    "  {} value={} y={:.2} h={:.2} mean={:.3}",
                    node.id, node.value, node.y, node.height, node.mean_position
                );
            }
            if record.has_overflow() {
                let _ = writeln!(s, "  ⚠ OVERFLOW");
            }
        }

        let _ = writeln!(s, "\n--- Links ---");
        for link in &self.links {
            let _ = writeln!(
                s,
                "  {} -> {} value={} width={:.2}",
                link.source,
                link.target,
                link.value,
                link.width()
            );
        }

        let overflows = self.overflowing_nodes();
        if !overflows.is_empty() {
            let _ = writeln!(s, "\n⚠ {} band stacks overflow their node:", overflows.len());
            for o in &overflows {
                let _ = writeln!(s, "  - {} ({}) by {:.2}", o.id, o.side, o.overflow);
            }
        }

        s
    }

    /// Export to Graphviz DOT format for visualization.
    ///
    /// Nodes of one level share a rank; pen width follows link band width.
    pub fn export_dot(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "digraph SessionFlow {{");
        let _ = writeln!(s, "  rankdir=LR;");
        let _ = writeln!(s, "  node [shape=box, style=filled];");

        for level in 0..self.level_count {
            let ids: Vec<String> = self
                .nodes_at_level(level)
                .map(|n| format!("\"{}\"", escape_dot(&n.id)))
                .collect();
            if ids.is_empty() {
                continue;
            }
            let _ = writeln!(s, "  {{ rank=same; {}; }}", ids.join("; "));
        }

        for node in &self.nodes {
            let _ = writeln!(
                s,
                "  \"{}\" [label=\"{}\\n{}\", fillcolor=\"{}\"];",
                escape_dot(&node.id),
                escape_dot(&node.id),
                node.value,
                escape_dot(&node.color)
            );
        }

        for link in &self.links {
            let _ = writeln!(
                s,
                "  \"{}\" -> \"{}\" [label=\"{}\", penwidth={:.2}, color=\"{}\"];",
                escape_dot(&link.source),
                escape_dot(&link.target),
                link.value,
                link.width().max(0.1),
                escape_dot(&link.color)
            );
        }

        let _ = writeln!(s, "}}");
        s
    }
}

fn max_opt(acc: Option<f64>, value: f64) -> Option<f64> {
    Some(acc.map_or(value, |a| a.max(value)))
}

fn escape_dot(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_flow_layout;
    use crate::event::Event;
    use crate::layout::{FlowLink, FlowSummary};

    fn node(id: &str, level: usize, value: u64, y: f64, height: f64) -> FlowNode {
        FlowNode {
            id: id.to_owned(),
            level,
            value,
            mean_position: 0.0,
            y,
            height,
            color: "#000".to_owned(),
        }
    }

    fn link(source: &str, target: &str, sy0: f64, sy1: f64, ty0: f64, ty1: f64) -> FlowLink {
        FlowLink {
            source: source.to_owned(),
            target: target.to_owned(),
            value: 1,
            sy0,
            sy1,
            ty0,
            ty1,
            color: "#000".to_owned(),
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig::default()
            .canvas_height(140.0)
            .top_bottom_padding(20.0)
            .inter_node_gap(10.0)
            .min_node_height(2.0)
            .min_link_width(1.0)
            .start_type(None)
            .end_type(None)
    }

    fn layout(nodes: Vec<FlowNode>, links: Vec<FlowLink>) -> FlowLayout {
        FlowLayout {
            nodes,
            links,
            level_count: 2,
            canvas_height: 140.0,
            summary: FlowSummary::default(),
        }
    }

    #[test]
    fn consistent_layout_has_no_violations() {
        let l = layout(
            vec![
                node("a", 0, 2, 20.0, 100.0),
                node("b", 1, 1, 20.0, 45.0),
                node("c", 1, 1, 75.0, 45.0),
            ],
            vec![link("a", "b", 20.0, 65.0, 20.0, 65.0)],
        );
        assert!(l.check_invariants(&config()).is_empty());
    }

    #[test]
    fn detects_spacing_and_order_problems() {
        let l = layout(
            vec![
                node("a", 0, 1, 20.0, 10.0),
                node("b", 0, 5, 35.0, 10.0),
            ],
            Vec::new(),
        );
        let violations = l.check_invariants(&config());
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::NodeSpacing { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::NodeOrder { .. })));
    }

    #[test]
    fn detects_link_problems() {
        let l = layout(
            vec![node("a", 0, 1, 20.0, 10.0), node("b", 1, 1, 20.0, 10.0)],
            vec![
                link("a", "b", 20.0, 20.5, 20.0, 21.0),
                link("a", "ghost", 20.5, 22.0, 0.0, 1.5),
            ],
        );
        let violations = l.check_invariants(&config());
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::LinkWidthMismatch { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::LinkBelowMinWidth { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, LayoutViolation::LinkMissingEndpoint { .. })));
    }

    #[test]
    fn detects_unforced_boundary() {
        let l = layout(
            vec![node("session_start", 1, 1, 20.0, 10.0)],
            Vec::new(),
        );
        let violations = l.check_invariants(&config().start_type(Some("session_start")));
        assert_eq!(
            violations,
            vec![LayoutViolation::BoundaryNotForced {
                id: "session_start".to_owned(),
                level: 1,
                expected: 0,
            }]
        );
    }

    #[test]
    fn overflowing_bands_are_reported() {
        let l = layout(
            vec![node("a", 0, 1, 20.0, 2.0), node("b", 1, 1, 20.0, 10.0)],
            vec![link("a", "b", 20.0, 25.0, 20.0, 25.0)],
        );
        let overflows = l.overflowing_nodes();
        assert_eq!(overflows.len(), 1);
        assert_eq!(overflows[0].id, "a");
        assert_eq!(overflows[0].side, BandSide::Outgoing);
        assert!((overflows[0].overflow - 3.0).abs() < 1e-9);
    }

    #[test]
    fn level_record_utilization() {
        let record = LevelRecord {
            level: 0,
            nodes: vec!["a".into(), "b".into()],
            available_height: 100.0,
            node_height: 40.0,
            gap: 10.0,
        };
        assert!((record.utilization() - 50.0).abs() < 1e-9);
        assert!(record.has_underflow());
        assert!(!record.has_overflow());
    }

    #[test]
    fn level_record_overflow_from_min_heights() {
        let record = LevelRecord {
            level: 0,
            nodes: vec!["a".into(), "b".into(), "c".into()],
            available_height: 20.0,
            node_height: 18.0,
            gap: 2.0,
        };
        assert!(record.has_overflow());
        assert!((record.utilization() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn computed_layout_passes_its_own_checks() {
        let events = vec![
            Event::new("session_start", "s1", 0),
            Event::new("page_view", "s1", 1),
            Event::new("vote", "s1", 2),
            Event::new("session_end", "s1", 3),
            Event::new("session_start", "s2", 0),
            Event::new("search", "s2", 1),
            Event::new("session_end", "s2", 2),
        ];
        let config = LayoutConfig::default();
        let layout = compute_flow_layout(&events, &config).into_layout().unwrap();
        assert!(layout.check_invariants(&config).is_empty());
    }

    #[test]
    fn export_dot_contains_ranks_and_edges() {
        let l = layout(
            vec![node("a\"b", 0, 2, 20.0, 10.0), node("c", 1, 2, 20.0, 10.0)],
            vec![link("a\"b", "c", 20.0, 30.0, 20.0, 30.0)],
        );
        let dot = l.export_dot();
        assert!(dot.starts_with("digraph SessionFlow {"));
        assert!(dot.contains("rankdir=LR;"));
        assert!(dot.contains("{ rank=same; \"a\\\"b\"; }"));
        assert!(dot.contains("\"a\\\"b\" -> \"c\""));
        assert!(dot.contains("penwidth=10.00"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn report_lists_levels_and_links() {
        let l = layout(
            vec![node("a", 0, 2, 20.0, 10.0), node("b", 1, 2, 20.0, 10.0)],
            vec![link("a", "b", 20.0, 30.0, 20.0, 30.0)],
        );
        let report = l.report(&config());
        assert!(report.contains("2 levels, 2 nodes, 1 links"));
        assert!(report.contains("Level 1"));
        assert!(report.contains("a -> b value=1 width=10.00"));
    }
}
