#![forbid(unsafe_code)]

//! The flow layout pass.
//!
//! ```text
//! events -> collapse_sessions -> FlowStats::aggregate -> assign_levels
//!        -> layout_nodes (vertical bands per level)
//!        -> layout_links (stacked band offsets per node)
//! ```
//!
//! # Node bands
//!
//! For a level with `k` nodes and total value `V`:
//!
//! ```text
//! scale  = (canvas_height - 2 * padding - (k - 1) * gap) / V     (0 when V == 0)
//! height = max(min_node_height, value * scale)
//! ```
//!
//! Nodes are placed from `y = padding`, each followed by `gap`.
//!
//! # Link bands
//!
//! Links are visited by descending value. Each node keeps one cursor for
//! outgoing bands and one for incoming bands, both starting at its `y`:
//!
//! ```text
//! width = max(min_link_width, value * min(src.height / src.value, tgt.height / tgt.value))
//! ```
//!
//! The width does not come from a flow-conservation solve, so the outgoing
//! bands of a node with skewed fan-out may extend past its bottom edge.
//! [`FlowLayout::overflowing_nodes`](crate::FlowLayout::overflowing_nodes)
//! reports those cases.

use rustc_hash::FxHashMap;

use crate::config::LayoutConfig;
use crate::event::Event;
use crate::layout::{FlowLayout, FlowLink, FlowNode, FlowOutcome, FlowSummary};
use crate::levels::{LevelAssignment, assign_levels};
use crate::sequence::collapse_sessions;
use crate::stats::FlowStats;

/// Build the flow diagram for `events`.
///
/// Pure and deterministic: the same batch and config always produce the same
/// nodes and links in the same order. Returns
/// [`FlowOutcome::InsufficientData`] when no session holds two distinct
/// consecutive event types.
pub fn compute_flow_layout(events: &[Event], config: &LayoutConfig) -> FlowOutcome {
    let _span = tracing::debug_span!("flow_layout", events = events.len()).entered();

    let sequences = collapse_sessions(events);
    let summary = FlowSummary {
        events_considered: sequences.events_considered(),
        sessions_considered: sequences.sessions_considered(),
        sessions_discarded: sequences.sessions_discarded(),
    };

    if sequences.is_empty() {
        tracing::debug!(
            sessions_considered = summary.sessions_considered,
            sessions_discarded = summary.sessions_discarded,
            "insufficient data for flow layout"
        );
        return FlowOutcome::InsufficientData(summary);
    }

    let stats = FlowStats::aggregate(&sequences);
    let levels = assign_levels(&stats, config);
    let nodes = layout_nodes(&stats, &levels, config);
    let links = layout_links(&stats, &nodes, config);

    tracing::debug!(
        sessions_retained = summary.sessions_retained(),
        sessions_discarded = summary.sessions_discarded,
        nodes = nodes.len(),
        links = links.len(),
        levels = levels.level_count(),
        "flow layout computed"
    );

    FlowOutcome::Ready(FlowLayout {
        nodes,
        links,
        level_count: levels.level_count(),
        canvas_height: config.canvas_height,
        summary,
    })
}

fn layout_nodes(
    stats: &FlowStats<'_>,
    levels: &LevelAssignment<'_>,
    config: &LayoutConfig,
) -> Vec<FlowNode> {
    let usable = config.usable_height();
    let mut nodes = Vec::with_capacity(stats.distinct_kinds());

    for (level, kinds) in levels.levels().iter().enumerate() {
        if kinds.is_empty() {
            continue;
        }
        let total: u64 = kinds.iter().map(|kind| stats.total(kind)).sum();
        let gaps = (kinds.len() - 1) as f64 * config.inter_node_gap;
        let scale = if total == 0 {
            0.0
        } else {
            ((usable - gaps) / total as f64).max(0.0)
        };

        let mut y = config.top_bottom_padding;
        for &kind in kinds {
            let Some(kind_stats) = stats.kind_stats(kind) else {
                continue;
            };
            let height = (kind_stats.total as f64 * scale).max(config.min_node_height);
            nodes.push(FlowNode {
                id: kind.to_owned(),
                level,
                value: kind_stats.total,
                mean_position: kind_stats.mean_position(),
                y,
                height,
                color: config.palette.color_for(kind).to_owned(),
            });
            y += height + config.inter_node_gap;
        }

        tracing::trace!(level, nodes = kinds.len(), total, scale, "level bands placed");
    }

    nodes
}

fn layout_links(stats: &FlowStats<'_>, nodes: &[FlowNode], config: &LayoutConfig) -> Vec<FlowLink> {
    let slots: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| (node.id.as_str(), slot))
        .collect();
    let mut out_cursor: Vec<f64> = nodes.iter().map(|node| node.y).collect();
    let mut in_cursor = out_cursor.clone();

    // Stable: equal counts keep first-seen order.
    let mut transitions = stats.transitions().to_vec();
    transitions.sort_by(|a, b| b.count.cmp(&a.count));

    let mut links = Vec::with_capacity(transitions.len());
    for transition in transitions {
        let (Some(&src), Some(&tgt)) = (
            slots.get(transition.source),
            slots.get(transition.target),
        ) else {
            continue;
        };
        let source = &nodes[src];
        let target = &nodes[tgt];

        let unit = source.unit_height().min(target.unit_height());
        let width = (transition.count as f64 * unit).max(config.min_link_width);

        let sy0 = out_cursor[src];
        let ty0 = in_cursor[tgt];
        out_cursor[src] += width;
        in_cursor[tgt] += width;

        links.push(FlowLink {
            source: source.id.clone(),
            target: target.id.clone(),
            value: transition.count,
            sy0,
            sy1: sy0 + width,
            ty0,
            ty1: ty0 + width,
            color: source.color.clone(),
        });
    }

    links
}
