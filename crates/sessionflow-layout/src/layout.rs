//! Output types of the flow layout engine.
//!
//! Every geometric field is final: a renderer maps `level` to a horizontal
//! column and draws nodes at `[y, y + height]` and link bands from
//! `[sy0, sy1]` on the source node to `[ty0, ty1]` on the target node.

use serde::{Deserialize, Serialize};

/// A distinct event type placed on a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// The event type.
    pub id: String,
    /// 0-based horizontal level.
    pub level: usize,
    /// Collapsed-sequence positions carrying this type.
    pub value: u64,
    /// Mean fractional position used for level assignment.
    pub mean_position: f64,
    /// Top edge of the node band.
    pub y: f64,
    pub height: f64,
    pub color: String,
}

impl FlowNode {
    /// Bottom edge of the node band.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Band height per unit of value.
    #[inline]
    pub fn unit_height(&self) -> f64 {
        if self.value == 0 {
            0.0
        } else {
            self.height / self.value as f64
        }
    }
}

/// A weighted transition between two node types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    /// Number of observed adjacent occurrences.
    pub value: u64,
    /// Band interval on the source node.
    pub sy0: f64,
    pub sy1: f64,
    /// Band interval on the target node.
    pub ty0: f64,
    pub ty1: f64,
    /// Inherited from the source node.
    pub color: String,
}

impl FlowLink {
    /// Band width, identical on both ends.
    #[inline]
    pub fn width(&self) -> f64 {
        self.sy1 - self.sy0
    }
}

/// Bookkeeping about the event batch behind a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    /// Raw events in the batch.
    pub events_considered: usize,
    /// Distinct session ids in the batch.
    pub sessions_considered: usize,
    /// Sessions whose collapsed sequence had fewer than two entries.
    pub sessions_discarded: usize,
}

impl FlowSummary {
    /// Sessions that contributed to the flow.
    #[inline]
    pub fn sessions_retained(&self) -> usize {
        self.sessions_considered - self.sessions_discarded
    }
}

/// A complete flow diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLayout {
    /// Nodes by ascending level, then top to bottom.
    pub nodes: Vec<FlowNode>,
    /// Links by descending value, first-seen order on ties.
    pub links: Vec<FlowLink>,
    pub level_count: usize,
    pub canvas_height: f64,
    pub summary: FlowSummary,
}

impl FlowLayout {
    /// Node for event type `id`.
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Link from `source` to `target`.
    pub fn link(&self, source: &str, target: &str) -> Option<&FlowLink> {
        self.links
            .iter()
            .find(|link| link.source == source && link.target == target)
    }

    /// Nodes on `level`, top to bottom.
    pub fn nodes_at_level(&self, level: usize) -> impl Iterator<Item = &FlowNode> + '_ {
        self.nodes.iter().filter(move |node| node.level == level)
    }

    /// Links leaving `id`, in band order.
    pub fn outgoing<'s>(&'s self, id: &'s str) -> impl Iterator<Item = &'s FlowLink> + 's {
        self.links.iter().filter(move |link| link.source == id)
    }

    /// Links entering `id`, in band order.
    pub fn incoming<'s>(&'s self, id: &'s str) -> impl Iterator<Item = &'s FlowLink> + 's {
        self.links.iter().filter(move |link| link.target == id)
    }
}

/// Result of one layout call.
///
/// Not having enough data is an expected outcome, not an error: callers show
/// a "not enough data" state instead of a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlowOutcome {
    Ready(FlowLayout),
    InsufficientData(FlowSummary),
}

impl FlowOutcome {
    /// The layout, if one was produced.
    #[inline]
    pub fn layout(&self) -> Option<&FlowLayout> {
        match self {
            Self::Ready(layout) => Some(layout),
            Self::InsufficientData(_) => None,
        }
    }

    /// Take the layout, if one was produced.
    #[inline]
    pub fn into_layout(self) -> Option<FlowLayout> {
        match self {
            Self::Ready(layout) => Some(layout),
            Self::InsufficientData(_) => None,
        }
    }

    #[inline]
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }

    /// Batch bookkeeping, available for both variants.
    #[inline]
    pub fn summary(&self) -> FlowSummary {
        match self {
            Self::Ready(layout) => layout.summary,
            Self::InsufficientData(summary) => *summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn unit_height_guards_zero_value() {
        assert_eq!(node("a", 0, 0, 0.0, 4.0).unit_height(), 0.0);
        assert_eq!(node("a", 0, 4, 0.0, 10.0).unit_height(), 2.5);
    }

    #[test]
    fn insufficient_outcome_serializes_with_status_tag() {
        let outcome = FlowOutcome::InsufficientData(FlowSummary {
            events_considered: 3,
            sessions_considered: 1,
            sessions_discarded: 1,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["sessionsDiscarded"], 1);
        assert!(outcome.layout().is_none());
        assert_eq!(outcome.summary().sessions_retained(), 0);
    }

    #[test]
    fn ready_outcome_uses_renderer_field_names() {
        let layout = FlowLayout {
            nodes: vec![node("a", 0, 1, 20.0, 10.0)],
            links: Vec::new(),
            level_count: 2,
            canvas_height: 600.0,
            summary: FlowSummary::default(),
        };
        let json = serde_json::to_value(FlowOutcome::Ready(layout)).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["levelCount"], 2);
        assert_eq!(json["canvasHeight"], 600.0);
        assert_eq!(json["nodes"][0]["meanPosition"], 0.0);
    }
}
