#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sessionflow_layout::{Event, LayoutConfig, compute_flow_layout};

const KINDS: &[&str] = &[
    "session_start",
    "session_end",
    "page_view",
    "vote",
    "comment",
    "search",
    "survey_open",
    "survey_submit",
];

#[derive(Debug, Arbitrary)]
struct RawEvent {
    kind: u8,
    session: u8,
    timestamp: i16,
}

#[derive(Debug, Arbitrary)]
struct Input {
    canvas_height: u16,
    padding: u8,
    gap: u8,
    min_node: u8,
    min_link: u8,
    min_levels: u8,
    max_levels: u8,
    events: Vec<RawEvent>,
}

fuzz_target!(|input: Input| {
    if input.events.len() > 2048 {
        return;
    }

    let events: Vec<Event> = input
        .events
        .iter()
        .map(|raw| {
            Event::new(
                KINDS[raw.kind as usize % KINDS.len()],
                format!("s{}", raw.session % 16),
                i64::from(raw.timestamp),
            )
        })
        .collect();

    let config = LayoutConfig::default()
        .canvas_height(f64::from(input.canvas_height))
        .top_bottom_padding(f64::from(input.padding))
        .inter_node_gap(f64::from(input.gap % 32))
        .min_node_height(f64::from(input.min_node % 16))
        .min_link_width(f64::from(input.min_link % 8))
        .level_bounds(usize::from(input.min_levels % 10), usize::from(input.max_levels % 12));

    // Any config, valid or not, must lay out without panicking.
    let outcome = compute_flow_layout(&events, &config);
    assert_eq!(outcome, compute_flow_layout(&events, &config), "layout not deterministic");

    let Some(layout) = outcome.layout() else {
        return;
    };
    assert!(layout.level_count >= 1);
    for node in &layout.nodes {
        assert!(node.level < layout.level_count, "level out of range");
        assert!(node.height.is_finite() && node.height >= 0.0);
        assert!(node.y.is_finite());
    }
    for link in &layout.links {
        assert!(link.width() >= 0.0);
        assert!(layout.node(&link.source).is_some());
        assert!(layout.node(&link.target).is_some());
    }

    if config.validate().is_empty() {
        let violations = layout.check_invariants(&config);
        assert!(violations.is_empty(), "violations: {violations:?}");
    }
});
