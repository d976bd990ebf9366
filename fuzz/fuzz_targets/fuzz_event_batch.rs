#![no_main]

use libfuzzer_sys::fuzz_target;
use sessionflow_layout::{LayoutConfig, compute_flow_layout, parse_events};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16 * 1024 {
        return;
    }

    // Malformed input must surface as an error, never a panic.
    let Ok(events) = parse_events(text) else {
        return;
    };
    let _ = compute_flow_layout(&events, &LayoutConfig::default());
});
