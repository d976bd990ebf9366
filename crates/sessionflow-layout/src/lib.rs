#![forbid(unsafe_code)]

//! Session flow layout.
//!
//! Turns a flat batch of timestamped, session-tagged interaction events into
//! a layered Sankey-style diagram: one node per event type, one link per
//! observed transition, with every band position precomputed for a renderer.
//!
//! ```
//! use sessionflow_layout::{compute_flow_layout, Event, LayoutConfig};
//!
//! let events = vec![
//!     Event::new("session_start", "s1", 0),
//!     Event::new("page_view", "s1", 10),
//!     Event::new("session_end", "s1", 20),
//! ];
//! let outcome = compute_flow_layout(&events, &LayoutConfig::default());
//! let layout = outcome.layout().expect("one session with three types");
//! assert_eq!(layout.node("session_start").map(|n| n.level), Some(0));
//! assert_eq!(layout.links.len(), 2);
//! ```

pub mod cache;
pub mod config;
pub mod debug;
pub mod engine;
pub mod event;
pub mod events;
pub mod layout;
pub mod levels;
pub mod palette;
pub mod sequence;
pub mod stats;

pub use cache::{FlowLayoutCache, FlowLayoutCacheStats, FlowLayoutKey};
pub use config::{ConfigError, LayoutConfig, LevelBounds};
pub use debug::{BandOverflow, BandSide, LayoutViolation, LevelRecord};
pub use engine::compute_flow_layout;
pub use event::Event;
pub use events::{EventLoadError, load_events, parse_events};
pub use layout::{FlowLayout, FlowLink, FlowNode, FlowOutcome, FlowSummary};
pub use palette::ColorTable;
