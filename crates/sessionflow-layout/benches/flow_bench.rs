//! Benchmarks for the flow layout engine.
//!
//! Run with: cargo bench -p sessionflow-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use sessionflow_layout::sequence::collapse_sessions;
use sessionflow_layout::{Event, FlowLayoutCache, LayoutConfig, compute_flow_layout};
use std::hint::black_box;

const KINDS: &[&str] = &[
    "page_view",
    "post_view",
    "upvote",
    "downvote",
    "comment",
    "search",
    "navigate",
    "survey_open",
    "survey_answer",
    "survey_submit",
];

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn choose_index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

/// `sessions` sessions of `per_session` events each, bracketed by start/end.
fn make_batch(sessions: usize, per_session: usize, seed: u64) -> Vec<Event> {
    let mut rng = Lcg::new(seed);
    let mut events = Vec::with_capacity(sessions * (per_session + 2));
    for s in 0..sessions {
        let id = format!("session-{s}");
        events.push(Event::new("session_start", id.as_str(), 0));
        for i in 0..per_session {
            let kind = KINDS[rng.choose_index(KINDS.len())];
            events.push(Event::new(kind, id.as_str(), (i as i64 + 1) * 1000));
        }
        events.push(Event::new(
            "session_end",
            id.as_str(),
            (per_session as i64 + 1) * 1000,
        ));
    }
    events
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow/compute");
    let config = LayoutConfig::default();

    for sessions in [10, 100, 1_000, 10_000] {
        let events = make_batch(sessions, 12, 7);
        group.bench_with_input(BenchmarkId::new("sessions", sessions), &events, |b, events| {
            b.iter(|| black_box(compute_flow_layout(events, &config)))
        });
    }

    group.finish();
}

fn bench_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow/collapse");

    for per_session in [4, 16, 64] {
        let events = make_batch(1_000, per_session, 11);
        group.bench_with_input(
            BenchmarkId::new("per_session", per_session),
            &events,
            |b, events| b.iter(|| black_box(collapse_sessions(events).sequences().len())),
        );
    }

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("flow/cache");
    let config = LayoutConfig::default();
    let events = make_batch(1_000, 12, 3);

    group.bench_function("hit", |b| {
        let mut cache = FlowLayoutCache::new(8);
        cache.layout(&events, &config);
        b.iter(|| black_box(cache.layout(&events, &config)))
    });

    group.bench_function("miss", |b| {
        b.iter_batched(
            || FlowLayoutCache::new(8),
            |mut cache| black_box(cache.layout(&events, &config)),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_compute, bench_collapse, bench_cache);
criterion_main!(benches);
