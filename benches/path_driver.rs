use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use railview::path::{advance, START};

/// Benchmark: one advance call on the first segment (early guard hit)
fn bench_advance_first_segment(c: &mut Criterion) {
    c.bench_function("advance_first_segment", |b| {
        b.iter(|| black_box(advance(black_box(START))))
    });
}

/// Benchmark: one advance call on the last segment (full guard scan)
fn bench_advance_last_segment(c: &mut Criterion) {
    let position = Vec3::new(290.0, -3.0, -400.0);
    c.bench_function("advance_last_segment", |b| {
        b.iter(|| black_box(advance(black_box(position))))
    });
}

/// Benchmark: one advance call past the route (no guard matches)
fn bench_advance_no_match(c: &mut Criterion) {
    let position = Vec3::new(400.0, 10.0, -500.0);
    c.bench_function("advance_no_match", |b| {
        b.iter(|| black_box(advance(black_box(position))))
    });
}

/// Benchmark: replaying the full journey to its fixed point
fn bench_full_journey(c: &mut Criterion) {
    c.bench_function("full_journey_replay", |b| {
        b.iter(|| {
            let mut position = START;
            loop {
                let next = advance(position);
                if next == position {
                    break;
                }
                position = next;
            }
            black_box(position)
        })
    });
}

criterion_group!(
    benches,
    bench_advance_first_segment,
    bench_advance_last_segment,
    bench_advance_no_match,
    bench_full_journey
);
criterion_main!(benches);
