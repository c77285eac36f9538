//! Benchmarks for height-index queries and render-window computation.
//!
//! Run with: cargo bench -p reslist-surface

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use reslist_surface::fenwick::HeightIndex;
use reslist_surface::viewport::{ItemHeight, ViewportModel};
use reslist_surface::window::compute_window;
use std::hint::black_box;

// ============================================================================
// Height index
// ============================================================================

fn bench_height_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("height_index");

    for rows in [1_000usize, 10_000, 100_000] {
        let heights: Vec<u32> = (0..rows).map(|i| 48 + (i % 5) as u32 * 16).collect();
        let index = HeightIndex::from_heights(&heights);
        let total = index.total();

        group.bench_with_input(BenchmarkId::new("build", rows), &heights, |b, h| {
            b.iter(|| black_box(HeightIndex::from_heights(h)))
        });

        group.bench_with_input(BenchmarkId::new("index_at", rows), &(), |b, _| {
            let mut y = 0u32;
            b.iter(|| {
                y = (y + 997) % total;
                black_box(index.index_at(y))
            })
        });

        group.bench_with_input(BenchmarkId::new("offset_of", rows), &(), |b, _| {
            let mut i = 0usize;
            b.iter(|| {
                i = (i + 7) % rows;
                black_box(index.offset_of(i))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Render window
// ============================================================================

fn bench_compute_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_window");

    for rows in [1_000usize, 10_000, 100_000] {
        let mut vp = ViewportModel::new(ItemHeight::Fixed(64));
        vp.apply_results((0..rows).map(|i| Some(format!("kb-{i}"))).collect());
        vp.set_container_height(900.0);

        group.bench_with_input(BenchmarkId::new("scrolling", rows), &(), |b, _| {
            let mut offset = 0.0f32;
            b.iter(|| {
                offset = (offset + 137.0) % vp.total_height() as f32;
                vp.set_scroll_offset(offset);
                black_box(compute_window(&vp, 3))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_height_index, bench_compute_window);
criterion_main!(benches);
