//! Benchmarks for pixel-to-particle assignment and per-frame passes.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pixelflock::prelude::*;
use pixelflock::spatial::assign_pixels;
use pixelflock::{extract_pixels, Pixel, SpatialGrid};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Dense dark blob on white, roughly the shape of a typical portrait input.
fn blob_pixels(size: u32) -> Vec<Pixel> {
    let mut image = SourceImage::filled(size, size, [255, 255, 255, 255]);
    let center = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let d = Vec2::new(x as f32 - center, y as f32 - center).length();
            if d < center * 0.8 {
                image.set_pixel(x, y, [(d as u32 % 255) as u8, 40, 90, 255]);
            }
        }
    }
    extract_pixels(&image, &PixelFilter::default())
}

fn random_anchors(pixels: &[Pixel], count: usize) -> Vec<Vec2> {
    let mut rng = SmallRng::seed_from_u64(7);
    (0..count)
        .map(|_| pixels[rng.gen_range(0..pixels.len())].position())
        .collect()
}

fn bench_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_pixels");
    group.sample_size(10);

    let pixels = blob_pixels(256);
    for count in [500, 1500, 3000] {
        let anchors = random_anchors(&pixels, count);

        group.bench_with_input(BenchmarkId::new("indexed", count), &anchors, |b, anchors| {
            b.iter(|| {
                black_box(assign_pixels(
                    &pixels,
                    anchors,
                    AssignmentStrategy::default(),
                ))
            })
        });

        group.bench_with_input(BenchmarkId::new("brute_force", count), &anchors, |b, anchors| {
            b.iter(|| black_box(assign_pixels(&pixels, anchors, AssignmentStrategy::BruteForce)))
        });
    }

    group.finish();
}

fn bench_grid_build(c: &mut Criterion) {
    let pixels = blob_pixels(256);
    let anchors = random_anchors(&pixels, 3000);
    c.bench_function("grid_build_3000", |b| {
        b.iter(|| black_box(SpatialGrid::build(&anchors, 40.0)))
    });
}

fn bench_reconstruction_tick(c: &mut Criterion) {
    let mut image = SourceImage::filled(256, 256, [255, 255, 255, 255]);
    for y in 32..224 {
        for x in 32..224 {
            image.set_pixel(x, y, [x as u8, y as u8, 128, 255]);
        }
    }
    let mut session = ReconstructionSession::start(
        SurfaceSize::new(800, 600),
        image,
        ReconstructionConfig::default().with_seed(1),
    )
    .unwrap();
    let pointer = PointerState::hovering(Vec2::new(400.0, 300.0));
    let mut now = 0.0;

    c.bench_function("reconstruction_tick_3000", |b| {
        b.iter(|| {
            now += 16.0;
            black_box(session.tick(now, &pointer).markers.len())
        })
    });
}

criterion_group!(
    benches,
    bench_assignment,
    bench_grid_build,
    bench_reconstruction_tick,
);
criterion_main!(benches);
