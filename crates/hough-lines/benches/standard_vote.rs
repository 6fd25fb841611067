use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hough_core::{seeded_rng, GrayImage, Origin, Polarity, PointSet};
use hough_lines::{
    RandomizedLineDetector, RandomizedLineParams, StandardLineDetector, StandardLineParams,
};

/// Square image with a diagonal, an anti-diagonal and a mid row.
fn lines_image(size: usize) -> GrayImage {
    let mut img = GrayImage::filled(size, size, 255);
    for i in 0..size {
        img.put(i, i, 0);
        img.put(size - 1 - i, i, 0);
        img.put(i, size / 2, 0);
    }
    img
}

fn bench_standard(c: &mut Criterion) {
    let mut group = c.benchmark_group("standard_vote");
    for size in [128usize, 256, 512] {
        let img = lines_image(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &img, |b, img| {
            let mut det = StandardLineDetector::new(StandardLineParams::default());
            b.iter(|| det.run(black_box(&img.view()), 1.0).unwrap());
        });
    }
    group.finish();
}

fn bench_randomized(c: &mut Criterion) {
    let mut group = c.benchmark_group("randomized_lines");
    for size in [128usize, 256, 512] {
        let img = lines_image(size);
        let points =
            PointSet::from_image(&img.view(), Polarity::Dark, 128, Origin::CenterYUp).unwrap();
        let threshold = (size / 4) as u32;
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| {
                let mut det = RandomizedLineDetector::with_rng(
                    RandomizedLineParams::default(),
                    seeded_rng(1),
                );
                det.initialize(points.clone()).unwrap();
                black_box(det.run(threshold, 3).unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_standard, bench_randomized);
criterion_main!(benches);
