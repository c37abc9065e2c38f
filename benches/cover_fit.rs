use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};

use promo_reel::frame::{Frame, FrameNormalizer};

fn cover_fit(c: &mut Criterion) {
    let normalizer = FrameNormalizer::new(1920, 1080);
    let portrait = Frame::new(RgbImage::from_fn(1200, 1600, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    }));
    let panorama = Frame::new(RgbImage::from_fn(4000, 1000, |x, y| {
        Rgb([(y % 256) as u8, 40, (x % 256) as u8])
    }));

    let mut group = c.benchmark_group("cover_fit");
    group.sample_size(10);
    group.bench_function("portrait_to_1080p", |b| {
        b.iter(|| normalizer.normalize(black_box(&portrait)))
    });
    group.bench_function("panorama_to_1080p", |b| {
        b.iter(|| normalizer.normalize(black_box(&panorama)))
    });
    group.finish();
}

criterion_group!(benches, cover_fit);
criterion_main!(benches);
