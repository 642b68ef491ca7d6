use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use skyaqi_processor::dedup::{image_fingerprint, payload_fingerprint};
use skyaqi_processor::processors::materializer::split_indices;
use skyaqi_processor::processors::SkyClassifier;

// Create a synthetic sky-like gradient image for benchmarking
fn create_test_image(edge: u32) -> DynamicImage {
    let mut img = RgbImage::new(edge, edge);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let t = y as f32 / edge as f32;
        let r = (40.0 + 60.0 * t) as u8;
        let g = (120.0 + 40.0 * t) as u8;
        let b = (220.0 - 30.0 * t) as u8;
        *pixel = Rgb([r, g, b]);
        if (x / 16 + y / 16) % 7 == 0 {
            *pixel = Rgb([245, 245, 250]);
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn benchmark_sky_classifier(c: &mut Criterion) {
    let classifier = SkyClassifier::new();
    let mut group = c.benchmark_group("sky_classifier");

    for edge in [128u32, 512, 1024] {
        let image = create_test_image(edge);
        group.bench_with_input(BenchmarkId::from_parameter(edge), &image, |b, image| {
            b.iter(|| classifier.is_sky(black_box(image)));
        });
    }

    group.finish();
}

fn benchmark_fingerprints(c: &mut Criterion) {
    let image = create_test_image(512);
    let payload: Vec<u8> = (0..512 * 1024).map(|i| (i % 251) as u8).collect();

    c.bench_function("image_fingerprint_512", |b| {
        b.iter(|| image_fingerprint(black_box(&image)));
    });

    c.bench_function("payload_fingerprint_512k", |b| {
        b.iter(|| payload_fingerprint(black_box(&payload)));
    });
}

fn benchmark_split(c: &mut Criterion) {
    c.bench_function("split_indices_100k", |b| {
        b.iter(|| split_indices(black_box(100_000), 42));
    });
}

criterion_group!(
    benches,
    benchmark_sky_classifier,
    benchmark_fingerprints,
    benchmark_split
);
criterion_main!(benches);
