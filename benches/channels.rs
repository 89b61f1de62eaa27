use chroma_qr::ArgbImage;
use chroma_qr::models::ColorChannel;
use chroma_qr::utils::channels::{isolate_channel_parallel, isolate_channel_sequential, split_channels};
use chroma_qr::utils::grayscale::{argb_to_grayscale, argb_to_grayscale_parallel};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const SIZES: [(usize, usize); 3] = [(100, 100), (640, 480), (1920, 1080)];

fn frame(width: usize, height: usize) -> ArgbImage {
    let pixels = (0..width * height)
        .map(|i| 0xFF00_0000 | ((i as u32).wrapping_mul(0x0001_0203) & 0x00FF_FFFF))
        .collect();
    ArgbImage::new(width, height, pixels).expect("buffer matches dimensions")
}

fn bench_isolate_sequential(c: &mut Criterion) {
    for (w, h) in SIZES {
        let image = frame(w, h);
        c.bench_function(&format!("isolate_red_sequential_{w}x{h}"), |b| {
            b.iter(|| isolate_channel_sequential(black_box(&image), ColorChannel::Red))
        });
    }
}

fn bench_isolate_parallel(c: &mut Criterion) {
    for (w, h) in SIZES {
        let image = frame(w, h);
        c.bench_function(&format!("isolate_red_parallel_{w}x{h}"), |b| {
            b.iter(|| isolate_channel_parallel(black_box(&image), ColorChannel::Red))
        });
    }
}

fn bench_split_channels(c: &mut Criterion) {
    let image = frame(1280, 720);
    c.bench_function("split_channels_1280x720", |b| {
        b.iter(|| split_channels(black_box(&image)))
    });
}

fn bench_grayscale(c: &mut Criterion) {
    let image = frame(1920, 1080);
    c.bench_function("argb_to_grayscale_1920x1080", |b| {
        b.iter(|| argb_to_grayscale(black_box(image.pixels()), 1920, 1080))
    });
    c.bench_function("argb_to_grayscale_parallel_1920x1080", |b| {
        b.iter(|| argb_to_grayscale_parallel(black_box(image.pixels()), 1920, 1080))
    });
}

criterion_group!(
    benches,
    bench_isolate_sequential,
    bench_isolate_parallel,
    bench_split_channels,
    bench_grayscale
);
criterion_main!(benches);
