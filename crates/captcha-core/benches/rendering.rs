//! Benchmarks for captcha rendering and content addressing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use captcha_core::{Backend, ContentAddress, RenderConfig, Renderer};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn benchmark_rendering(c: &mut Criterion) {
    let plain = Backend::Plain.renderer(RenderConfig::default());
    let distorted = Backend::Distorted.renderer(RenderConfig::default());
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("render_plain_4", |b| {
        b.iter(|| plain.render(black_box("A7x2"), &mut rng))
    });

    c.bench_function("render_distorted_4", |b| {
        b.iter(|| distorted.render(black_box("A7x2"), &mut rng))
    });

    c.bench_function("render_distorted_8", |b| {
        b.iter(|| distorted.render(black_box("Qw3rTy9!"), &mut rng))
    });
}

fn benchmark_content_address(c: &mut Criterion) {
    let renderer = Backend::Distorted.renderer(RenderConfig::default());
    let mut rng = StdRng::seed_from_u64(1);
    let img = match renderer.render("A7x2", &mut rng) {
        Ok(img) => img,
        Err(e) => panic!("render failed: {}", e),
    };

    c.bench_function("encode_and_hash", |b| {
        b.iter(|| ContentAddress::encode("A7x2", black_box(&img)))
    });
}

criterion_group!(benches, benchmark_rendering, benchmark_content_address);
criterion_main!(benches);
