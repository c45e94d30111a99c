//! Particle field benchmarks
//!
//! The connection scan is quadratic in the particle count; these track how
//! step and scan scale around the default of 100 particles.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orrery_core::{DrawContext, RecordingContext, SceneRng, Size};
use orrery_scene::{FieldConfig, ParticleField};

const BOUNDS: Size = Size::new(1280.0, 720.0);

fn mounted_field(count: usize) -> ParticleField {
    let mut field = ParticleField::new(
        FieldConfig {
            pair_scan_warn_count: usize::MAX,
            ..FieldConfig::default()
        },
        SceneRng::seeded(42),
    );
    field.initialize(count, BOUNDS);
    field
}

fn bench_connection_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_connection_scan");

    for count in [50, 100, 200, 400].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let field = mounted_field(count);
            b.iter(|| {
                let mut lines = 0usize;
                field.for_each_connection(|c| {
                    lines += 1;
                    black_box(c);
                });
                black_box(lines)
            });
        });
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");

    for count in [100, 400].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut field = mounted_field(count);
            b.iter(|| {
                field.step();
                black_box(field.particles().len())
            });
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let field = mounted_field(100);
    let mut ctx = RecordingContext::new(BOUNDS);

    c.bench_function("field_render_100", |b| {
        b.iter(|| {
            ctx.clear();
            field.render(&mut ctx);
            black_box(ctx.commands().len())
        });
    });
}

criterion_group!(benches, bench_connection_scan, bench_step, bench_render);
criterion_main!(benches);
