//! Benchmarks for the CPU-side builders: data mapping, starfield and meshes.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use climate_globe::mesh::{polar_caps, SphereBuilder};
use climate_globe::rotation::ViewMode;
use climate_globe::{map_index_to_visuals, Category, Dataset, SceneGraph, StarfieldConfig};

fn bench_map_index_to_visuals(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_index_to_visuals");
    let data = Dataset::reference();

    for category in Category::ALL {
        group.bench_function(category.key(), |b| {
            b.iter(|| black_box(map_index_to_visuals(&data, Some(category), black_box(3))))
        });
    }

    group.bench_function("none", |b| {
        b.iter(|| black_box(map_index_to_visuals(&data, None, black_box(3))))
    });

    group.finish();
}

fn bench_starfield(c: &mut Criterion) {
    let mut group = c.benchmark_group("starfield");

    for count in [1_000u32, 5_000, 20_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let config = StarfieldConfig::new().with_count(count);
            b.iter(|| black_box(config.generate()))
        });
    }

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    group.bench_function("globe_64x64", |b| {
        b.iter(|| black_box(SphereBuilder::new(2.0).segments(64, 64).build()))
    });

    group.bench_function("polar_caps", |b| {
        b.iter(|| black_box(polar_caps(2.02, std::f32::consts::PI / 6.0, 64, 16)))
    });

    group.bench_function("interactive_scene", |b| {
        let stars = StarfieldConfig::new();
        b.iter(|| black_box(SceneGraph::build(ViewMode::Interactive, &stars)))
    });

    group.finish();
}

criterion_group!(benches, bench_map_index_to_visuals, bench_starfield, bench_geometry);
criterion_main!(benches);
