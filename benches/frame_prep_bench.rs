use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use glam::Vec3;
use marquee::resources::BloomChainLayout;
use marquee::resources::light::PointLightPacker;
use marquee::{PointLight, RenderConfig, ShadowLight, ToneMappingPreset};

fn bench_light_packing(c: &mut Criterion) {
    let lights: Vec<PointLight> = (0..48)
        .map(|i| {
            let x = (i % 8) as f32 * 1.5 - 6.0;
            let z = (i / 8) as f32 * -2.0;
            PointLight::new(Vec3::new(x, 2.8, z), Vec3::new(1.0, 0.3, 0.8), 1.5, 5.0)
        })
        .collect();

    let mut group = c.benchmark_group("Frame Prep");

    group.bench_function("Pack 48 point lights", |b| {
        let mut packer = PointLightPacker::new();
        b.iter(|| {
            let block = packer.pack(black_box(&lights));
            black_box(block.len());
        });
    });

    group.bench_function("Shadow light-space matrix", |b| {
        let light = ShadowLight::default();
        b.iter(|| black_box(light.light_space_matrix()));
    });

    group.bench_function("Bloom chain layout (1080p, 5 levels)", |b| {
        b.iter(|| black_box(BloomChainLayout::new(1920, 1080, black_box(5))));
    });

    group.finish();
}

fn bench_config(c: &mut Criterion) {
    let base = RenderConfig::default();
    let patches: Vec<_> = ToneMappingPreset::all().iter().map(|p| p.patch()).collect();

    let mut group = c.benchmark_group("Config");

    group.bench_function("Apply + diff every preset", |b| {
        b.iter(|| {
            for patch in &patches {
                let next = base.apply(black_box(patch));
                black_box(base.diff(&next));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_light_packing, bench_config);
criterion_main!(benches);
