use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use haunted_house::config::Config;
use haunted_house::core::Bvh;
use haunted_house::scenes::create_haunted_house_scene;
use haunted_house::types::{TriangleData, FLAG_CAST_SHADOW};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn scene_triangles(rocks: usize) -> Vec<TriangleData> {
    let mut config = Config::default();
    config.rocks.count = rocks;
    create_haunted_house_scene(&config, &mut StdRng::seed_from_u64(0)).triangles()
}

fn bench_scene_build(c: &mut Criterion) {
    c.bench_function("scene_triangles", |b| {
        b.iter(|| black_box(scene_triangles(100)))
    });
}

fn bench_bvh_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_build");

    for count in [0, 100, 1000].iter() {
        let triangles = scene_triangles(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &triangles, |b, tris| {
            b.iter(|| black_box(Bvh::build(tris)))
        });
    }

    group.finish();
}

fn bench_shadow_rays(c: &mut Criterion) {
    let bvh = Bvh::build(&scene_triangles(100));
    let moon = Vec3::new(4.0, 5.0, -2.0).normalize();

    // Grid of floor points around the house
    let points: Vec<Vec3> = (0..32)
        .flat_map(|i| (0..32).map(move |j| Vec3::new(i as f32 - 16.0, 1e-3, j as f32 - 16.0)))
        .collect();

    c.bench_function("shadow_rays_1024", |b| {
        b.iter(|| {
            points
                .iter()
                .filter(|&&p| {
                    bvh.raycast(p, moon, 1e4, |tri, _| tri.has_flag(FLAG_CAST_SHADOW))
                        .is_some()
                })
                .count()
        })
    });
}

criterion_group!(benches, bench_scene_build, bench_bvh_build, bench_shadow_rays);
criterion_main!(benches);
