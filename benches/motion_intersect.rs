use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use motiontri::{
    HitSelection, IntersectionConfig, LocalIntersection, MotionMesh, MotionScene,
    geometry::{FloatType, ObjectTransform, Ray, Triangle, WorldPoint, WorldVector},
    intersect, intersect_local,
    scene::ObjectIdx,
    util::Lcg,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

const GRID_SIZE: usize = 32;
const STEP_COUNT: usize = 3;

/// Grid of small triangles in the z = 0 plane, wobbling in z over the shutter.
fn build_scene() -> anyhow::Result<(MotionScene, ObjectIdx)> {
    let mut rng = SmallRng::seed_from_u64(0);
    let cell = 1.0 / GRID_SIZE as FloatType;

    let base: Vec<WorldPoint> = (0..GRID_SIZE)
        .flat_map(|y| (0..GRID_SIZE).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let corner = WorldPoint::new(x as FloatType * cell, y as FloatType * cell, 0.0);
            [
                corner,
                corner + WorldVector::new(cell, 0.0, 0.0),
                corner + WorldVector::new(0.0, cell, 0.0),
            ]
        })
        .collect();
    let triangles = (0..GRID_SIZE * GRID_SIZE)
        .map(|i| Triangle::new(3 * i, 3 * i + 1, 3 * i + 2))
        .collect();
    let steps = (0..STEP_COUNT)
        .map(|_| {
            base.iter()
                .map(|p| p + WorldVector::new(0.0, 0.0, rng.random_range(-0.1..0.1)))
                .collect()
        })
        .collect();

    let mesh = MotionMesh::builder()
        .triangles(triangles)
        .steps(steps)
        .build()?;
    let mut scene = MotionScene::new();
    let object = scene.add_baked(&mesh, &ObjectTransform::identity());
    Ok((scene, object))
}

fn random_rays(count: usize) -> Vec<Ray> {
    let mut rng = SmallRng::seed_from_u64(1);
    (0..count)
        .map(|_| {
            let target = WorldPoint::new(rng.random(), rng.random(), 0.0);
            let origin = WorldPoint::new(rng.random(), rng.random(), -5.0);
            Ray::new(origin, target - origin).with_time(rng.random())
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let (scene, object) = build_scene().unwrap();
    let rays = random_rays(64);
    let config = IntersectionConfig::default();

    c.bench_function("primary_brute_force", |b| {
        b.iter(|| {
            for ray in &rays {
                let closest = scene
                    .prims(object)
                    .filter_map(|prim| intersect(&scene, &config, ray, object, prim))
                    .min_by(|a, b| a.t.total_cmp(&b.t));
                black_box(closest);
            }
        })
    });

    c.bench_function("local_reservoir_brute_force", |b| {
        b.iter(|| {
            let mut lcg = Lcg::new(0);
            for ray in &rays {
                let mut local = LocalIntersection::<4>::new();
                for prim in scene.prims(object) {
                    intersect_local(
                        &scene,
                        ray,
                        object,
                        prim,
                        &mut local,
                        HitSelection::Reservoir(&mut lcg),
                        4,
                    );
                }
                black_box(&local);
            }
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
