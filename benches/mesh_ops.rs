//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point3;
use prism::algo::curvature::{gaussian_curvature, gaussian_curvature_sequential, mean_curvature};
use prism::algo::deviation::{normal_deviation, normal_deviation_pooled};
use prism::prelude::*;

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Create grid vertices
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    // Create triangles
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

fn bench_mesh_construction(c: &mut Criterion) {
    let n = 10;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    c.bench_function("build_grid_10x10", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
            mesh
        });
    });
}

fn bench_mesh_traversal(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("vertex_neighbors_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_ids() {
                count += mesh.vertex_neighbors(v).count();
            }
            count
        });
    });
}

fn bench_curvature(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("gaussian_curvature_parallel", |b| {
        b.iter(|| gaussian_curvature(&mesh));
    });

    c.bench_function("gaussian_curvature_sequential", |b| {
        b.iter(|| gaussian_curvature_sequential(&mesh));
    });

    c.bench_function("mean_curvature_parallel", |b| {
        b.iter(|| mean_curvature(&mesh));
    });
}

fn bench_deviation(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);
    let pool = TaskPool::new(4);

    c.bench_function("normal_deviation_sequential", |b| {
        b.iter(|| normal_deviation(&mesh));
    });

    c.bench_function("normal_deviation_pooled_4", |b| {
        b.iter(|| normal_deviation_pooled(&mesh, &pool));
    });
}

fn bench_detection(c: &mut Criterion) {
    let mesh = create_grid_mesh(20);
    let params = DetectionParams::new()
        .with_distance_tolerance(0.01)
        .with_angle_tolerance(0.2)
        .with_min_support(40)
        .with_seed(7);

    c.bench_function("detect_primitives_grid_20x20", |b| {
        b.iter(|| detect_primitives(&mesh, &params).unwrap());
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_mesh_traversal,
    bench_curvature,
    bench_deviation,
    bench_detection
);
criterion_main!(benches);
