//! Benchmarks for region mask construction and application.
//!
//! Run with: `cargo bench --bench mask_bench`
//!
//! Point-in-polygon rasterisation dominates the inventory masking
//! stage, so this tracks the cost of building masks from polygons of
//! increasing vertex count and of applying a built mask to a field.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{LineString, MultiPolygon, Polygon};

use clpost_rs::grid::{DimKind, Field, LatLonGrid};
use clpost_rs::regions::RegionMask;

/// A star-shaped polygon centred on (105, 32) with `n` vertices.
fn star_polygon(n: usize) -> MultiPolygon<f64> {
    let mut ring = Vec::with_capacity(n + 1);
    for k in 0..n {
        let angle = k as f64 / n as f64 * std::f64::consts::TAU;
        let radius = if k % 2 == 0 { 15.0 } else { 8.0 };
        ring.push((105.0 + radius * angle.cos(), 32.0 + radius * angle.sin()));
    }
    ring.push(ring[0]);
    MultiPolygon(vec![Polygon::new(LineString::from(ring), vec![])])
}

fn inventory_grid() -> LatLonGrid {
    // 0.1 degree cells over the China window.
    LatLonGrid::uniform(73.05, 620, 0.1, 18.05, 360, 0.1)
}

fn bench_mask_from_polygons(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_from_polygons");
    group.sample_size(20);

    let grid = inventory_grid();
    for n_vertices in [64usize, 512, 4096] {
        let polygons = star_polygon(n_vertices);
        group.bench_with_input(
            BenchmarkId::from_parameter(n_vertices),
            &polygons,
            |b, polygons| {
                b.iter(|| RegionMask::from_polygons(black_box(grid.clone()), black_box(polygons)))
            },
        );
    }

    group.finish();
}

fn bench_mask_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_apply");

    let grid = inventory_grid();
    let mask = RegionMask::from_polygons(grid.clone(), &star_polygon(512));
    let n_cells = grid.n_lat() * grid.n_lon();

    let n_months = 24;
    let field = Field::new(
        "HCl_total",
        "kg m-2 s-1",
        vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
        vec![n_months, grid.n_lat(), grid.n_lon()],
        (0..n_months * n_cells).map(|i| i as f64 * 1e-12).collect(),
    )
    .unwrap();

    group.bench_function("apply_24_months", |b| {
        b.iter(|| mask.apply(black_box(&field)).unwrap())
    });

    let areas = grid.cell_areas();
    let slab = &field.values()[..n_cells];
    group.bench_function("weighted_sum", |b| {
        b.iter(|| mask.weighted_sum(black_box(slab), black_box(&areas)))
    });

    group.finish();
}

criterion_group!(benches, bench_mask_from_polygons, bench_mask_apply);
criterion_main!(benches);
