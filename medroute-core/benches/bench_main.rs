use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use medroute_core::prelude::*;

/// Square street grid of `n * n` intersections spaced roughly 100 m apart
fn street_grid(n: u64) -> GeoGraph {
    let nodes: Vec<RawNode> = (0..n * n)
        .map(|i| RawNode::new(i, 50.0 + (i / n) as f64 * 0.0009, 4.0 + (i % n) as f64 * 0.0014))
        .collect();
    let mut edges = Vec::new();
    for i in 0..n * n {
        if i % n + 1 < n {
            edges.push(RawEdge {
                from: i,
                to: i + 1,
                weight: None,
                oneway: false,
            });
        }
        if i + n < n * n {
            edges.push(RawEdge {
                from: i,
                to: i + n,
                weight: None,
                oneway: false,
            });
        }
    }
    GeoGraph::build(&nodes, &edges).unwrap()
}

fn bench_shortest_paths(c: &mut Criterion) {
    let graph = street_grid(150);
    c.bench_function("dijkstra 150x150 grid", |b| {
        b.iter(|| shortest_paths(black_box(&graph), 0).unwrap())
    });
}

fn bench_snapping(c: &mut Criterion) {
    let graph = street_grid(150);
    let index = NearestNodeIndex::from_graph(&graph);
    c.bench_function("snap point 150x150 grid", |b| {
        b.iter(|| index.nearest(black_box(50.0612), black_box(4.1033)).unwrap())
    });
}

fn bench_nearest_facility(c: &mut Criterion) {
    let selector = RouteSelector::new(Arc::new(street_grid(150)));
    let facilities: Vec<Facility> = (0..20)
        .map(|i| Facility::new(format!("h{i}"), 50.0 + f64::from(i) * 0.006, 4.2 - f64::from(i) * 0.009))
        .collect();
    c.bench_function("nearest facility 150x150 grid", |b| {
        b.iter(|| {
            selector
                .find_nearest_facility(black_box(50.01), black_box(4.01), &facilities)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_shortest_paths,
    bench_snapping,
    bench_nearest_facility
);
criterion_main!(benches);
