use std::sync::Arc;

use hashbrown::HashMap;
use medroute_core::prelude::*;
use medroute_core::spatial::haversine_m;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Small random graph with integer weights so that sums are exact.
/// Node ids are spread out so they never coincide with insertion positions.
fn random_graph(rng: &mut StdRng, node_count: u64, edge_count: usize) -> (Vec<RawNode>, Vec<RawEdge>) {
    let nodes: Vec<RawNode> = (0..node_count)
        .map(|i| {
            RawNode::new(
                100_000 - i * 7,
                50.0 + rng.gen_range(0.0..0.05),
                4.0 + rng.gen_range(0.0..0.05),
            )
        })
        .collect();
    let edges = (0..edge_count)
        .map(|_| {
            let from = nodes[rng.gen_range(0..nodes.len())].id;
            let to = nodes[rng.gen_range(0..nodes.len())].id;
            let weight = f64::from(rng.gen_range(0..10u32));
            if rng.gen_bool(0.3) {
                RawEdge::one_way(from, to, weight)
            } else {
                RawEdge::two_way(from, to, weight)
            }
        })
        .collect();
    (nodes, edges)
}

/// Minimum cost over every simple path from `source`
fn brute_force(graph: &GeoGraph, source: NodeId) -> HashMap<NodeId, f64> {
    fn walk(
        graph: &GeoGraph,
        node: NodeId,
        cost: f64,
        on_path: &mut Vec<NodeId>,
        best: &mut HashMap<NodeId, f64>,
    ) {
        let entry = best.entry(node).or_insert(f64::INFINITY);
        if cost < *entry {
            *entry = cost;
        }
        for (next, weight) in graph.neighbors(node).unwrap() {
            if !on_path.contains(&next) {
                on_path.push(next);
                walk(graph, next, cost + weight, on_path, best);
                on_path.pop();
            }
        }
    }

    let mut best = HashMap::new();
    walk(graph, source, 0.0, &mut vec![source], &mut best);
    best
}

#[test]
fn distances_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let node_count = rng.gen_range(1..=7);
        let edge_count = rng.gen_range(0..=12);
        let (nodes, edges) = random_graph(&mut rng, node_count, edge_count);
        let graph = GeoGraph::build(&nodes, &edges).unwrap();
        let source = nodes[rng.gen_range(0..nodes.len())].id;

        let map = shortest_paths(&graph, source).unwrap();
        let expected = brute_force(&graph, source);

        assert_eq!(map.len(), expected.len());
        for (node, cost) in &expected {
            assert_eq!(map.distance(*node), Some(*cost), "node {node}");

            // The reconstructed path really costs what the map says
            let path = map.path_to(*node).unwrap();
            assert_eq!(path.first(), Some(&source));
            assert_eq!(path.last(), Some(node));
            let walked: f64 = path
                .windows(2)
                .map(|hop| graph.edge_weight(hop[0], hop[1]).unwrap())
                .sum();
            assert_eq!(walked, *cost);
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let mut rng = StdRng::seed_from_u64(11);
    let (nodes, edges) = random_graph(&mut rng, 40, 120);
    let graph = GeoGraph::build(&nodes, &edges).unwrap();
    let source = nodes[0].id;

    let first = shortest_paths(&graph, source).unwrap();
    let second = shortest_paths(&graph, source).unwrap();
    assert_eq!(first, second);
    for (node, _) in first.iter() {
        assert_eq!(first.path_to(node).unwrap(), second.path_to(node).unwrap());
    }
}

#[test]
fn equal_cost_paths_ignore_edge_insertion_order() {
    // 5x5 unit grid: many equal-cost routes between opposite corners
    let n = 5u64;
    let nodes: Vec<RawNode> = (0..n * n)
        .map(|i| RawNode::new(i, (i / n) as f64 * 0.001, (i % n) as f64 * 0.001))
        .collect();
    let mut edges = Vec::new();
    for i in 0..n * n {
        if i % n + 1 < n {
            edges.push(RawEdge::two_way(i, i + 1, 1.0));
        }
        if i + n < n * n {
            edges.push(RawEdge::two_way(i, i + n, 1.0));
        }
    }

    let reference = GeoGraph::build(&nodes, &edges).unwrap();
    let expected = shortest_paths(&reference, 0).unwrap().path_to(n * n - 1).unwrap();
    // Lowest ids are settled first, so the route runs along the first row
    assert_eq!(expected, vec![0, 1, 2, 3, 4, 9, 14, 19, 24]);

    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let mut shuffled_nodes = nodes.clone();
        let mut shuffled_edges = edges.clone();
        shuffled_nodes.shuffle(&mut rng);
        shuffled_edges.shuffle(&mut rng);
        let graph = GeoGraph::build(&shuffled_nodes, &shuffled_edges).unwrap();
        let path = shortest_paths(&graph, 0).unwrap().path_to(n * n - 1).unwrap();
        assert_eq!(path, expected);
    }
}

#[test]
fn nearest_matches_exhaustive_search() {
    let mut rng = StdRng::seed_from_u64(21);
    for node_count in [1u64, 2, 10, 150, 2500] {
        let (nodes, _) = random_graph(&mut rng, node_count, 0);
        let graph = GeoGraph::build(&nodes, &[]).unwrap();
        let index = NearestNodeIndex::from_graph(&graph);
        assert_eq!(index.uses_tree(), node_count >= 2000);

        for _ in 0..200 {
            let lat = 50.0 + rng.gen_range(-0.02..0.07);
            let lon = 4.0 + rng.gen_range(-0.02..0.07);
            let found = index.nearest(lat, lon).unwrap();
            assert_eq!(found, index.nearest_exhaustive(lat, lon).unwrap());

            let query = geo::Point::new(lon, lat);
            let expected = graph
                .nodes()
                .map(|n| (n.id, haversine_m(query, n.geometry)))
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                .unwrap();
            assert_eq!(found, expected);
        }
    }
}

#[test]
fn mirrored_nodes_resolve_to_lowest_id() {
    let mut rng = StdRng::seed_from_u64(17);
    let origin = geo::Point::new(0.0, 0.0);
    let mut ties = 0;
    for _ in 0..5000 {
        let a: f64 = rng.gen_range(0.0..1.0);
        let b: f64 = rng.gen_range(0.0..1.0);
        let nodes = vec![RawNode::new(9, a, b), RawNode::new(2, b, a)];
        let graph = GeoGraph::build(&nodes, &[]).unwrap();

        let d9 = haversine_m(origin, geo::Point::new(b, a));
        let d2 = haversine_m(origin, geo::Point::new(a, b));
        if d9 == d2 {
            ties += 1;
        }
        let expected = if d9 < d2 { (9, d9) } else { (2, d2) };

        for threshold in [0, usize::MAX] {
            let index = NearestNodeIndex::with_threshold(&graph, threshold);
            assert_eq!(index.nearest(0.0, 0.0).unwrap(), expected, "a={a} b={b}");
        }
    }
    assert!(ties > 0);
}

#[test]
fn selector_picks_global_minimum() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let (nodes, edges) = random_graph(&mut rng, 30, 50);
        let graph = Arc::new(GeoGraph::build(&nodes, &edges).unwrap());
        let selector = RouteSelector::new(Arc::clone(&graph));

        let facilities: Vec<Facility> = (0..5)
            .map(|i| {
                let node = &nodes[rng.gen_range(0..nodes.len())];
                Facility::new(format!("h{i}"), node.lat, node.lon)
            })
            .collect();
        let origin = &nodes[rng.gen_range(0..nodes.len())];

        let distances = shortest_paths(&graph, origin.id).unwrap();
        let reachable: Vec<(f64, &str)> = facilities
            .iter()
            .filter_map(|f| {
                let (node, _) = selector.index().nearest(f.lat(), f.lon()).unwrap();
                distances.distance(node).map(|d| (d, f.id.as_str()))
            })
            .collect();

        match selector.find_nearest_facility(origin.lat, origin.lon, &facilities) {
            Ok(result) => {
                let best = reachable.iter().map(|(d, _)| *d).fold(f64::INFINITY, f64::min);
                assert_eq!(result.total_distance, best);
                assert!(reachable.iter().any(|(_, id)| *id == result.facility_id));
            }
            Err(Error::NoFacilityReachable { .. }) => assert!(reachable.is_empty()),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
