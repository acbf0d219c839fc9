use std::{
    collections::BinaryHeap,
    time::{Duration, Instant},
};

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, hash_map::Entry};
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::{DistanceMap, Reached, state::State};
use crate::{Error, GeoGraph, NodeId};

/// Host-imposed limits on a single shortest-path run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    /// Maximum number of nodes settled before giving up
    pub max_visited_nodes: Option<usize>,
    /// Wall-clock limit for the whole run
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_visited_nodes(mut self, max: usize) -> Self {
        self.max_visited_nodes = Some(max);
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Dijkstra from `source` to every reachable node, without limits.
///
/// # Errors
///
/// [`Error::UnknownNode`] if `source` is not in the graph.
pub fn shortest_paths(graph: &GeoGraph, source: NodeId) -> Result<DistanceMap, Error> {
    shortest_paths_with_budget(graph, source, &SearchBudget::unlimited())
}

/// Dijkstra from `source` to every reachable node.
///
/// The frontier is a binary heap keyed by `(distance, node id)`, so among
/// equally distant nodes the lowest id is settled first. A neighbor's
/// predecessor only changes on a strict improvement, which makes equal-cost
/// alternatives resolve through the lowest-id node.
///
/// # Errors
///
/// [`Error::UnknownNode`] if `source` is not in the graph,
/// [`Error::ComputationTimeout`] if the budget runs out before the frontier
/// is exhausted.
pub fn shortest_paths_with_budget(
    graph: &GeoGraph,
    source: NodeId,
    budget: &SearchBudget,
) -> Result<DistanceMap, Error> {
    let start = graph.index_of(source)?;
    let deadline = budget.time_limit.map(|limit| Instant::now() + limit);

    let node_count = graph.node_count();
    let mut best: HashMap<NodeIndex, Reached> = HashMap::with_capacity(node_count.min(1024));
    let mut visited = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::with_capacity(node_count.min(1024) / 4);
    let mut settled = 0usize;

    best.insert(
        start,
        Reached {
            distance: 0.0,
            predecessor: None,
        },
    );
    heap.push(State {
        cost: 0.0,
        id: source,
        node: start,
    });

    while let Some(State { cost, id, node }) = heap.pop() {
        // Stale entry for an already settled node
        if visited.put(node.index()) {
            continue;
        }
        settled += 1;

        let over_count = budget.max_visited_nodes.is_some_and(|max| settled > max);
        let over_time = deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if over_count || over_time {
            log::debug!("Search from node {source} aborted after settling {settled} nodes");
            return Err(Error::ComputationTimeout { visited: settled });
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            if visited.contains(next.index()) {
                continue;
            }
            let next_cost = cost + edge.weight().weight;

            let improved = match best.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(Reached {
                        distance: next_cost,
                        predecessor: Some(id),
                    });
                    true
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < entry.get().distance {
                        *entry.get_mut() = Reached {
                            distance: next_cost,
                            predecessor: Some(id),
                        };
                        true
                    } else {
                        false
                    }
                }
            };

            if improved {
                heap.push(State {
                    cost: next_cost,
                    id: graph.graph[next].id,
                    node: next,
                });
            }
        }
    }

    log::debug!("Search from node {source} settled {settled} of {node_count} nodes");

    let entries = best
        .into_iter()
        .map(|(node, reached)| (graph.graph[node].id, reached))
        .collect();
    Ok(DistanceMap::new(source, entries))
}
