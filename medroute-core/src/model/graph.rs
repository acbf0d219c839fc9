//! Immutable weighted road graph

use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::debug;
use petgraph::{
    Directed, Graph,
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::{GeoNode, RawEdge, RawNetwork, RawNode, RoadEdge};
use crate::{
    Error, NodeId, Weight,
    spatial::{BoundingBox, haversine_m, validate_coordinate},
};

/// Road network graph.
///
/// Built once from raw network data and never mutated afterwards, so a
/// single instance can be shared between concurrent queries.
#[derive(Debug, Clone)]
pub struct GeoGraph {
    pub(crate) graph: Graph<GeoNode, RoadEdge, Directed>,
    index: HashMap<NodeId, NodeIndex>,
}

impl GeoGraph {
    /// Builds a graph from raw nodes and edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] if node ids repeat, a node lies
    /// outside the valid coordinate range, an edge references an unknown
    /// node, or an edge weight is negative or not finite.
    pub fn build(nodes: &[RawNode], edges: &[RawEdge]) -> Result<Self, Error> {
        let mut graph = Graph::with_capacity(nodes.len(), edges.len() * 2);
        let mut index = HashMap::with_capacity(nodes.len());

        for raw in nodes {
            let geometry = validate_coordinate(raw.lat, raw.lon).map_err(|_| {
                Error::MalformedGraph(format!(
                    "node {} has invalid coordinate ({}, {})",
                    raw.id, raw.lat, raw.lon
                ))
            })?;
            if index.contains_key(&raw.id) {
                return Err(Error::MalformedGraph(format!(
                    "duplicate node id {}",
                    raw.id
                )));
            }
            let idx = graph.add_node(GeoNode {
                id: raw.id,
                geometry,
            });
            index.insert(raw.id, idx);
        }

        for raw in edges {
            let lookup = |id: NodeId| {
                index.get(&id).copied().ok_or_else(|| {
                    Error::MalformedGraph(format!(
                        "edge {} -> {} references unknown node {id}",
                        raw.from, raw.to
                    ))
                })
            };
            let from = lookup(raw.from)?;
            let to = lookup(raw.to)?;

            let weight = match raw.weight {
                Some(weight) => weight,
                None => haversine_m(graph[from].geometry, graph[to].geometry),
            };
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::MalformedGraph(format!(
                    "edge {} -> {} has invalid weight {weight}",
                    raw.from, raw.to
                )));
            }

            graph.add_edge(from, to, RoadEdge { weight });
            if !raw.oneway {
                graph.add_edge(to, from, RoadEdge { weight });
            }
        }

        debug!(
            "Built road graph with {} nodes and {} directed edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { graph, index })
    }

    pub fn from_network(network: &RawNetwork) -> Result<Self, Error> {
        Self::build(&network.nodes, &network.edges)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges; a two-way segment counts twice
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&GeoNode> {
        self.index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GeoNode> {
        self.graph.node_weights()
    }

    pub fn coordinate(&self, id: NodeId) -> Result<Point<f64>, Error> {
        self.node(id)
            .map(|node| node.geometry)
            .ok_or(Error::UnknownNode(id))
    }

    /// Outgoing neighbors of a node as `(neighbor, weight)` pairs, ordered by
    /// neighbor id and then weight. Parallel edges are all listed.
    pub fn neighbors(&self, id: NodeId) -> Result<Vec<(NodeId, Weight)>, Error> {
        let idx = self.index_of(id)?;
        let mut neighbors: Vec<(NodeId, Weight)> = self
            .graph
            .edges(idx)
            .map(|edge| (self.graph[edge.target()].id, edge.weight().weight))
            .collect();
        neighbors.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        Ok(neighbors)
    }

    /// Cheapest direct edge from `from` to `to`, if any
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<Weight> {
        let from = *self.index.get(&from)?;
        let to = *self.index.get(&to)?;
        self.graph
            .edges_connecting(from, to)
            .map(|edge| edge.weight().weight)
            .min_by(f64::total_cmp)
    }

    /// Smallest box containing every node, `None` for an empty graph
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.nodes().map(|node| node.geometry), 0.0)
    }

    /// Number of nodes that no edge touches
    pub fn isolated_node_count(&self) -> usize {
        let touched: HashSet<NodeIndex> = self
            .graph
            .edge_indices()
            .filter_map(|edge: EdgeIndex| self.graph.edge_endpoints(edge))
            .flat_map(|(a, b)| [a, b])
            .collect();
        self.graph.node_count() - touched.len()
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Result<NodeIndex, Error> {
        self.index.get(&id).copied().ok_or(Error::UnknownNode(id))
    }
}
