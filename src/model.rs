use std::path::Path;
use std::sync::Arc;

use medroute_core::prelude::*;
use medroute_core::spatial::DEFAULT_LINEAR_SCAN_THRESHOLD;

use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pyfunction, gen_stub_pymethods};

use crate::to_py_err;

/// GeoGraph
///
/// An immutable road network whose nodes carry WGS84 coordinates and whose
/// edges carry non-negative lengths in metres.
///
/// The graph owns a spatial index used to snap arbitrary coordinates to the
/// nearest node, so a single instance can answer any number of queries and
/// may be shared between Python threads.
///
/// Example:
///
/// .. code-block:: python
///
///     graph = create_geo_graph(
///         nodes=[(1, 52.52, 13.40), (2, 52.53, 13.41)],
///         edges=[(1, 2, None, False)],
///     )
///     result = find_nearest_facility(graph, 52.52, 13.40, facilities)
#[gen_stub_pyclass]
#[pyclass(name = "GeoGraph")]
pub struct PyGeoGraph {
    pub(crate) graph: Arc<GeoGraph>,
    pub(crate) index: Arc<NearestNodeIndex>,
}

impl PyGeoGraph {
    fn new(graph: GeoGraph, linear_scan_threshold: usize) -> Self {
        let index = NearestNodeIndex::with_threshold(&graph, linear_scan_threshold);
        Self {
            graph: Arc::new(graph),
            index: Arc::new(index),
        }
    }

    pub(crate) fn selector(&self, options: SelectorOptions) -> RouteSelector {
        RouteSelector::with_index(Arc::clone(&self.graph), Arc::clone(&self.index))
            .with_options(options)
    }
}

#[gen_stub_pymethods]
#[pymethods]
impl PyGeoGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges; two-way roads count twice
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node ids reachable in one hop from `node_id`, with edge lengths,
    /// ordered by neighbor id
    pub fn neighbors(&self, node_id: NodeId) -> PyResult<Vec<(NodeId, Weight)>> {
        self.graph.neighbors(node_id).map_err(to_py_err)
    }

    /// Snap a coordinate to the closest node.
    ///
    /// Returns ``(node_id, distance_m)``. Equidistant nodes resolve to the
    /// lowest id.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> PyResult<(NodeId, f64)> {
        self.index.nearest(lat, lon).map_err(to_py_err)
    }

    /// Bounding box of all nodes as ``(south, west, north, east)``
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.graph
            .bounding_box()
            .map(|bbox| (bbox.south, bbox.west, bbox.north, bbox.east))
    }

    fn __repr__(&self) -> String {
        format!(
            "GeoGraph with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}

/// Create a road graph from node and edge lists
///
/// Parameters
/// ----------
/// nodes : list[tuple[int, float, float]]
///     ``(id, lat, lon)`` for every intersection
/// edges : list[tuple[int, int, float | None, bool]]
///     ``(from, to, length_m, oneway)``. A missing length defaults to the
///     great-circle distance between the endpoints.
/// linear_scan_threshold : int, default=2000
///     Graphs smaller than this snap points by scanning every node; larger
///     graphs use an R*-tree.
///
/// Returns
/// -------
/// GeoGraph
///
/// Raises
/// ------
/// ValueError
///     If an id is duplicated, an edge references an unknown node, a weight is
///     negative or a coordinate is out of range
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (nodes, edges, linear_scan_threshold = DEFAULT_LINEAR_SCAN_THRESHOLD))]
pub fn create_geo_graph(
    py: Python<'_>,
    nodes: Vec<(NodeId, f64, f64)>,
    edges: Vec<(NodeId, NodeId, Option<Weight>, bool)>,
    linear_scan_threshold: usize,
) -> PyResult<PyGeoGraph> {
    py.detach(|| {
        let nodes = nodes
            .into_iter()
            .map(|(id, lat, lon)| RawNode::new(id, lat, lon))
            .collect();
        let edges = edges
            .into_iter()
            .map(|(from, to, weight, oneway)| RawEdge {
                from,
                to,
                weight,
                oneway,
            })
            .collect();

        let graph = medroute_core::create_geo_graph(&RawNetwork::new(nodes, edges))
            .map_err(to_py_err)?;
        Ok(PyGeoGraph::new(graph, linear_scan_threshold))
    })
}

/// Load a road graph from ``nodes`` and ``edges`` CSV files
///
/// The nodes file needs ``id,lat,lon`` columns; the edges file needs
/// ``from,to`` and may carry ``weight`` and ``oneway``.
///
/// Notes
/// -----
/// The function releases the GIL while reading and building.
#[gen_stub_pyfunction]
#[pyfunction]
#[pyo3(signature = (nodes_path, edges_path, linear_scan_threshold = DEFAULT_LINEAR_SCAN_THRESHOLD))]
pub fn load_geo_graph_csv(
    py: Python<'_>,
    nodes_path: &str,
    edges_path: &str,
    linear_scan_threshold: usize,
) -> PyResult<PyGeoGraph> {
    py.detach(|| {
        let graph = create_geo_graph_from_csv(Path::new(nodes_path), Path::new(edges_path))
            .map_err(to_py_err)?;
        Ok(PyGeoGraph::new(graph, linear_scan_threshold))
    })
}
