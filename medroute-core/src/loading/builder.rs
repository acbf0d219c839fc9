use std::path::Path;

use geo::{ConvexHull, Intersects, MultiPoint};
use log::{info, warn};

use super::records::{load_edges, load_nodes};
use crate::{Error, Facility, GeoGraph, RawNetwork};

/// Creates the road graph from a network extract
///
/// # Errors
///
/// Returns [`Error::MalformedGraph`] if the extract violates graph invariants
pub fn create_geo_graph(network: &RawNetwork) -> Result<GeoGraph, Error> {
    info!(
        "Building road graph from {} nodes and {} edges",
        network.nodes.len(),
        network.edges.len()
    );

    let graph = GeoGraph::from_network(network)?;

    let isolated = graph.isolated_node_count();
    if isolated > 0 {
        warn!(
            "{isolated} of {} nodes have no edges; points snapped to them cannot reach anything",
            graph.node_count()
        );
    }
    info!("Road graph created successfully");
    Ok(graph)
}

/// Creates the road graph from `nodes` and `edges` CSV files
///
/// # Errors
///
/// Returns an error if a file is missing, a row is malformed or the data
/// violates graph invariants
pub fn create_geo_graph_from_csv(nodes_path: &Path, edges_path: &Path) -> Result<GeoGraph, Error> {
    for path in [nodes_path, edges_path] {
        if !path.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Network file not found: {}", path.display()),
            )));
        }
    }

    info!("Reading road network from {}", nodes_path.display());
    let network = RawNetwork::new(load_nodes(nodes_path)?, load_edges(edges_path)?);
    create_geo_graph(&network)
}

/// Warns about facilities outside the network's convex hull and returns how
/// many there are. Such facilities snap to a boundary node and may be far
/// from any road.
#[allow(clippy::cast_precision_loss)]
pub fn validate_facility_coverage(graph: &GeoGraph, facilities: &[Facility]) -> usize {
    if facilities.is_empty() || graph.is_empty() {
        return 0;
    }

    let graph_nodes: MultiPoint = graph.nodes().map(|node| node.geometry).collect();
    let graph_hull = graph_nodes.convex_hull();

    let outside = facilities
        .iter()
        .filter(|facility| !facility.location.intersects(&graph_hull))
        .count();

    if outside > 0 {
        let total = facilities.len();
        let percentage = (outside as f64 / total as f64) * 100.0;
        warn!(
            "{outside} of {total} facilities ({percentage:.1}%) are outside \
        the road network coverage area. Their routes may be unreliable. \
        Consider requesting a larger network extract."
        );
    }
    outside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawEdge, RawNode};

    fn square() -> RawNetwork {
        RawNetwork::new(
            vec![
                RawNode::new(1, 50.0, 4.0),
                RawNode::new(2, 50.0, 4.1),
                RawNode::new(3, 50.1, 4.0),
                RawNode::new(4, 50.1, 4.1),
            ],
            vec![
                RawEdge::two_way(1, 2, 1.0),
                RawEdge::two_way(2, 4, 1.0),
                RawEdge::two_way(4, 3, 1.0),
                RawEdge::two_way(3, 1, 1.0),
            ],
        )
    }

    #[test]
    fn builds_from_network() {
        let graph = create_geo_graph(&square()).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn missing_csv_is_reported() {
        let result = create_geo_graph_from_csv(Path::new("/nope/nodes.csv"), Path::new("/nope/edges.csv"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn counts_facilities_outside_hull() {
        let graph = create_geo_graph(&square()).unwrap();
        let facilities = vec![
            Facility::new("inside", 50.05, 4.05),
            Facility::new("outside", 51.0, 5.0),
        ];
        assert_eq!(validate_facility_coverage(&graph, &facilities), 1);
        assert_eq!(validate_facility_coverage(&graph, &[]), 0);
    }
}
