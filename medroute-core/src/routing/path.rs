use geo::{LineString, Point};
use geojson::{Feature, Geometry, JsonObject, Value as GeoJsonValue};
use itertools::Itertools;
use serde_json::json;

use crate::{Error, GeoGraph, NodeId, SnappedPoint, Weight};

/// One hop of a route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Weight,
}

/// Shortest route from the query origin to the selected facility
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub facility_id: String,
    /// Sum of edge weights along `nodes`
    pub total_distance: Weight,
    /// Node ids from origin to destination, both included
    pub nodes: Vec<NodeId>,
    pub origin: SnappedPoint,
    pub destination: SnappedPoint,
}

impl PathResult {
    /// Coordinates of every node on the path, in travel order
    pub fn coordinates(&self, graph: &GeoGraph) -> Result<Vec<Point<f64>>, Error> {
        self.nodes.iter().map(|&id| graph.coordinate(id)).collect()
    }

    /// Per-hop breakdown, using the cheapest of any parallel edges
    pub fn segments(&self, graph: &GeoGraph) -> Result<Vec<PathSegment>, Error> {
        self.nodes
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| {
                graph
                    .edge_weight(from, to)
                    .map(|weight| PathSegment { from, to, weight })
                    .ok_or(Error::NoPath { from, to })
            })
            .collect()
    }

    /// Route as a `LineString` feature, ready for a map renderer
    pub fn to_geojson(&self, graph: &GeoGraph) -> Result<Feature, Error> {
        let line: LineString<f64> = self.coordinates(graph)?.into_iter().collect();

        let mut properties = JsonObject::new();
        properties.insert("facility_id".to_string(), json!(self.facility_id));
        properties.insert("total_distance".to_string(), json!(self.total_distance));
        properties.insert("node_count".to_string(), json!(self.nodes.len()));
        properties.insert("origin_snap_distance".to_string(), json!(self.origin.distance));
        properties.insert(
            "destination_snap_distance".to_string(),
            json!(self.destination.distance),
        );

        Ok(Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeoJsonValue::from(&line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, graph: &GeoGraph) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.to_geojson(graph)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawEdge, RawNode};

    fn sample() -> (GeoGraph, PathResult) {
        let nodes = vec![
            RawNode::new(1, 50.0, 4.0),
            RawNode::new(2, 50.0, 4.01),
            RawNode::new(3, 50.01, 4.01),
        ];
        let edges = vec![
            RawEdge::two_way(1, 2, 700.0),
            RawEdge::two_way(2, 3, 1100.0),
            RawEdge::one_way(2, 3, 900.0),
        ];
        let graph = GeoGraph::build(&nodes, &edges).unwrap();
        let snap = |node, lat, lon| SnappedPoint {
            location: Point::new(lon, lat),
            node,
            distance: 0.0,
        };
        let result = PathResult {
            facility_id: "h1".to_string(),
            total_distance: 1600.0,
            nodes: vec![1, 2, 3],
            origin: snap(1, 50.0, 4.0),
            destination: snap(3, 50.01, 4.01),
        };
        (graph, result)
    }

    #[test]
    fn segments_use_cheapest_parallel_edge() {
        let (graph, result) = sample();
        let segments = result.segments(&graph).unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment { from: 1, to: 2, weight: 700.0 },
                PathSegment { from: 2, to: 3, weight: 900.0 },
            ]
        );
        let total: f64 = segments.iter().map(|s| s.weight).sum();
        assert_eq!(total, result.total_distance);
    }

    #[test]
    fn coordinates_follow_path_order() {
        let (graph, result) = sample();
        let coords = result.coordinates(&graph).unwrap();
        assert_eq!(coords[0], Point::new(4.0, 50.0));
        assert_eq!(coords[2], Point::new(4.01, 50.01));
    }

    #[test]
    fn geojson_feature_carries_route() {
        let (graph, result) = sample();
        let feature = result.to_geojson(&graph).unwrap();
        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["facility_id"], json!("h1"));
        assert_eq!(properties["node_count"], json!(3));

        let text = result.to_geojson_string(&graph).unwrap();
        assert!(text.contains("LineString"));
    }
}
