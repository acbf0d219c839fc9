//! Road network components - nodes and edges

use geo::Point;

use crate::{NodeId, Weight};

/// Road graph node
#[derive(Debug, Clone, PartialEq)]
pub struct GeoNode {
    /// External (OSM) id of the node
    pub id: NodeId,
    /// Node coordinates, x = longitude, y = latitude
    pub geometry: Point<f64>,
}

impl GeoNode {
    pub fn lat(&self) -> f64 {
        self.geometry.y()
    }

    pub fn lon(&self) -> f64 {
        self.geometry.x()
    }
}

/// Road graph edge (one traversable direction of a street segment)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadEdge {
    /// Traversal cost, usually length in metres
    pub weight: Weight,
}
