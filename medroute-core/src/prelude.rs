// Re-export key components
pub use crate::loading::{
    CachedNetwork, GraphCache, RouterConfig, create_geo_graph, create_geo_graph_from_csv,
    validate_facility_coverage,
};
pub use crate::model::{Capacity, Facility, GeoGraph, GeoNode, RawEdge, RawNetwork, RawNode};
pub use crate::routing::{
    DistanceMap, PathResult, PathSegment, RouteSelector, SearchBudget, SelectorOptions,
    find_nearest_facility, reconstruct_path, shortest_paths, shortest_paths_with_budget,
};
pub use crate::spatial::{BoundingBox, NearestNodeIndex, SnappedPoint};

// Core types for the road network
pub use crate::Error;
pub use crate::NodeId;
pub use crate::Weight; // metres
