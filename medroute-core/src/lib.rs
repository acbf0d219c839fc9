//! Nearest-facility routing over geo-embedded road networks.
//!
//! The crate builds an immutable [`GeoGraph`] from raw network data, snaps
//! arbitrary coordinates to graph nodes with a [`NearestNodeIndex`], runs a
//! deterministic single-source Dijkstra and selects the closest reachable
//! [`Facility`].

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod spatial;

pub use error::Error;
pub use loading::{
    CachedNetwork, GraphCache, RouterConfig, create_geo_graph, create_geo_graph_from_csv,
};
pub use model::{Capacity, Facility, GeoGraph, GeoNode, RawEdge, RawNetwork, RawNode};
pub use routing::{
    DistanceMap, PathResult, PathSegment, RouteSelector, SearchBudget, SelectorOptions,
    find_nearest_facility, reconstruct_path, shortest_paths, shortest_paths_with_budget,
};
pub use spatial::{BoundingBox, NearestNodeIndex, SnappedPoint};

/// Identifier of a road network node (OSM node ids fit)
pub type NodeId = u64;

/// Edge cost, metres by convention
pub type Weight = f64;
