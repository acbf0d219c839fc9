//! Shortest paths and nearest-facility selection

pub mod dijkstra;
mod path;
mod selector;

pub use dijkstra::{
    DistanceMap, Reached, SearchBudget, reconstruct_path, shortest_paths,
    shortest_paths_with_budget,
};
pub use path::{PathResult, PathSegment};
pub use selector::{RouteSelector, SelectorOptions, find_nearest_facility};
