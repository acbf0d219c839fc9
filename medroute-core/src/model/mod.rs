//! Data model for nearest-facility routing
//!
//! Contains the road network graph, its components and the facilities
//! that routing queries select from.

pub mod components;
pub mod facility;
pub mod graph;
pub mod raw;

pub use components::{GeoNode, RoadEdge};
pub use facility::{Capacity, Facility};
pub use graph::GeoGraph;
pub use raw::{RawEdge, RawNetwork, RawNode};
