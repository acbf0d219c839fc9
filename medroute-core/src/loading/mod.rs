//! This module is responsible for loading road network and facility data
//! and building the routing graph, plus the process-wide graph cache.

mod builder;
mod cache;
mod config;
pub mod records;

pub use builder::{create_geo_graph, create_geo_graph_from_csv, validate_facility_coverage};
pub use cache::{CachedNetwork, GraphCache};
pub use config::RouterConfig;
