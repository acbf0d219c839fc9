mod distance_map;
mod search;
mod state;

pub use distance_map::{DistanceMap, Reached, reconstruct_path};
pub use search::{SearchBudget, shortest_paths, shortest_paths_with_budget};
