use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("Graph has no nodes")]
    EmptyGraph,
    #[error("No path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("No facility is reachable from node {origin}")]
    NoFacilityReachable { origin: NodeId },
    #[error("No facility has free capacity")]
    NoFacilityAvailable,
    #[error("Facility list is empty")]
    EmptyFacilityList,
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("Computation budget exceeded after visiting {visited} nodes")]
    ComputationTimeout { visited: usize },
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl Error {
    /// Only an exhausted search budget is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ComputationTimeout { .. })
    }

    /// Disconnected regions are a legitimate outcome, not a failure of the caller
    pub fn is_no_route(&self) -> bool {
        matches!(
            self,
            Error::NoPath { .. } | Error::NoFacilityReachable { .. }
        )
    }
}
