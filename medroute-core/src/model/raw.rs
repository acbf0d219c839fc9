//! Raw network records as handed over by an external data source

use serde::{Deserialize, Deserializer, Serialize};

use crate::{NodeId, Weight};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl RawNode {
    pub fn new(id: NodeId, lat: f64, lon: f64) -> Self {
        Self { id, lat, lon }
    }
}

/// A street segment between two nodes.
///
/// Segments are two-way unless `oneway` is set. A missing weight is replaced
/// by the great-circle length of the segment when the graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub weight: Option<Weight>,
    #[serde(default, deserialize_with = "deserialize_oneway")]
    pub oneway: bool,
}

impl RawEdge {
    pub fn two_way(from: NodeId, to: NodeId, weight: Weight) -> Self {
        Self {
            from,
            to,
            weight: Some(weight),
            oneway: false,
        }
    }

    pub fn one_way(from: NodeId, to: NodeId, weight: Weight) -> Self {
        Self {
            from,
            to,
            weight: Some(weight),
            oneway: true,
        }
    }
}

/// Complete network extract for a bounded area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNetwork {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

impl RawNetwork {
    pub fn new(nodes: Vec<RawNode>, edges: Vec<RawEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Parses a network from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Reads OSM-style yes/no flags as well as booleans and 0/1.
/// Empty or missing values read as `None`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Int(value)) => Ok(Some(value != 0)),
        Some(Flag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "yes" | "true" | "1" => Ok(Some(true)),
            "no" | "false" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
        },
    }
}

fn deserialize_oneway<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_flag(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_from_json() {
        let network = RawNetwork::from_json_str(
            r#"{
                "nodes": [{"id": 1, "lat": 50.0, "lon": 4.0}, {"id": 2, "lat": 50.1, "lon": 4.0}],
                "edges": [
                    {"from": 1, "to": 2, "weight": 120.5},
                    {"from": 2, "to": 1, "oneway": true},
                    {"from": 1, "to": 2, "oneway": "yes"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(network.nodes.len(), 2);
        assert_eq!(network.edges[0], RawEdge::two_way(1, 2, 120.5));
        assert_eq!(network.edges[1].weight, None);
        assert!(network.edges[1].oneway);
        assert!(network.edges[2].oneway);
    }

    #[test]
    fn bad_flag_is_an_error() {
        let result = RawNetwork::from_json_str(
            r#"{"nodes": [], "edges": [{"from": 1, "to": 2, "oneway": "sometimes"}]}"#,
        );
        assert!(matches!(result, Err(crate::Error::JsonError(_))));
    }
}
