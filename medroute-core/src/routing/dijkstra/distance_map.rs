use hashbrown::HashMap;

use crate::{Error, NodeId, Weight};

/// Settled distance of a node and the node it was reached from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reached {
    pub distance: Weight,
    /// `None` only for the source
    pub predecessor: Option<NodeId>,
}

/// Result of a single-source shortest-path run.
///
/// Only nodes reachable from the source are present.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMap {
    source: NodeId,
    entries: HashMap<NodeId, Reached>,
}

impl DistanceMap {
    pub(super) fn new(source: NodeId, entries: HashMap<NodeId, Reached>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn get(&self, node: NodeId) -> Option<&Reached> {
        self.entries.get(&node)
    }

    pub fn distance(&self, node: NodeId) -> Option<Weight> {
        self.entries.get(&node).map(|reached| reached.distance)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Reached)> {
        self.entries.iter().map(|(&node, reached)| (node, reached))
    }

    pub fn path_to(&self, target: NodeId) -> Result<Vec<NodeId>, Error> {
        reconstruct_path(self, target)
    }
}

/// Walks predecessor links back from `target` to the source and returns the
/// node sequence source → target.
///
/// # Errors
///
/// [`Error::NoPath`] if `target` was not reached.
pub fn reconstruct_path(map: &DistanceMap, target: NodeId) -> Result<Vec<NodeId>, Error> {
    let no_path = || Error::NoPath {
        from: map.source,
        to: target,
    };
    if !map.contains(target) {
        return Err(no_path());
    }

    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = map.get(current).and_then(|reached| reached.predecessor) {
        // A path can't be longer than the number of settled nodes
        if path.len() > map.len() {
            return Err(Error::InvalidData(format!(
                "predecessor cycle while walking back from node {target}"
            )));
        }
        path.push(prev);
        current = prev;
    }

    if current != map.source {
        return Err(no_path());
    }
    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DistanceMap {
        let entries = HashMap::from([
            (1, Reached { distance: 0.0, predecessor: None }),
            (2, Reached { distance: 1.5, predecessor: Some(1) }),
            (3, Reached { distance: 4.0, predecessor: Some(2) }),
        ]);
        DistanceMap::new(1, entries)
    }

    #[test]
    fn walks_back_to_source() {
        let map = chain();
        assert_eq!(reconstruct_path(&map, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(map.path_to(1).unwrap(), vec![1]);
        assert_eq!(map.distance(3), Some(4.0));
    }

    #[test]
    fn unreached_target_has_no_path() {
        let map = chain();
        assert!(matches!(
            reconstruct_path(&map, 9),
            Err(Error::NoPath { from: 1, to: 9 })
        ));
    }
}
