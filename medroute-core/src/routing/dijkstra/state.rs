use std::cmp::Ordering;

use petgraph::graph::NodeIndex;

use crate::{NodeId, Weight};

/// Frontier entry keyed by `(cost, id)`
#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: Weight,
    pub(super) id: NodeId,
    pub(super) node: NodeIndex,
}

// Min-heap by cost, then by node id (reversed from standard Rust BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}
