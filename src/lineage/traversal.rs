use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};

/// Which way to walk the parent-to-child edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Against the edges, toward the districts this one was carved from.
    Ancestors,
    /// With the edges, toward the districts carved from this one.
    Descendants,
}

impl TraversalDirection {
    fn as_petgraph(self) -> Direction {
        match self {
            Self::Ancestors => Direction::Incoming,
            Self::Descendants => Direction::Outgoing,
        }
    }
}

/// Every node reachable from `start` in the given direction, excluding
/// `start` itself. Plain BFS with a visited set.
pub(crate) fn reachable_from<N>(
    graph: &DiGraph<N, ()>,
    start: NodeIndex,
    direction: TraversalDirection,
) -> HashSet<NodeIndex> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors_directed(current, direction.as_petgraph()) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    visited.remove(&start);
    visited
}

/// Whether `to` is reachable from `from` along forward edges.
pub(crate) fn path_exists<N>(graph: &DiGraph<N, ()>, from: NodeIndex, to: NodeIndex) -> bool {
    if from == to {
        return true;
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    visited.insert(from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors_directed(current, Direction::Outgoing) {
            if neighbor == to {
                return true;
            }
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    false
}
