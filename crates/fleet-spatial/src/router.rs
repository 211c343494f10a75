//! Routing trait and the two bundled shortest-path implementations.
//!
//! # Pluggability
//!
//! The distance oracle and every driver call routing through the [`Router`]
//! trait, so applications can swap in A*, contraction hierarchies, or a
//! precomputed table without touching the simulation core.
//!
//! | Router            | Minimises                | Tie-break                     |
//! |-------------------|--------------------------|-------------------------------|
//! | [`DijkstraRouter`]| total `edge_length`      | lower `NodeId` popped first   |
//! | [`HopRouter`]     | number of road segments  | CSR arc order (insertion)     |
//!
//! Whatever the router minimises, path *distance* is always measured by the
//! oracle as the Euclidean length along the returned node sequence.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use fleet_core::NodeId;

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

/// Sentinel for "no predecessor arc".
const NO_ARC: usize = usize::MAX;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the ordered node sequence from source to
/// destination, both endpoints included.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of road segments traversed.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Final node of the route.
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
pub trait Router {
    /// Compute the node sequence from `from` to `to`.
    ///
    /// `from == to` yields a single-node route.  Returns
    /// [`SpatialError::UnreachableNodes`] when no path exists and
    /// [`SpatialError::NodeNotFound`] for ids outside the network.
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        from:    NodeId,
        to:      NodeId,
    ) -> SpatialResult<Route>;
}

fn check_endpoints(network: &RoadNetwork, from: NodeId, to: NodeId) -> SpatialResult<()> {
    if !network.contains(from) {
        return Err(SpatialError::NodeNotFound(from));
    }
    if !network.contains(to) {
        return Err(SpatialError::NodeNotFound(to));
    }
    Ok(())
}

fn reconstruct(network: &RoadNetwork, prev_arc: &[usize], to: NodeId) -> Route {
    let mut nodes = vec![to];
    let mut cur = to;
    loop {
        let e = prev_arc[cur.index()];
        if e == NO_ARC {
            break;
        }
        cur = network.edge_from[e];
        nodes.push(cur);
    }
    nodes.reverse();
    Route { nodes }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR graph using `edge_length` as cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

/// Min-heap entry.  `BinaryHeap` is a max-heap, so the ordering is reversed;
/// `NodeId` is the secondary key for deterministic tie-breaking.
#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Router for DijkstraRouter {
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        from:    NodeId,
        to:      NodeId,
    ) -> SpatialResult<Route> {
        check_endpoints(network, from, to)?;
        if from == to {
            return Ok(Route { nodes: vec![from] });
        }

        let n = network.node_count();
        let mut dist     = vec![f64::INFINITY; n];
        let mut prev_arc = vec![NO_ARC; n];

        dist[from.index()] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { cost: 0.0, node: from });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if node == to {
                return Ok(reconstruct(network, &prev_arc, to));
            }
            // Skip stale heap entries.
            if cost > dist[node.index()] {
                continue;
            }
            for e in network.out_edges(node) {
                let neighbor = network.edge_to[e];
                let new_cost = cost + network.edge_length[e];
                if new_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = new_cost;
                    prev_arc[neighbor.index()] = e;
                    heap.push(Frontier { cost: new_cost, node: neighbor });
                }
            }
        }

        Err(SpatialError::UnreachableNodes { from, to })
    }
}

// ── HopRouter ─────────────────────────────────────────────────────────────────

/// Breadth-first search: fewest road segments, ignoring segment lengths.
///
/// Cheaper than Dijkstra on grid-like networks where every segment has about
/// the same length.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopRouter;

impl Router for HopRouter {
    fn shortest_path(
        &self,
        network: &RoadNetwork,
        from:    NodeId,
        to:      NodeId,
    ) -> SpatialResult<Route> {
        check_endpoints(network, from, to)?;
        if from == to {
            return Ok(Route { nodes: vec![from] });
        }

        let n = network.node_count();
        let mut seen     = vec![false; n];
        let mut prev_arc = vec![NO_ARC; n];
        let mut queue    = VecDeque::new();

        seen[from.index()] = true;
        queue.push_back(from);

        while let Some(node) = queue.pop_front() {
            for e in network.out_edges(node) {
                let neighbor = network.edge_to[e];
                if seen[neighbor.index()] {
                    continue;
                }
                seen[neighbor.index()] = true;
                prev_arc[neighbor.index()] = e;
                if neighbor == to {
                    return Ok(reconstruct(network, &prev_arc, to));
                }
                queue.push_back(neighbor);
            }
        }

        Err(SpatialError::UnreachableNodes { from, to })
    }
}
