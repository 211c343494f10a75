//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph is undirected, stored as **Compressed Sparse Row (CSR)** arcs:
//! every road segment contributes one arc in each direction.  Given a
//! `NodeId n`, its outgoing arcs occupy the index range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! Arc arrays (`edge_from`, `edge_to`, `edge_length`) are sorted by source
//! node with a stable sort, so within one node arcs keep insertion order.
//! Breadth-first tie-breaking in [`HopRouter`](crate::HopRouter) depends on
//! that order being deterministic.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a planar `Point` to the nearest `NodeId`.  Used
//! at setup to snap restaurant, customer and driver-home coordinates onto the
//! network.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fleet_core::{NodeId, Point};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Undirected road graph in CSR format plus a spatial index for node snapping.
///
/// Arc arrays are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Planar coordinate of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Source node of each arc.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each arc.
    pub edge_to: Vec<NodeId>,

    /// Segment length of each arc, used as the Dijkstra cost.
    pub edge_length: Vec<f64>,

    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of directed arcs (twice the number of road segments).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Node data ─────────────────────────────────────────────────────────

    /// Coordinate of `node`.
    ///
    /// # Panics
    /// Panics if `node` is not in the network.  Ids handed out by the
    /// builder, or checked with [`contains`](Self::contains), are always valid.
    #[inline]
    pub fn coord(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    /// Checked variant of [`coord`](Self::coord).
    pub fn coordinate_of(&self, node: NodeId) -> SpatialResult<Point> {
        self.node_pos
            .get(node.index())
            .copied()
            .ok_or(SpatialError::NodeNotFound(node))
    }

    /// Sum of Euclidean segment lengths along `nodes`.  Zero for paths of
    /// fewer than two nodes.
    pub fn path_length(&self, nodes: &[NodeId]) -> f64 {
        nodes
            .windows(2)
            .map(|w| self.coord(w[0]).distance(self.coord(w[1])))
            .sum()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the arc indices leaving `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = usize> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        start..end
    }

    /// Iterator over the neighbours of `node`, in arc order.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).map(|e| self.edge_to[e])
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` nearest to `pos`, or `None` for an empty network.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&pos.to_array())
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: Point, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&pos.to_array())
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use fleet_core::Point;
/// use fleet_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(3.0, 4.0));
/// b.add_road(a, c); // length 5.0, from the coordinates
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // one arc per direction
/// ```
pub struct RoadNetworkBuilder {
    nodes:    Vec<Point>,
    raw_arcs: Vec<RawArc>,
}

struct RawArc {
    from:   NodeId,
    to:     NodeId,
    length: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_arcs: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and road segments.
    pub fn with_capacity(nodes: usize, roads: usize) -> Self {
        Self {
            nodes:    Vec::with_capacity(nodes),
            raw_arcs: Vec::with_capacity(roads * 2),
        }
    }

    /// Add a junction and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add an undirected road whose length is the Euclidean distance between
    /// its endpoints.
    pub fn add_road(&mut self, a: NodeId, b: NodeId) {
        let length = self.nodes[a.index()].distance(self.nodes[b.index()]);
        self.add_road_with_length(a, b, length);
    }

    /// Add an undirected road with an explicit length (e.g. a winding road
    /// longer than the straight line between its junctions).
    pub fn add_road_with_length(&mut self, a: NodeId, b: NodeId, length: f64) {
        self.raw_arcs.push(RawArc { from: a, to: b, length });
        self.raw_arcs.push(RawArc { from: b, to: a, length });
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(E log E) for the arc sort + O(N log N) for the
    /// R-tree bulk load.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let arc_count  = self.raw_arcs.len();

        let mut raw = self.raw_arcs;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:   Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:     Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length: Vec<f64>    = raw.iter().map(|e| e.length).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, arc_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: pos.to_array(), id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edge_length,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
