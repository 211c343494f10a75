//! `DistanceOracle`: network shortest distances with a per-tick memo.
//!
//! Distance is the Euclidean length summed along the router's shortest node
//! sequence.  The oracle is the hottest primitive in the simulation: dispatch
//! queries one distance per driver per queued restaurant, and every driver
//! retarget queries one per candidate order.  Within a tick the same pairs
//! recur constantly, so results are memoised on the *unordered* pair.  Keying
//! on the unordered pair is also what makes the oracle exactly symmetric,
//! regardless of how the router breaks ties between equal-cost paths.
//!
//! The orchestrator calls [`DistanceOracle::clear_cache`] at the start of each
//! tick, which bounds memory to the pairs touched in one tick.

use rustc_hash::FxHashMap;

use fleet_core::NodeId;

use crate::{RoadNetwork, Route, Router, SpatialError, SpatialResult};

/// Cache counters, reset with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleStats {
    pub hits:   u64,
    pub misses: u64,
}

/// Owns the road network and the router, and answers distance queries.
///
/// # Type parameter
///
/// `R` must implement [`Router`] (e.g. [`crate::DijkstraRouter`]).
pub struct DistanceOracle<R: Router> {
    network: RoadNetwork,
    router:  R,
    cache:   FxHashMap<(NodeId, NodeId), f64>,
    stats:   OracleStats,
}

impl<R: Router> DistanceOracle<R> {
    pub fn new(network: RoadNetwork, router: R) -> Self {
        Self {
            network,
            router,
            cache: FxHashMap::default(),
            stats: OracleStats::default(),
        }
    }

    #[inline]
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Shortest network distance between `a` and `b`.
    ///
    /// `a == b` returns `0.0` without routing.  Unreachable pairs return
    /// [`SpatialError::UnreachableNodes`] with `from: a, to: b` and are not
    /// cached.
    pub fn shortest_distance(&mut self, a: NodeId, b: NodeId) -> SpatialResult<f64> {
        if a == b {
            return if self.network.contains(a) {
                Ok(0.0)
            } else {
                Err(SpatialError::NodeNotFound(a))
            };
        }

        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&d) = self.cache.get(&key) {
            self.stats.hits += 1;
            return Ok(d);
        }

        self.stats.misses += 1;
        let route = self
            .router
            .shortest_path(&self.network, key.0, key.1)
            .map_err(|e| match e {
                SpatialError::UnreachableNodes { .. } => SpatialError::UnreachableNodes { from: a, to: b },
                other => other,
            })?;
        let d = self.network.path_length(&route.nodes);
        self.cache.insert(key, d);
        Ok(d)
    }

    /// Full node sequence from `from` to `to`, both endpoints included.
    ///
    /// Not memoised: only the winning target of a retarget needs its path.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        self.router.shortest_path(&self.network, from, to)
    }

    /// Drop every memoised distance and reset the counters.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.stats = OracleStats::default();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> OracleStats {
        self.stats
    }
}
