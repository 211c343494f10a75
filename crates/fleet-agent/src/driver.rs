//! The driver agent: order acceptance, target selection, movement, and
//! pickup/delivery on arrival.
//!
//! # Position model
//!
//! `prev_node` is always the last junction the driver reached exactly.  The
//! continuous coordinate `pos` either equals `prev_node`'s coordinate or lies
//! on the segment between it and `path.front()` (the next node).  A driver
//! never cuts across the plane: when a retarget happens mid-edge and the new
//! route does not continue along the current segment, the driver first
//! reverses to `prev_node`.
//!
//! # Per-tick protocol
//!
//! The orchestrator calls [`Driver::update_target`] whenever
//! `needs_retarget` is set (new assignment, pickup, delivery, handoff, or
//! first tick), then [`Driver::step`].  A driver whose lock has not been
//! released does neither.

use std::collections::VecDeque;

use fleet_core::{DriverId, NodeId, OrderId, Point, Tick};
use fleet_spatial::{DistanceOracle, RoadNetwork, Router, SpatialResult};

use crate::{Destination, Order, Stop, Task};

/// What a single call to [`Driver::step`] did.
///
/// The orchestrator, as sole writer of global counters, reads this to update
/// the completed-order count and emit events.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Did not move: parked with nothing to do, or awaiting a retarget.
    Parked,
    /// Advanced along the current segment without reaching its end.
    Moved { distance: f64 },
    /// Snapped onto an intermediate node of the path.
    ReachedNode { node: NodeId, distance: f64 },
    PickedUp { order: OrderId, node: NodeId, distance: f64 },
    Delivered { order: OrderId, node: NodeId, distance: f64 },
    /// Reached the home node with no orders left.
    ArrivedHome { node: NodeId, distance: f64 },
}

impl StepOutcome {
    /// Distance covered during the step.
    pub fn distance(&self) -> f64 {
        match *self {
            StepOutcome::Parked => 0.0,
            StepOutcome::Moved { distance }
            | StepOutcome::ReachedNode { distance, .. }
            | StepOutcome::PickedUp { distance, .. }
            | StepOutcome::Delivered { distance, .. }
            | StepOutcome::ArrivedHome { distance, .. } => distance,
        }
    }
}

/// A delivery driver.
#[derive(Debug, Clone)]
pub struct Driver {
    pub id:       DriverId,
    /// Distance per tick.
    pub speed:    f64,
    /// Maximum `pending.len() + carrying.len()`.
    pub capacity: usize,
    pub home:     NodeId,

    /// Continuous coordinate.
    pub pos:       Point,
    /// Last node reached exactly.
    pub prev_node: NodeId,
    /// Remaining nodes to visit; the front is the next node.
    pub path:      VecDeque<NodeId>,

    /// Assigned, not yet picked up.
    pub pending:  Vec<OrderId>,
    /// Picked up, not yet delivered.
    pub carrying: Vec<OrderId>,

    pub task: Task,
    /// Set whenever the order lists change; cleared by `update_target`.
    pub needs_retarget: bool,
    /// The driver is suspended while `lock_release > now`.
    pub lock_release: Tick,

    /// Total distance moved.
    pub odometer:  f64,
    /// Orders this driver delivered, in delivery order.
    pub delivered: Vec<OrderId>,
}

impl Driver {
    /// A driver parked at `home`.  The first `update_target` plans the
    /// (empty) path home.
    pub fn new(id: DriverId, home: NodeId, home_pos: Point, speed: f64, capacity: usize) -> Self {
        Self {
            id,
            speed,
            capacity,
            home,
            pos: home_pos,
            prev_node: home,
            path: VecDeque::new(),
            pending: Vec::new(),
            carrying: Vec::new(),
            task: Task::Idle,
            needs_retarget: true,
            lock_release: Tick::ZERO,
            odometer: 0.0,
            delivered: Vec::new(),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Orders currently held (pending + carrying).
    #[inline]
    pub fn load(&self) -> usize {
        self.pending.len() + self.carrying.len()
    }

    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.load() < self.capacity
    }

    #[inline]
    pub fn is_locked(&self, now: Tick) -> bool {
        self.lock_release > now
    }

    /// The node the driver is moving toward, or `prev_node` when parked.
    #[inline]
    pub fn next_node(&self) -> NodeId {
        self.path.front().copied().unwrap_or(self.prev_node)
    }

    /// Last node of the current path, if any.
    #[inline]
    pub fn final_node(&self) -> Option<NodeId> {
        self.path.back().copied()
    }

    #[inline]
    pub fn destination(&self) -> Destination {
        self.task.destination()
    }

    /// The order the current task refers to, if still present.
    pub fn active_order(&self) -> Option<OrderId> {
        match self.task {
            Task::Idle => None,
            Task::Heading { stop: Stop::Restaurant, index } => self.pending.get(index).copied(),
            Task::Heading { stop: Stop::Customer, index }   => self.carrying.get(index).copied(),
        }
    }

    /// `true` if `pos` is strictly between `prev_node` and the next node.
    pub fn is_between_nodes(&self, network: &RoadNetwork) -> bool {
        self.pos != network.coord(self.prev_node)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Take `order` if there is spare capacity.  Capacity is enforced here by
    /// refusal; it is never an error.
    pub fn accept(&mut self, order: &mut Order) -> bool {
        if !self.has_capacity() {
            return false;
        }
        order.driver = Some(self.id);
        self.pending.push(order.id);
        self.needs_retarget = true;
        true
    }

    // ── Handoff ───────────────────────────────────────────────────────────

    /// Remove and return the carried order currently being delivered.
    pub fn release_active_delivery(&mut self) -> Option<OrderId> {
        let Task::Heading { stop: Stop::Customer, index } = self.task else {
            return None;
        };
        if index >= self.carrying.len() {
            return None;
        }
        self.needs_retarget = true;
        Some(self.carrying.remove(index))
    }

    /// Add an already picked-up order to the carrying list.
    pub fn receive_delivery(&mut self, order: OrderId) {
        self.carrying.push(order);
        self.needs_retarget = true;
    }

    /// Suspend movement and retargeting until `release`.
    pub fn lock_until(&mut self, release: Tick) {
        self.lock_release = self.lock_release.max(release);
    }

    // ── Target selection ──────────────────────────────────────────────────

    /// Choose the nearest candidate stop and plan the path to it.
    ///
    /// Candidates are every pending order's restaurant node, else every
    /// carried order's customer node, else home.  Distances are measured from
    /// `prev_node`; the first minimum in list order wins.  Deterministic:
    /// calling twice without an intervening state change yields the same
    /// path.
    ///
    /// On error (an unreachable candidate) the driver's previous plan is left
    /// untouched and `needs_retarget` stays set.
    pub fn update_target<R: Router>(
        &mut self,
        orders: &[Order],
        oracle: &mut DistanceOracle<R>,
    ) -> SpatialResult<()> {
        let (stop, candidates): (Option<Stop>, Vec<NodeId>) = if !self.pending.is_empty() {
            let nodes = self.pending.iter().map(|o| orders[o.index()].pickup_node).collect();
            (Some(Stop::Restaurant), nodes)
        } else if !self.carrying.is_empty() {
            let nodes = self.carrying.iter().map(|o| orders[o.index()].dropoff_node).collect();
            (Some(Stop::Customer), nodes)
        } else {
            (None, vec![self.home])
        };

        let mut best: Option<(usize, f64)> = None;
        for (i, &node) in candidates.iter().enumerate() {
            let d = oracle.shortest_distance(self.prev_node, node)?;
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        let Some((index, _)) = best else {
            return Ok(());
        };

        let route = oracle.shortest_path(self.prev_node, candidates[index])?;
        let current_segment = self.path.front().copied();
        let mut path: VecDeque<NodeId> = route.nodes.into_iter().skip(1).collect();
        if self.is_between_nodes(oracle.network()) && path.front().copied() != current_segment {
            path.push_front(self.prev_node);
        }

        self.path = path;
        self.task = match stop {
            Some(stop) => Task::Heading { stop, index },
            None       => Task::Idle,
        };
        self.needs_retarget = false;
        Ok(())
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Advance one tick.
    ///
    /// Moves `speed` toward the next node, or snaps onto it when it is within
    /// reach.  Reaching the last node of the path resolves the task: a pickup
    /// moves `pending[index]` to `carrying`, a delivery removes
    /// `carrying[index]`.  A driver whose path is already empty (it was
    /// planned while standing on its target) resolves the task without
    /// moving.
    pub fn step(&mut self, now: Tick, orders: &mut [Order], network: &RoadNetwork) -> StepOutcome {
        if self.needs_retarget {
            return StepOutcome::Parked;
        }
        let Some(next) = self.path.front().copied() else {
            return self.arrive(now, orders, 0.0);
        };

        let target = network.coord(next);
        let remaining = self.pos.distance(target);
        if remaining > self.speed {
            self.pos = self.pos.offset(self.pos.unit_step(target, self.speed));
            self.travel(self.speed, orders);
            return StepOutcome::Moved { distance: self.speed };
        }

        self.pos = target;
        self.prev_node = next;
        self.path.pop_front();
        self.travel(remaining, orders);

        if self.path.is_empty() {
            self.arrive(now, orders, remaining)
        } else {
            StepOutcome::ReachedNode { node: next, distance: remaining }
        }
    }

    fn travel(&mut self, distance: f64, orders: &mut [Order]) {
        self.odometer += distance;
        for o in &self.carrying {
            orders[o.index()].distance_traveled += distance;
        }
    }

    /// Resolve the task at the end of the path.
    fn arrive(&mut self, now: Tick, orders: &mut [Order], distance: f64) -> StepOutcome {
        let node = self.prev_node;
        match self.task {
            Task::Heading { stop: Stop::Restaurant, index } if index < self.pending.len() => {
                let order = self.pending.remove(index);
                self.carrying.push(order);
                orders[order.index()].mark_picked_up(now);
                self.needs_retarget = true;
                StepOutcome::PickedUp { order, node, distance }
            }
            Task::Heading { stop: Stop::Customer, index } if index < self.carrying.len() => {
                let order = self.carrying.remove(index);
                orders[order.index()].mark_delivered(now);
                self.delivered.push(order);
                self.needs_retarget = true;
                StepOutcome::Delivered { order, node, distance }
            }
            Task::Heading { .. } => {
                // Stale index: the list changed without a retarget.
                self.needs_retarget = true;
                StepOutcome::Parked
            }
            Task::Idle if distance > 0.0 => StepOutcome::ArrivedHome { node, distance },
            Task::Idle => StepOutcome::Parked,
        }
    }
}
