//! The `Sim` struct and its tick loop.

use fleet_agent::{Registry, StepOutcome};
use fleet_core::{CustomerId, DriverId, FleetConfig, NodeId, OrderId, RestaurantId, SimClock, Tick};
use fleet_spatial::{DistanceOracle, Router, SpatialError};

use crate::dispatch::{self, DispatchOutcome};
use crate::handoff;
use crate::orders::OrderSource;
use crate::{FleetEvent, SimObserver, SimResult, SimState, TickSummary};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<R>` owns every entity and drives the tick loop.  Each tick, in fixed
/// order:
///
/// 0. **Intake**: the [`OrderSource`] places this tick's orders.
/// 1. **Dispatch**: the distance cache is cleared, then every restaurant
///    with a queued order (ascending id) offers its front order to the
///    nearest driver with spare capacity.
/// 2. **Movement**: every unlocked driver retargets if its order lists
///    changed, then steps.
/// 3. **Handoff**: one pass over driver pairs.
/// 4. **Snapshot**: record each driver's last node for next tick's dispatch.
///
/// There is no intrinsic termination rule; use [`Sim::run`] (configured
/// budget), [`Sim::run_ticks`], or [`Sim::run_until`].
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: Router> {
    pub config: FleetConfig,

    pub clock: SimClock,

    /// Global counters.  Only the tick loop writes them.
    pub state: SimState,

    /// Orders, restaurants, customers and drivers.
    pub registry: Registry,

    /// Owns the road network and the router.
    pub oracle: DistanceOracle<R>,

    /// Each driver's `prev_node` at the end of the previous tick, indexed by
    /// `DriverId`.  Dispatch measures from here.
    pub driver_nodes: Vec<NodeId>,

    source: Box<dyn OrderSource>,

    /// Events raised since the observer last saw them.
    events: Vec<FleetEvent>,
}

impl<R: Router> Sim<R> {
    pub(crate) fn new(
        config:   FleetConfig,
        registry: Registry,
        oracle:   DistanceOracle<R>,
        source:   Box<dyn OrderSource>,
    ) -> Self {
        let driver_nodes = registry.drivers.iter().map(|d| d.prev_node).collect();
        Self {
            config,
            clock: SimClock::new(),
            state: SimState::new(),
            registry,
            oracle,
            driver_nodes,
            source,
            events: Vec::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    /// Place an order at the current tick.  It joins the back of the
    /// restaurant's queue and is dispatched on the next processed tick.
    pub fn place_order(&mut self, restaurant: RestaurantId, customer: CustomerId) -> SimResult<OrderId> {
        let order = self.registry.place_order(restaurant, customer, self.now())?;
        self.state.placed_orders += 1;
        tracing::debug!("{order} placed at {restaurant} for {customer}");
        self.events.push(FleetEvent::OrderPlaced { order, restaurant, customer });
        Ok(order)
    }

    /// Run from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        tracing::info!(
            "Running {} drivers, {} restaurants, {} customers until {}",
            self.registry.drivers.len(),
            self.registry.restaurants.len(),
            self.registry.customers.len(),
            self.config.end_tick()
        );
        while self.now() < self.config.end_tick() {
            self.tick(observer)?;
        }
        tracing::info!(
            "Run finished at {}: {} of {} orders delivered, {} handoffs, {} routing failures",
            self.now(),
            self.state.completed_orders,
            self.state.placed_orders,
            self.state.handoffs,
            self.state.routing_failures
        );
        observer.on_sim_end(self.now(), &self.state);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.tick(observer)?;
        }
        Ok(())
    }

    /// Run until `done` holds (checked before every tick) or `max_ticks`
    /// ticks have been processed.  Returns whether `done` was reached.
    pub fn run_until<O, F>(&mut self, mut done: F, max_ticks: u64, observer: &mut O) -> SimResult<bool>
    where
        O: SimObserver,
        F: FnMut(&Sim<R>) -> bool,
    {
        for _ in 0..max_ticks {
            if done(self) {
                return Ok(true);
            }
            self.tick(observer)?;
        }
        Ok(done(self))
    }

    /// Process one tick, notify `observer`, and advance the clock.
    pub fn tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.now();
        observer.on_tick_start(now);
        let summary = self.process_tick(now)?;
        for event in self.events.drain(..) {
            observer.on_event(now, &event);
        }
        observer.on_tick_end(&summary);
        if self.config.snapshot_interval_ticks > 0
            && now.0.is_multiple_of(self.config.snapshot_interval_ticks)
        {
            observer.on_snapshot(now, &self.registry, &self.state);
        }
        self.clock.advance();
        Ok(summary)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<TickSummary> {
        let mut summary = TickSummary::new(now);

        // ── Phase 0: order intake ─────────────────────────────────────────
        for request in self.source.orders_for(now, &self.registry) {
            self.place_order(request.restaurant, request.customer)?;
            summary.placed += 1;
        }

        // ── Phase 1: dispatch ─────────────────────────────────────────────
        self.oracle.clear_cache();
        for r in 0..self.registry.restaurants.len() {
            if !self.registry.restaurants[r].has_queued() {
                continue;
            }
            let restaurant = RestaurantId(r as u32);
            let allocation =
                dispatch::allocate(restaurant, &mut self.registry, &mut self.oracle, &self.driver_nodes)?;
            for (driver, error) in allocation.unreachable {
                self.routing_failed(driver, error, &mut summary);
            }
            match allocation.outcome {
                DispatchOutcome::Assigned { order, driver, distance } => {
                    tracing::debug!("{order} assigned to {driver} at distance {distance:.3}");
                    summary.assigned += 1;
                    self.events.push(FleetEvent::OrderAssigned { order, driver, distance });
                }
                DispatchOutcome::NoEligibleDriver { order } => {
                    tracing::trace!("{order} waiting at {restaurant}: no driver has capacity");
                }
                DispatchOutcome::Idle => {}
            }
        }

        // ── Phase 2: retarget & move ──────────────────────────────────────
        let mut outcomes: Vec<(DriverId, StepOutcome)> = Vec::new();
        let mut failures: Vec<(DriverId, SpatialError)> = Vec::new();
        {
            let Registry { drivers, orders, .. } = &mut self.registry;
            for driver in drivers.iter_mut() {
                if driver.is_locked(now) {
                    continue;
                }
                if driver.needs_retarget {
                    if let Err(e) = driver.update_target(orders, &mut self.oracle) {
                        failures.push((driver.id, e));
                        continue;
                    }
                }
                let outcome = driver.step(now, orders, self.oracle.network());
                if outcome != StepOutcome::Parked {
                    outcomes.push((driver.id, outcome));
                }
            }
        }
        for (driver, error) in failures {
            self.routing_failed(driver, error, &mut summary);
        }
        for (driver, outcome) in outcomes {
            self.apply_outcome(driver, outcome, &mut summary);
        }

        // ── Phase 3: handoff ──────────────────────────────────────────────
        let pass = handoff::scan(now, &mut self.registry, &mut self.oracle, &self.config);
        for h in pass.handoffs {
            tracing::debug!(
                "{} handed from {} to {} at distance {:.3}; both locked until {}",
                h.order, h.from, h.to, h.driver_distance, h.release
            );
            self.state.handoffs += 1;
            summary.handoffs += 1;
            self.events.push(FleetEvent::HandedOff {
                order:   h.order,
                from:    h.from,
                to:      h.to,
                release: h.release,
            });
        }
        for (driver, error) in pass.unreachable {
            self.routing_failed(driver, error, &mut summary);
        }

        // ── Phase 4: snapshot for next tick's dispatch ────────────────────
        for (slot, d) in self.driver_nodes.iter_mut().zip(&self.registry.drivers) {
            *slot = d.prev_node;
        }

        debug_assert!(
            self.registry.invariant_violations().is_empty(),
            "invariants broken at {now}: {:?}",
            self.registry.invariant_violations()
        );

        summary.queued = self.registry.queued_orders();
        summary.oracle = self.oracle.stats();
        Ok(summary)
    }

    fn apply_outcome(&mut self, driver: DriverId, outcome: StepOutcome, summary: &mut TickSummary) {
        if outcome.distance() > 0.0 {
            summary.moving_drivers += 1;
        }
        match outcome {
            StepOutcome::PickedUp { order, node, .. } => {
                tracing::debug!("{driver} picked up {order} at {node}");
                summary.picked_up += 1;
                self.events.push(FleetEvent::PickedUp { order, driver, node });
            }
            StepOutcome::Delivered { order, node, .. } => {
                tracing::debug!("{driver} delivered {order} at {node}");
                self.state.completed_orders += 1;
                summary.delivered += 1;
                self.events.push(FleetEvent::Delivered { order, driver, node });
            }
            StepOutcome::ArrivedHome { node, .. } => {
                tracing::debug!("{driver} back home at {node}");
            }
            StepOutcome::Parked | StepOutcome::Moved { .. } | StepOutcome::ReachedNode { .. } => {}
        }
    }

    fn routing_failed(&mut self, driver: DriverId, error: SpatialError, summary: &mut TickSummary) {
        tracing::warn!("Routing failed for {driver}: {error}");
        self.state.routing_failures += 1;
        summary.routing_failures += 1;
        self.events.push(FleetEvent::RoutingFailed { driver, error });
    }
}
