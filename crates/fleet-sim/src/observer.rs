//! Simulation observer trait, lifecycle events, and per-tick summaries.

use fleet_agent::Registry;
use fleet_core::{CustomerId, DriverId, NodeId, OrderId, RestaurantId, Tick};
use fleet_spatial::{OracleStats, SpatialError};

use crate::SimState;

// ── Events ────────────────────────────────────────────────────────────────────

/// Something that happened to an order or driver during a tick.
///
/// Events are buffered while the tick runs and handed to
/// [`SimObserver::on_event`] in the order they occurred, before
/// [`SimObserver::on_tick_end`].
#[derive(Clone, Debug, PartialEq)]
pub enum FleetEvent {
    OrderPlaced {
        order:      OrderId,
        restaurant: RestaurantId,
        customer:   CustomerId,
    },
    OrderAssigned {
        order:    OrderId,
        driver:   DriverId,
        /// Network distance from the restaurant to the driver's snapshot node.
        distance: f64,
    },
    PickedUp {
        order:  OrderId,
        driver: DriverId,
        node:   NodeId,
    },
    Delivered {
        order:  OrderId,
        driver: DriverId,
        node:   NodeId,
    },
    HandedOff {
        order:   OrderId,
        from:    DriverId,
        to:      DriverId,
        /// First tick at which both drivers move again.
        release: Tick,
    },
    /// An oracle query on behalf of `driver` found no path.  The affected
    /// work is skipped for this tick.
    RoutingFailed {
        driver: DriverId,
        error:  SpatialError,
    },
}

impl FleetEvent {
    /// The order this event concerns, if any.
    pub fn order(&self) -> Option<OrderId> {
        match *self {
            FleetEvent::OrderPlaced { order, .. }
            | FleetEvent::OrderAssigned { order, .. }
            | FleetEvent::PickedUp { order, .. }
            | FleetEvent::Delivered { order, .. }
            | FleetEvent::HandedOff { order, .. } => Some(order),
            FleetEvent::RoutingFailed { .. } => None,
        }
    }
}

// ── TickSummary ───────────────────────────────────────────────────────────────

/// Counts for a single tick, passed to [`SimObserver::on_tick_end`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    pub tick:             Tick,
    pub placed:           usize,
    pub assigned:         usize,
    pub picked_up:        usize,
    pub delivered:        usize,
    pub handoffs:         usize,
    pub routing_failures: usize,
    /// Drivers that covered a positive distance this tick.
    pub moving_drivers:   usize,
    /// Orders still waiting in restaurant queues at the end of the tick.
    pub queued:           usize,
    /// Distance-cache counters for this tick.
    pub oracle:           OracleStats,
}

impl TickSummary {
    pub fn new(tick: Tick) -> Self {
        Self { tick, ..Self::default() }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Callbacks invoked by the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, summary: &TickSummary) {
///         if summary.delivered > 0 {
///             println!("{}: {} delivered", summary.tick, summary.delivered);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before order intake.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event, in occurrence order.
    fn on_event(&mut self, _tick: Tick, _event: &FleetEvent) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called every `config.snapshot_interval_ticks` ticks with read-only
    /// access to every entity (driver coordinates, order states) and the
    /// global counters.
    fn on_snapshot(&mut self, _tick: Tick, _registry: &Registry, _state: &SimState) {}

    /// Called once after the final tick of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick, _state: &SimState) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// A [`SimObserver`] that records every event with its tick.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    pub events: Vec<(Tick, FleetEvent)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every event concerning `order`, in occurrence order.
    pub fn for_order(&self, order: OrderId) -> impl Iterator<Item = &(Tick, FleetEvent)> {
        self.events.iter().filter(move |(_, e)| e.order() == Some(order))
    }

    pub fn handoffs(&self) -> impl Iterator<Item = &(Tick, FleetEvent)> {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, FleetEvent::HandedOff { .. }))
    }
}

impl SimObserver for EventLog {
    fn on_event(&mut self, tick: Tick, event: &FleetEvent) {
        self.events.push((tick, event.clone()));
    }
}
