//! Order intake: where new orders come from each tick.

use std::collections::BTreeMap;

use fleet_agent::Registry;
use fleet_core::{CustomerId, RestaurantId, SimRng, Tick};

use crate::{SimError, SimResult};

/// A request to place one order at the current tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OrderRequest {
    pub restaurant: RestaurantId,
    pub customer:   CustomerId,
}

/// Produces the orders placed at the start of each tick.
pub trait OrderSource {
    /// Orders to place at `tick`.  `registry` is read-only and reflects the
    /// state at the end of the previous tick.
    fn orders_for(&mut self, tick: Tick, registry: &Registry) -> Vec<OrderRequest>;
}

/// A source that never produces orders.  The default: callers place orders
/// explicitly with [`Sim::place_order`][crate::Sim::place_order].
pub struct NoOrders;

impl OrderSource for NoOrders {
    fn orders_for(&mut self, _tick: Tick, _registry: &Registry) -> Vec<OrderRequest> {
        Vec::new()
    }
}

// ── ScheduledOrders ───────────────────────────────────────────────────────────

/// A fixed timetable of orders.
///
/// Requests scheduled for a tick the simulation has already passed are
/// released on the next tick it processes.
#[derive(Clone, Debug, Default)]
pub struct ScheduledOrders {
    queue: BTreeMap<Tick, Vec<OrderRequest>>,
}

impl ScheduledOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`push`][Self::push].
    pub fn at(mut self, tick: Tick, restaurant: RestaurantId, customer: CustomerId) -> Self {
        self.push(tick, restaurant, customer);
        self
    }

    pub fn push(&mut self, tick: Tick, restaurant: RestaurantId, customer: CustomerId) {
        self.queue
            .entry(tick)
            .or_default()
            .push(OrderRequest { restaurant, customer });
    }

    /// Requests not yet released.
    pub fn len(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl OrderSource for ScheduledOrders {
    fn orders_for(&mut self, tick: Tick, _registry: &Registry) -> Vec<OrderRequest> {
        let later = self.queue.split_off(&tick.offset(1));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().flatten().collect()
    }
}

// ── RandomOrders ──────────────────────────────────────────────────────────────

/// Seed offset of the order stream, so other consumers of the master seed
/// never share its sequence.
const ORDER_STREAM: u64 = 1;

/// Bernoulli order arrivals.
///
/// Each tick, with probability `rate`, one order is placed from a uniformly
/// chosen restaurant to a uniformly chosen customer.  Deterministic for a
/// given seed and registry.
#[derive(Debug)]
pub struct RandomOrders {
    rng:  SimRng,
    rate: f64,
}

impl RandomOrders {
    /// Fails unless `rate` is a probability in `[0, 1]`.
    pub fn new(seed: u64, rate: f64) -> SimResult<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(SimError::Config(format!("order rate must be within [0, 1], got {rate}")));
        }
        Ok(Self { rng: SimRng::stream(seed, ORDER_STREAM), rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl OrderSource for RandomOrders {
    fn orders_for(&mut self, _tick: Tick, registry: &Registry) -> Vec<OrderRequest> {
        if !self.rng.gen_bool(self.rate) {
            return Vec::new();
        }
        let (Some(r), Some(c)) = (
            self.rng.gen_index(registry.restaurants.len()),
            self.rng.gen_index(registry.customers.len()),
        ) else {
            return Vec::new();
        };
        vec![OrderRequest {
            restaurant: RestaurantId(r as u32),
            customer:   CustomerId(c as u32),
        }]
    }
}
