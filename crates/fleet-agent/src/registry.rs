//! The `Registry`: every entity of a run, stored in id-indexed `Vec`s.
//!
//! Orders reference drivers and drivers reference orders, so nothing holds a
//! direct reference to anything else: all cross-entity access is an index
//! into one of these vectors.  Fields are `pub` so the orchestrator can
//! split-borrow (`&mut drivers` alongside `&mut orders`) on hot paths.

use fleet_core::{
    CustomerId, DriverId, FleetError, FleetResult, NodeId, OrderId, Point, RestaurantId, Tick,
};

use crate::{Customer, Driver, Order, Restaurant};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Indexed by `OrderId`.  Orders are never removed during a run.
    pub orders:      Vec<Order>,
    /// Indexed by `RestaurantId`.
    pub restaurants: Vec<Restaurant>,
    /// Indexed by `CustomerId`.
    pub customers:   Vec<Customer>,
    /// Indexed by `DriverId`.
    pub drivers:     Vec<Driver>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    pub fn add_restaurant(&mut self, pos: Point, node: NodeId) -> RestaurantId {
        let id = RestaurantId(self.restaurants.len() as u32);
        self.restaurants.push(Restaurant::new(id, pos, node));
        id
    }

    pub fn add_customer(&mut self, pos: Point, node: NodeId) -> CustomerId {
        let id = CustomerId(self.customers.len() as u32);
        self.customers.push(Customer::new(id, pos, node));
        id
    }

    pub fn add_driver(&mut self, home: NodeId, home_pos: Point, speed: f64, capacity: usize) -> DriverId {
        let id = DriverId(self.drivers.len() as u32);
        self.drivers.push(Driver::new(id, home, home_pos, speed, capacity));
        id
    }

    // ── Orders ────────────────────────────────────────────────────────────

    /// Create an order at tick `now` and append it to the restaurant's queue.
    pub fn place_order(
        &mut self,
        restaurant: RestaurantId,
        customer:   CustomerId,
        now:        Tick,
    ) -> FleetResult<OrderId> {
        let pickup_node = self.restaurant(restaurant)?.node;
        let dropoff_node = self.customer(customer)?.node;

        let id = OrderId(self.orders.len() as u32);
        self.orders.push(Order::new(id, restaurant, customer, pickup_node, dropoff_node, now));

        let r = &mut self.restaurants[restaurant.index()];
        r.order_ids.push(id);
        r.queue.push_back(id);
        self.customers[customer.index()].order_ids.push(id);
        Ok(id)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn order(&self, id: OrderId) -> FleetResult<&Order> {
        self.orders.get(id.index()).ok_or(FleetError::OrderNotFound(id))
    }

    pub fn driver(&self, id: DriverId) -> FleetResult<&Driver> {
        self.drivers.get(id.index()).ok_or(FleetError::DriverNotFound(id))
    }

    pub fn restaurant(&self, id: RestaurantId) -> FleetResult<&Restaurant> {
        self.restaurants.get(id.index()).ok_or(FleetError::RestaurantNotFound(id))
    }

    pub fn customer(&self, id: CustomerId) -> FleetResult<&Customer> {
        self.customers.get(id.index()).ok_or(FleetError::CustomerNotFound(id))
    }

    // ── Aggregates ────────────────────────────────────────────────────────

    /// Orders waiting in any restaurant queue.
    pub fn queued_orders(&self) -> usize {
        self.restaurants.iter().map(|r| r.queue.len()).sum()
    }

    pub fn delivered_orders(&self) -> usize {
        self.orders.iter().filter(|o| o.delivered).count()
    }

    /// `true` when every placed order has been delivered.
    pub fn all_delivered(&self) -> bool {
        self.orders.iter().all(|o| o.delivered)
    }

    /// Check the cross-entity invariants and describe every violation.
    ///
    /// - each driver holds at most `capacity` orders;
    /// - each undelivered assigned order sits in exactly one list of exactly
    ///   the driver it names;
    /// - timestamps are ordered: placed ≤ picked up ≤ delivered.
    ///
    /// O(orders + drivers × load); intended for tests and debug assertions.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut holders: Vec<Vec<DriverId>> = vec![Vec::new(); self.orders.len()];

        for d in &self.drivers {
            if d.load() > d.capacity {
                violations.push(format!("{} holds {} orders, capacity {}", d.id, d.load(), d.capacity));
            }
            for o in d.pending.iter().chain(&d.carrying) {
                holders[o.index()].push(d.id);
            }
        }

        for order in &self.orders {
            let held_by = &holders[order.id.index()];
            if order.delivered {
                if !held_by.is_empty() {
                    violations.push(format!("{} delivered but still held by {:?}", order.id, held_by));
                }
            } else if let Some(driver) = order.driver {
                if held_by.as_slice() != [driver].as_slice() {
                    violations.push(format!(
                        "{} assigned to {} but held by {:?}",
                        order.id, driver, held_by
                    ));
                }
            } else if !held_by.is_empty() {
                violations.push(format!("{} unassigned but held by {:?}", order.id, held_by));
            }

            match (order.picked_up, order.picked_up_at) {
                (true, Some(t)) if t < order.placed_at => {
                    violations.push(format!("{} picked up before it was placed", order.id));
                }
                (true, None) => violations.push(format!("{} picked up without a timestamp", order.id)),
                _ => {}
            }
            match (order.delivered, order.delivered_at, order.picked_up_at) {
                (true, Some(d), Some(p)) if d < p => {
                    violations.push(format!("{} delivered before pickup", order.id));
                }
                (true, Some(_), None) | (true, None, _) => {
                    violations.push(format!("{} delivered without complete timestamps", order.id));
                }
                _ => {}
            }
        }
        violations
    }
}
