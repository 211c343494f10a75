//! A single delivery order and its lifecycle.

use fleet_core::{CustomerId, DriverId, NodeId, OrderId, RestaurantId, Tick};

/// Coarse lifecycle stage, derived from the order's fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderStatus {
    /// In a restaurant queue, no driver yet.
    Queued,
    /// Assigned to a driver that has not picked it up.
    Assigned,
    /// Picked up, on its way to the customer.
    InTransit,
    Delivered,
}

/// One order from a restaurant to a customer.
///
/// Mutated only by dispatch (assignment), the driver agent (pickup and
/// delivery) and the handoff coordinator (reassignment).  Once `delivered`
/// is set no further mutation happens.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:         OrderId,
    pub restaurant: RestaurantId,
    pub customer:   CustomerId,

    /// Restaurant node, resolved when the order is placed.
    pub pickup_node:  NodeId,
    /// Customer node, resolved when the order is placed.
    pub dropoff_node: NodeId,

    /// Driver currently responsible; `None` while queued.
    pub driver: Option<DriverId>,

    pub placed_at:    Tick,
    pub picked_up_at: Option<Tick>,
    pub delivered_at: Option<Tick>,

    /// Distance the order has physically travelled inside a driver's vehicle.
    pub distance_traveled: f64,

    pub picked_up:  bool,
    pub delivered:  bool,
    pub handed_off: bool,
    /// How many times the order changed hands.
    pub handoffs:   u32,
}

impl Order {
    pub fn new(
        id:           OrderId,
        restaurant:   RestaurantId,
        customer:     CustomerId,
        pickup_node:  NodeId,
        dropoff_node: NodeId,
        placed_at:    Tick,
    ) -> Self {
        Self {
            id,
            restaurant,
            customer,
            pickup_node,
            dropoff_node,
            driver: None,
            placed_at,
            picked_up_at: None,
            delivered_at: None,
            distance_traveled: 0.0,
            picked_up: false,
            delivered: false,
            handed_off: false,
            handoffs: 0,
        }
    }

    pub fn status(&self) -> OrderStatus {
        if self.delivered {
            OrderStatus::Delivered
        } else if self.picked_up {
            OrderStatus::InTransit
        } else if self.driver.is_some() {
            OrderStatus::Assigned
        } else {
            OrderStatus::Queued
        }
    }

    pub(crate) fn mark_picked_up(&mut self, now: Tick) {
        self.picked_up = true;
        self.picked_up_at = Some(now);
    }

    pub(crate) fn mark_delivered(&mut self, now: Tick) {
        self.delivered = true;
        self.delivered_at = Some(now);
    }

    /// Record a transfer to `driver` by the handoff coordinator.
    pub fn hand_to(&mut self, driver: DriverId) {
        self.driver = Some(driver);
        self.handed_off = true;
        self.handoffs += 1;
    }

    /// Ticks from placement to delivery, once delivered.
    pub fn lead_time(&self) -> Option<u64> {
        self.delivered_at.map(|t| t.since(self.placed_at))
    }
}
