//! Restaurants (order origins) and customers (order destinations).

use std::collections::VecDeque;

use fleet_core::{CustomerId, NodeId, OrderId, Point, RestaurantId};

/// A restaurant with a fixed location and a FIFO queue of orders awaiting a
/// driver.
#[derive(Debug, Clone)]
pub struct Restaurant {
    pub id:    RestaurantId,
    pub pos:   Point,
    pub node:  NodeId,
    /// Every order ever placed here, in placement order.
    pub order_ids: Vec<OrderId>,
    /// Orders not yet assigned to a driver.  Dispatch always serves the front.
    pub queue: VecDeque<OrderId>,
}

impl Restaurant {
    pub fn new(id: RestaurantId, pos: Point, node: NodeId) -> Self {
        Self { id, pos, node, order_ids: Vec::new(), queue: VecDeque::new() }
    }

    #[inline]
    pub fn has_queued(&self) -> bool {
        !self.queue.is_empty()
    }
}

/// A customer with a fixed location.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id:        CustomerId,
    pub pos:       Point,
    pub node:      NodeId,
    pub order_ids: Vec<OrderId>,
}

impl Customer {
    pub fn new(id: CustomerId, pos: Point, node: NodeId) -> Self {
        Self { id, pos, node, order_ids: Vec::new() }
    }
}
