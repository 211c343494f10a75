//! Dispatch policy: nearest driver with spare capacity.
//!
//! Dispatch is stateless between calls.  Each call takes the front order of
//! one restaurant's queue, ranks every driver by network distance from the
//! restaurant to the driver's snapshot node, and offers the order down the
//! ranking until a driver accepts.  An order nobody accepts stays at the
//! front of the queue and is offered again next tick.

use fleet_agent::Registry;
use fleet_core::{DriverId, NodeId, OrderId, RestaurantId};
use fleet_spatial::{DistanceOracle, Router, SpatialError};

use crate::SimResult;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// The queue was empty.
    Idle,
    Assigned {
        order:    OrderId,
        driver:   DriverId,
        distance: f64,
    },
    /// Every reachable driver is at capacity; the order stays queued.
    NoEligibleDriver { order: OrderId },
}

/// Result of one [`allocate`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub outcome:     DispatchOutcome,
    /// Drivers left out of the ranking because no path joins them to the
    /// restaurant.
    pub unreachable: Vec<(DriverId, SpatialError)>,
}

/// Offer the front order of `restaurant`'s queue to the nearest driver with
/// spare capacity.
///
/// `driver_nodes[i]` is the snapshot node of `DriverId(i)`.  Candidates are
/// sorted by distance, ties broken by ascending driver id.
pub fn allocate<R: Router>(
    restaurant:   RestaurantId,
    registry:     &mut Registry,
    oracle:       &mut DistanceOracle<R>,
    driver_nodes: &[NodeId],
) -> SimResult<Allocation> {
    let r = registry.restaurant(restaurant)?;
    let Some(&order) = r.queue.front() else {
        return Ok(Allocation { outcome: DispatchOutcome::Idle, unreachable: Vec::new() });
    };
    let from = r.node;

    let mut unreachable = Vec::new();
    let mut ranking: Vec<(f64, DriverId)> = Vec::with_capacity(driver_nodes.len());
    for (i, &node) in driver_nodes.iter().enumerate() {
        let driver = DriverId(i as u32);
        match oracle.shortest_distance(from, node) {
            Ok(d)  => ranking.push((d, driver)),
            Err(e) => unreachable.push((driver, e)),
        }
    }
    ranking.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let Registry { drivers, orders, restaurants, .. } = registry;
    for (distance, driver) in ranking {
        if drivers[driver.index()].accept(&mut orders[order.index()]) {
            restaurants[restaurant.index()].queue.pop_front();
            return Ok(Allocation {
                outcome: DispatchOutcome::Assigned { order, driver, distance },
                unreachable,
            });
        }
    }
    Ok(Allocation { outcome: DispatchOutcome::NoEligibleDriver { order }, unreachable })
}
