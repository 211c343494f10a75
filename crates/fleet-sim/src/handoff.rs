//! Handoff coordinator: in-flight transfer of a carried order between two
//! nearby drivers heading to nearby customers.
//!
//! # Pass structure
//!
//! One pass per tick, after movement.  Pairs (A, B) are visited in ascending
//! id order with A < B, and the transfer always goes A → B.  A driver takes
//! part in at most one handoff per pass.  Both drivers are then locked until
//! the same release tick, standing still for
//! `ceil(driver_distance / min(speed_a, speed_b))` ticks.

use fleet_agent::{Driver, Registry};
use fleet_core::{DriverId, FleetConfig, NodeId, OrderId, Tick, ticks_to_cover};
use fleet_spatial::{DistanceOracle, Router, SpatialError};

/// One executed transfer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Handoff {
    pub order:           OrderId,
    pub from:            DriverId,
    pub to:              DriverId,
    pub driver_distance: f64,
    /// First tick at which both drivers may move again.
    pub release:         Tick,
}

/// Everything a [`scan`] pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandoffPass {
    pub handoffs:    Vec<Handoff>,
    pub unreachable: Vec<(DriverId, SpatialError)>,
}

/// First tick at which two drivers locked at `now` may move again, given
/// the distance between them and the slower driver's speed.
pub fn lock_release(now: Tick, driver_distance: f64, speed: f64) -> Tick {
    now.offset(ticks_to_cover(driver_distance, speed).saturating_add(1))
}

/// The driver to blame for a failed distance query between `a`'s node and
/// `b`'s node: the owner of the node that could not be reached, or of the
/// node missing from the network.
fn culprit(error: &SpatialError, (a, node_a): (DriverId, NodeId), (b, node_b): (DriverId, NodeId)) -> DriverId {
    match *error {
        SpatialError::UnreachableNodes { to, .. } if to == node_b => b,
        SpatialError::NodeNotFound(node) if node == node_b && node != node_a => b,
        _ => a,
    }
}

/// `true` if `d` could give or receive a carried order at `now`.  A driver
/// awaiting a retarget has a stale task index and is skipped.
fn eligible(d: &Driver, now: Tick) -> bool {
    d.task.is_heading_to_customer()
        && !d.needs_retarget
        && d.pending.is_empty()
        && !d.is_locked(now)
        && !d.path.is_empty()
}

/// Scan every driver pair once and execute qualifying handoffs.
pub fn scan<R: Router>(
    now:      Tick,
    registry: &mut Registry,
    oracle:   &mut DistanceOracle<R>,
    config:   &FleetConfig,
) -> HandoffPass {
    let mut pass = HandoffPass::default();
    let n = registry.drivers.len();
    let mut touched = vec![false; n];
    let Registry { drivers, orders, .. } = registry;

    for a in 0..n {
        for b in (a + 1)..n {
            if touched[a] {
                break;
            }
            if touched[b] {
                continue;
            }
            let (da, db) = (&drivers[a], &drivers[b]);
            if !eligible(da, now) || !eligible(db, now) || !db.has_capacity() {
                continue;
            }
            let (Some(final_a), Some(final_b)) = (da.final_node(), db.final_node()) else {
                continue;
            };

            let (next_a, next_b) = (da.next_node(), db.next_node());
            let driver_distance = match oracle.shortest_distance(next_a, next_b) {
                Ok(d)  => d,
                Err(e) => {
                    pass.unreachable.push((culprit(&e, (da.id, next_a), (db.id, next_b)), e));
                    continue;
                }
            };
            if driver_distance > config.driver_handoff_threshold {
                continue;
            }
            match oracle.shortest_distance(final_a, final_b) {
                Ok(d) if d <= config.customer_handoff_threshold => {}
                Ok(_) => continue,
                Err(e) => {
                    pass.unreachable.push((culprit(&e, (da.id, final_a), (db.id, final_b)), e));
                    continue;
                }
            }

            let speed = da.speed.min(db.speed);
            let Some(order) = drivers[a].release_active_delivery() else {
                continue;
            };
            let (from, to) = (drivers[a].id, drivers[b].id);
            orders[order.index()].hand_to(to);
            drivers[b].receive_delivery(order);

            let release = lock_release(now, driver_distance, speed);
            for i in [a, b] {
                let d = &mut drivers[i];
                d.lock_until(release);
                if let Err(e) = d.update_target(orders, oracle) {
                    // The flag stays set; the driver retries once released.
                    pass.unreachable.push((d.id, e));
                }
            }
            touched[a] = true;
            touched[b] = true;
            pass.handoffs.push(Handoff { order, from, to, driver_distance, release });
        }
    }
    pass
}
