//! Integration tests for fleet-sim.

use fleet_core::{FleetConfig, NodeId, Point, Tick};
use fleet_spatial::{DijkstraRouter, RoadNetwork, RoadNetworkBuilder};

use crate::{Sim, SimBuilder, SimObserver, SimState};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config() -> FleetConfig {
    FleetConfig {
        speed:                      1.0,
        capacity:                   1,
        driver_handoff_threshold:   1.0,
        customer_handoff_threshold: 1.0,
        total_ticks:                100,
        seed:                       7,
        snapshot_interval_ticks:    0,
    }
}

/// `n` nodes in a line at x = 0, 1, 2, …: 0 ↔ 1 ↔ … ↔ n-1.
fn line_network(n: u32) -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let nodes: Vec<NodeId> = (0..n).map(|i| b.add_node(Point::new(i as f64, 0.0))).collect();
    for w in nodes.windows(2) {
        b.add_road(w[0], w[1]);
    }
    b.build()
}

/// `w × h` unit grid; node `y * w + x` sits at (x, y).
fn grid_network(w: u32, h: u32) -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    for y in 0..h {
        for x in 0..w {
            b.add_node(Point::new(x as f64, y as f64));
        }
    }
    for y in 0..h {
        for x in 0..w {
            let id = NodeId(y * w + x);
            if x + 1 < w {
                b.add_road(id, NodeId(id.0 + 1));
            }
            if y + 1 < h {
                b.add_road(id, NodeId(id.0 + w));
            }
        }
    }
    b.build()
}

/// Checks every cross-entity invariant after each tick.
#[derive(Default)]
struct InvariantChecker {
    ticks: u64,
}

impl SimObserver for InvariantChecker {
    fn on_snapshot(&mut self, tick: Tick, registry: &fleet_agent::Registry, _state: &SimState) {
        let violations = registry.invariant_violations();
        assert!(violations.is_empty(), "{tick}: {violations:?}");
        self.ticks += 1;
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use fleet_core::{CustomerId, DriverId, RestaurantId};

    use super::*;
    use crate::NoopObserver;

    #[test]
    fn single_driver_pickup_then_delivery() {
        // Home 0, restaurant 2, customer 4: two edges each way.
        let mut sim = SimBuilder::new(test_config(), line_network(5), DijkstraRouter)
            .restaurant(NodeId(2))
            .customer(NodeId(4))
            .driver(NodeId(0))
            .build()
            .unwrap();
        let id = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.orders[0].driver, Some(DriverId(0)));
        assert!(!sim.registry.orders[0].picked_up);

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let order = sim.registry.order(id).unwrap();
        assert!(order.picked_up);
        assert_eq!(order.picked_up_at, Some(Tick(1)));

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert!(!sim.registry.orders[0].delivered);

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let order = sim.registry.order(id).unwrap();
        assert!(order.delivered);
        assert_eq!(order.delivered_at, Some(Tick(3)));
        assert_eq!(order.distance_traveled, 2.0);
        assert_eq!(sim.state.completed_orders, 1);
        assert_eq!(sim.registry.drivers[0].pos, Point::new(4.0, 0.0));
    }

    #[test]
    fn closer_driver_gets_first_order() {
        // Restaurant 3; driver 0 at distance 3, driver 1 at distance 2.
        let mut sim = SimBuilder::new(test_config(), line_network(7), DijkstraRouter)
            .restaurant(NodeId(3))
            .customer(NodeId(6))
            .driver(NodeId(0))
            .driver(NodeId(5))
            .build()
            .unwrap();
        let first = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        let second = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(first).unwrap().driver, Some(DriverId(1)));
        assert_eq!(sim.registry.order(second).unwrap().driver, None);
        assert_eq!(sim.registry.queued_orders(), 1);

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(second).unwrap().driver, Some(DriverId(0)));
        assert_eq!(sim.registry.queued_orders(), 0);
    }

    #[test]
    fn equidistant_drivers_favour_lower_id() {
        let mut sim = SimBuilder::new(test_config(), line_network(7), DijkstraRouter)
            .restaurant(NodeId(3))
            .customer(NodeId(6))
            .driver(NodeId(5))
            .driver(NodeId(1))
            .build()
            .unwrap();
        let id = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(id).unwrap().driver, Some(DriverId(0)));
    }

    #[test]
    fn full_driver_is_skipped_even_if_closest() {
        let mut sim = SimBuilder::new(test_config(), line_network(7), DijkstraRouter)
            .restaurant(NodeId(3))
            .customer(NodeId(6))
            .driver(NodeId(3))
            .driver(NodeId(0))
            .build()
            .unwrap();
        let first = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(first).unwrap().driver, Some(DriverId(0)));
        assert_eq!(sim.driver_nodes[0], NodeId(3));

        let second = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(second).unwrap().driver, Some(DriverId(1)));
    }

    #[test]
    fn order_waits_while_every_driver_is_full() {
        let mut sim = SimBuilder::new(test_config(), line_network(5), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(4))
            .driver(NodeId(0))
            .build()
            .unwrap();
        sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        let second = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();

        // Pickup at T0, delivery at T4: the second order waits until T5.
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(second).unwrap().driver, None);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(second).unwrap().driver, Some(DriverId(0)));
        assert_eq!(sim.state.routing_failures, 0);
    }

    #[test]
    fn handoff_transfers_and_locks() {
        // Drivers start on their restaurants (nodes 2 and 3); customers at 7
        // and 8.  After one tick of travel their next nodes (4, 5) and final
        // nodes (7, 8) are one unit apart.
        let mut config = test_config();
        config.capacity = 2;
        let mut sim = SimBuilder::new(config, line_network(9), DijkstraRouter)
            .restaurant(NodeId(2))
            .restaurant(NodeId(3))
            .customer(NodeId(7))
            .customer(NodeId(8))
            .driver(NodeId(2))
            .driver(NodeId(3))
            .build()
            .unwrap();
        let moved = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        let kept = sim.place_order(RestaurantId(1), CustomerId(1)).unwrap();
        let mut log = crate::EventLog::new();

        sim.run_ticks(1, &mut log).unwrap();
        assert_eq!(sim.state.handoffs, 0, "no handoff while still heading to restaurants");
        sim.run_ticks(1, &mut log).unwrap();

        let order = sim.registry.order(moved).unwrap();
        assert_eq!(order.driver, Some(DriverId(1)));
        assert!(order.handed_off);
        assert_eq!(order.handoffs, 1);
        assert!(!sim.registry.order(kept).unwrap().handed_off);
        assert_eq!(sim.state.handoffs, 1);
        assert!(sim.registry.drivers[0].carrying.is_empty());
        assert_eq!(sim.registry.drivers[1].carrying.len(), 2);

        let handoffs: Vec<_> = log.handoffs().collect();
        assert_eq!(handoffs.len(), 1);
        assert_eq!(
            handoffs[0],
            &(Tick(1), crate::FleetEvent::HandedOff {
                order:   moved,
                from:    DriverId(0),
                to:      DriverId(1),
                release: Tick(3),
            })
        );

        // ceil(1.0 / 1.0) = 1 tick standing still.
        let before: Vec<Point> = sim.registry.drivers.iter().map(|d| d.pos).collect();
        sim.run_ticks(1, &mut log).unwrap();
        let during: Vec<Point> = sim.registry.drivers.iter().map(|d| d.pos).collect();
        assert_eq!(before, during);
        sim.run_ticks(1, &mut log).unwrap();
        for (d, p) in sim.registry.drivers.iter().zip(&during) {
            assert_ne!(d.pos, *p, "{} should move again once released", d.id);
        }
        assert_eq!(sim.state.handoffs, 1);
    }

    #[test]
    fn lock_lasts_ceil_of_distance_over_slower_speed() {
        let mut config = test_config();
        config.capacity = 2;
        config.driver_handoff_threshold = 2.0;
        config.customer_handoff_threshold = 2.0;
        // At T1 the next nodes are 3 and 5.  Driver 1 is slower:
        // release = T1 + 1 + ceil(2.0 / 0.75) = T5.
        let mut sim = SimBuilder::new(config, line_network(12), DijkstraRouter)
            .restaurant(NodeId(1))
            .restaurant(NodeId(4))
            .customer(NodeId(9))
            .customer(NodeId(11))
            .driver(NodeId(1))
            .driver_with(NodeId(4), 0.75, 2)
            .build()
            .unwrap();
        sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.place_order(RestaurantId(1), CustomerId(1)).unwrap();
        let mut log = crate::EventLog::new();
        sim.run_ticks(2, &mut log).unwrap();

        let (tick, event) = log.handoffs().next().cloned().unwrap();
        assert_eq!(tick, Tick(1));
        let crate::FleetEvent::HandedOff { release, .. } = &event else {
            panic!("expected a handoff, got {event:?}");
        };
        assert_eq!(*release, Tick(5));
        assert!(sim.registry.drivers.iter().all(|d| d.lock_release == Tick(5)));
        assert!(sim.registry.drivers[0].is_locked(Tick(4)));
        assert!(!sim.registry.drivers[0].is_locked(Tick(5)));
    }

    #[test]
    fn lock_release_saturates() {
        use crate::handoff::lock_release;
        assert_eq!(lock_release(Tick(5), 2.0, 0.75), Tick(9));
        assert_eq!(lock_release(Tick(1), 0.0, 1.0), Tick(2));
        assert_eq!(lock_release(Tick(5), 1.0, 1e-300), Tick(u64::MAX));
        assert_eq!(lock_release(Tick(u64::MAX), 1.0, 1.0), Tick(u64::MAX));
    }

    /// Two drivers on a line, each starting on its restaurant with one order
    /// for the matching customer.  The second driver's capacity and customer
    /// node are parameters; everything else converges as in
    /// `handoff_transfers_and_locks`.
    fn converging_pair(nodes: u32, second_customer: u32, second_capacity: usize) -> Sim<DijkstraRouter> {
        let mut config = test_config();
        config.capacity = 2;
        let mut sim = SimBuilder::new(config, line_network(nodes), DijkstraRouter)
            .restaurant(NodeId(2))
            .restaurant(NodeId(3))
            .restaurant(NodeId(5))
            .customer(NodeId(7))
            .customer(NodeId(second_customer))
            .driver(NodeId(2))
            .driver_with(NodeId(3), 1.0, second_capacity)
            .build()
            .unwrap();
        sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.place_order(RestaurantId(1), CustomerId(1)).unwrap();
        sim
    }

    fn assert_no_handoff(sim: &Sim<DijkstraRouter>) {
        assert_eq!(sim.state.handoffs, 0);
        assert!(sim.registry.orders.iter().all(|o| !o.handed_off && o.handoffs == 0));
        assert!(sim.registry.drivers.iter().all(|d| d.lock_release == Tick::ZERO));
    }

    #[test]
    fn one_handoff_per_driver_per_pass() {
        // Three drivers converge; only the first pair trades.
        let mut config = test_config();
        config.capacity = 2;
        let mut sim = SimBuilder::new(config, line_network(11), DijkstraRouter)
            .restaurant(NodeId(2))
            .restaurant(NodeId(3))
            .restaurant(NodeId(4))
            .customer(NodeId(7))
            .customer(NodeId(8))
            .customer(NodeId(9))
            .driver(NodeId(2))
            .driver(NodeId(3))
            .driver(NodeId(4))
            .build()
            .unwrap();
        let moved = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        let second = sim.place_order(RestaurantId(1), CustomerId(1)).unwrap();
        let third = sim.place_order(RestaurantId(2), CustomerId(2)).unwrap();
        let mut log = crate::EventLog::new();
        sim.run_ticks(2, &mut log).unwrap();

        assert_eq!(sim.state.handoffs, 1);
        assert_eq!(log.handoffs().count(), 1);
        assert!(sim.registry.order(moved).unwrap().handed_off);
        assert!(!sim.registry.order(second).unwrap().handed_off);
        assert!(!sim.registry.order(third).unwrap().handed_off);
        assert_eq!(sim.registry.order(third).unwrap().driver, Some(DriverId(2)));

        let loads: Vec<usize> = sim.registry.drivers.iter().map(|d| d.load()).collect();
        assert_eq!(loads, vec![0, 2, 1]);
        let locks: Vec<Tick> = sim.registry.drivers.iter().map(|d| d.lock_release).collect();
        assert_eq!(locks, vec![Tick(3), Tick(3), Tick::ZERO]);

        // While the pair stands still the third driver keeps moving and
        // cannot trade with either locked driver.
        let before: Vec<Point> = sim.registry.drivers.iter().map(|d| d.pos).collect();
        sim.run_ticks(1, &mut log).unwrap();
        assert_eq!(sim.registry.drivers[0].pos, before[0]);
        assert_eq!(sim.registry.drivers[1].pos, before[1]);
        assert_ne!(sim.registry.drivers[2].pos, before[2]);
        assert_eq!(sim.state.handoffs, 1);
        assert_eq!(sim.registry.drivers[2].carrying, vec![third]);
    }

    #[test]
    fn full_receiver_is_skipped() {
        let mut sim = converging_pair(9, 8, 1);
        sim.run_ticks(2, &mut NoopObserver).unwrap();
        assert_no_handoff(&sim);
        assert_eq!(sim.registry.drivers[0].carrying.len(), 1);
        assert_eq!(sim.registry.drivers[1].carrying.len(), 1);
        assert_eq!(sim.registry.orders[0].driver, Some(DriverId(0)));
    }

    #[test]
    fn driver_with_pending_order_is_skipped() {
        let mut sim = converging_pair(9, 8, 2);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        // Driver 1 is nearer the third restaurant and turns back for it.
        let extra = sim.place_order(RestaurantId(2), CustomerId(1)).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        assert_eq!(sim.registry.drivers[1].pending, vec![extra]);
        assert_eq!(sim.registry.drivers[1].next_node(), NodeId(5));
        assert_eq!(sim.registry.drivers[0].next_node(), NodeId(4));
        assert_no_handoff(&sim);
    }

    #[test]
    fn distant_customers_block_handoff() {
        // Drivers meet (next nodes 4 and 5) but their customers are 3 apart.
        let mut sim = converging_pair(11, 10, 2);
        let mut log = crate::EventLog::new();
        sim.run_ticks(2, &mut log).unwrap();
        assert_eq!(sim.registry.drivers[0].next_node(), NodeId(4));
        assert_eq!(sim.registry.drivers[1].next_node(), NodeId(5));
        assert_no_handoff(&sim);

        sim.run_ticks(8, &mut log).unwrap();
        assert_eq!(sim.state.completed_orders, 2);
        assert_eq!(sim.state.handoffs, 0);
        assert_eq!(log.handoffs().count(), 0);
        assert_eq!(sim.registry.orders[0].driver, Some(DriverId(0)));
        assert_eq!(sim.registry.orders[1].driver, Some(DriverId(1)));
    }

    #[test]
    fn already_at_target_resolves_same_tick() {
        // Restaurant and customer share the driver's home node.
        let mut sim = SimBuilder::new(test_config(), line_network(3), DijkstraRouter)
            .restaurant(NodeId(1))
            .customer(NodeId(1))
            .driver(NodeId(1))
            .build()
            .unwrap();
        let id = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.registry.order(id).unwrap().picked_up_at, Some(Tick(0)));
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        let order = sim.registry.order(id).unwrap();
        assert_eq!(order.delivered_at, Some(Tick(1)));
        assert_eq!(order.distance_traveled, 0.0);
        assert_eq!(sim.registry.drivers[0].odometer, 0.0);
        assert_eq!(sim.registry.drivers[0].pos, Point::new(1.0, 0.0));
    }
}

// ── Whole runs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use super::*;
    use crate::{EventLog, FleetEvent, NoopObserver, RandomOrders};

    fn busy_sim(seed: u64) -> Sim<DijkstraRouter> {
        let mut config = test_config();
        config.capacity = 2;
        config.seed = seed;
        config.total_ticks = 300;
        config.snapshot_interval_ticks = 1;
        config.driver_handoff_threshold = 2.0;
        config.customer_handoff_threshold = 2.0;
        SimBuilder::new(config, grid_network(6, 6), DijkstraRouter)
            .restaurant(NodeId(0))
            .restaurant(NodeId(14))
            .restaurant(NodeId(35))
            .customer_at(Point::new(5.0, 0.2))
            .customer_at(Point::new(0.1, 5.0))
            .customer_at(Point::new(3.0, 3.0))
            .customer_at(Point::new(4.9, 4.1))
            .driver(NodeId(7))
            .driver(NodeId(21))
            .driver_with(NodeId(28), 0.5, 3)
            .driver_with(NodeId(10), 1.5, 1)
            .order_source(RandomOrders::new(seed, 0.4).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn invariants_hold_every_tick() {
        let mut sim = busy_sim(11);
        let mut checker = InvariantChecker::default();
        sim.run(&mut checker).unwrap();
        assert_eq!(checker.ticks, 300);
        assert_eq!(sim.now(), Tick(300));
        assert!(sim.state.placed_orders > 50);
        assert!(sim.state.completed_orders > 0);
        assert_eq!(sim.state.completed_orders as usize, sim.registry.delivered_orders());
        assert_eq!(sim.state.routing_failures, 0);
        for d in &sim.registry.drivers {
            assert!(d.load() <= d.capacity);
        }
    }

    #[test]
    fn identical_seeds_give_identical_runs() {
        let mut a = EventLog::new();
        let mut b = EventLog::new();
        busy_sim(3).run(&mut a).unwrap();
        busy_sim(3).run(&mut b).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn events_follow_order_lifecycle() {
        let mut sim = busy_sim(5);
        let mut log = EventLog::new();
        sim.run(&mut log).unwrap();

        let delivered = sim.registry.orders.iter().find(|o| o.delivered).unwrap();
        let kinds: Vec<&str> = log
            .for_order(delivered.id)
            .filter_map(|(_, e)| match e {
                FleetEvent::OrderPlaced { .. }   => Some("placed"),
                FleetEvent::OrderAssigned { .. } => Some("assigned"),
                FleetEvent::PickedUp { .. }      => Some("picked"),
                FleetEvent::Delivered { .. }     => Some("delivered"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, ["placed", "assigned", "picked", "delivered"]);

        let handoffs = log.handoffs().count() as u64;
        assert_eq!(handoffs, sim.state.handoffs);
    }

    #[test]
    fn run_until_stops_when_predicate_holds() {
        let mut sim = busy_sim(9);
        let reached = sim
            .run_until(|s| s.state.completed_orders >= 3, 1_000, &mut NoopObserver)
            .unwrap();
        assert!(reached);
        assert!(sim.state.completed_orders >= 3);
        assert!(sim.now() < Tick(1_000));
    }
}

// ── Observer hooks ────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;
    use crate::TickSummary;

    #[derive(Default)]
    struct Counter {
        starts:    u64,
        ends:      u64,
        snapshots: Vec<Tick>,
        sim_end:   Option<Tick>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _summary: &TickSummary) {
            self.ends += 1;
        }
        fn on_snapshot(&mut self, tick: Tick, _registry: &fleet_agent::Registry, _state: &SimState) {
            self.snapshots.push(tick);
        }
        fn on_sim_end(&mut self, final_tick: Tick, _state: &SimState) {
            self.sim_end = Some(final_tick);
        }
    }

    #[test]
    fn hooks_fire_per_tick_and_interval() {
        let mut config = test_config();
        config.total_ticks = 10;
        config.snapshot_interval_ticks = 3;
        let mut sim = SimBuilder::new(config, line_network(3), DijkstraRouter)
            .driver(NodeId(0))
            .build()
            .unwrap();
        let mut counter = Counter::default();
        sim.run(&mut counter).unwrap();
        assert_eq!(counter.starts, 10);
        assert_eq!(counter.ends, 10);
        assert_eq!(counter.snapshots, vec![Tick(0), Tick(3), Tick(6), Tick(9)]);
        assert_eq!(counter.sim_end, Some(Tick(10)));
    }

    #[test]
    fn run_ticks_ignores_budget_and_skips_sim_end() {
        let mut config = test_config();
        config.total_ticks = 2;
        let mut sim = SimBuilder::new(config, line_network(3), DijkstraRouter)
            .build()
            .unwrap();
        let mut counter = Counter::default();
        sim.run_ticks(5, &mut counter).unwrap();
        assert_eq!(sim.now(), Tick(5));
        assert_eq!(counter.sim_end, None);
    }

    #[test]
    fn tick_summary_counts() {
        let mut sim = SimBuilder::new(test_config(), line_network(3), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(2))
            .driver(NodeId(1))
            .build()
            .unwrap();
        sim.place_order(fleet_core::RestaurantId(0), fleet_core::CustomerId(0)).unwrap();
        let summary = sim.tick(&mut crate::NoopObserver).unwrap();
        assert_eq!(summary.tick, Tick(0));
        assert_eq!(summary.assigned, 1);
        assert_eq!(summary.moving_drivers, 1);
        assert_eq!(summary.queued, 0);
        assert_eq!(summary.delivered, 0);
    }
}

// ── Order intake ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod intake {
    use fleet_core::{CustomerId, RestaurantId};

    use super::*;
    use crate::{NoopObserver, OrderSource, RandomOrders, ScheduledOrders};

    #[test]
    fn scheduled_orders_are_placed_on_their_tick() {
        let schedule = ScheduledOrders::new()
            .at(Tick(0), RestaurantId(0), CustomerId(0))
            .at(Tick(3), RestaurantId(0), CustomerId(0))
            .at(Tick(3), RestaurantId(0), CustomerId(0));
        assert_eq!(schedule.len(), 3);

        let mut config = test_config();
        config.capacity = 3;
        let mut sim = SimBuilder::new(config, line_network(4), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(3))
            .driver(NodeId(0))
            .order_source(schedule)
            .build()
            .unwrap();
        sim.run_ticks(5, &mut NoopObserver).unwrap();

        let placed: Vec<Tick> = sim.registry.orders.iter().map(|o| o.placed_at).collect();
        assert_eq!(placed, vec![Tick(0), Tick(3), Tick(3)]);
        assert_eq!(sim.state.placed_orders, 3);
    }

    #[test]
    fn overdue_requests_release_on_next_tick() {
        let mut schedule = ScheduledOrders::new();
        schedule.push(Tick(1), RestaurantId(0), CustomerId(0));
        schedule.push(Tick(4), RestaurantId(0), CustomerId(0));
        let registry = fleet_agent::Registry::new();
        assert_eq!(schedule.orders_for(Tick(2), &registry).len(), 1);
        assert_eq!(schedule.orders_for(Tick(3), &registry).len(), 0);
        assert_eq!(schedule.orders_for(Tick(4), &registry).len(), 1);
        assert!(schedule.is_empty());
    }

    #[test]
    fn random_orders_are_seeded() {
        let mut registry = fleet_agent::Registry::new();
        registry.add_restaurant(Point::new(0.0, 0.0), NodeId(0));
        registry.add_restaurant(Point::new(1.0, 0.0), NodeId(1));
        registry.add_customer(Point::new(2.0, 0.0), NodeId(2));

        let draw = |seed| {
            let mut source = RandomOrders::new(seed, 0.5).unwrap();
            (0..100).flat_map(|t| source.orders_for(Tick(t), &registry)).collect::<Vec<_>>()
        };
        let a = draw(1);
        assert_eq!(a, draw(1));
        assert!(!a.is_empty() && a.len() < 100);
        assert!(a.iter().all(|r| r.restaurant.0 < 2 && r.customer == CustomerId(0)));
    }

    #[test]
    fn random_orders_need_endpoints() {
        let registry = fleet_agent::Registry::new();
        let mut source = RandomOrders::new(1, 1.0).unwrap();
        assert!(source.orders_for(Tick(0), &registry).is_empty());
    }

    #[test]
    fn random_orders_reject_bad_rates() {
        for rate in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let err = RandomOrders::new(1, rate).unwrap_err();
            assert!(matches!(err, crate::SimError::Config(_)), "{rate}: {err}");
        }
        assert_eq!(RandomOrders::new(1, 0.0).unwrap().rate(), 0.0);
    }
}

// ── Routing failures ──────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use fleet_core::{CustomerId, DriverId, RestaurantId};
    use fleet_spatial::SpatialError;

    use super::*;
    use crate::{EventLog, FleetEvent};

    /// Line 0 ↔ 1 ↔ 2 plus an isolated island node 3.
    fn split_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        let n: Vec<NodeId> = (0..3).map(|i| b.add_node(Point::new(i as f64, 0.0))).collect();
        b.add_node(Point::new(10.0, 10.0));
        b.add_road(n[0], n[1]);
        b.add_road(n[1], n[2]);
        b.build()
    }

    #[test]
    fn unreachable_driver_is_excluded_from_dispatch() {
        let mut sim = SimBuilder::new(test_config(), split_network(), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(2))
            .driver(NodeId(3))
            .driver(NodeId(2))
            .build()
            .unwrap();
        let id = sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        let mut log = EventLog::new();
        sim.run_ticks(1, &mut log).unwrap();

        assert_eq!(sim.registry.order(id).unwrap().driver, Some(DriverId(1)));
        assert_eq!(sim.state.routing_failures, 1);
        assert!(log.events.iter().any(|(_, e)| matches!(
            e,
            FleetEvent::RoutingFailed { driver: DriverId(0), .. }
        )));
    }

    #[test]
    fn handoff_failure_blames_the_unreachable_driver() {
        // Two disconnected lines: 0 ↔ … ↔ 4 at y = 0 and 5 ↔ … ↔ 9 at y = 1.
        let mut b = RoadNetworkBuilder::new();
        let n: Vec<NodeId> = (0..10)
            .map(|i| b.add_node(Point::new((i % 5) as f64, (i / 5) as f64)))
            .collect();
        for w in n[..5].windows(2).chain(n[5..].windows(2)) {
            b.add_road(w[0], w[1]);
        }
        let mut config = test_config();
        config.capacity = 2;
        let mut sim = SimBuilder::new(config, b.build(), DijkstraRouter)
            .restaurant(NodeId(1))
            .restaurant(NodeId(6))
            .customer(NodeId(4))
            .customer(NodeId(9))
            .driver(NodeId(1))
            .driver(NodeId(6))
            .build()
            .unwrap();
        sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.place_order(RestaurantId(1), CustomerId(1)).unwrap();
        let mut log = EventLog::new();
        sim.run_ticks(2, &mut log).unwrap();

        // T1 has no dispatch, so the only failure comes from the handoff pass.
        let failures: Vec<_> = log
            .events
            .iter()
            .filter_map(|(t, e)| match e {
                FleetEvent::RoutingFailed { driver, error } if *t == Tick(1) => Some((*driver, error.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            failures,
            vec![(DriverId(1), SpatialError::UnreachableNodes { from: NodeId(3), to: NodeId(8) })]
        );
        assert_eq!(sim.state.handoffs, 0);
    }

    #[test]
    fn unreachable_target_skips_the_driver_but_not_the_run() {
        // The only driver lives on the island; the order is queued forever.
        let mut sim = SimBuilder::new(test_config(), split_network(), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(2))
            .driver(NodeId(3))
            .build()
            .unwrap();
        sim.place_order(RestaurantId(0), CustomerId(0)).unwrap();
        sim.run_ticks(4, &mut crate::NoopObserver).unwrap();
        assert_eq!(sim.registry.queued_orders(), 1);
        assert_eq!(sim.state.routing_failures, 4);
        assert_eq!(sim.state.completed_orders, 0);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use fleet_core::{CustomerId, FleetError, RestaurantId};
    use fleet_spatial::SpatialError;

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_with_coordinates_snapped() {
        let sim = SimBuilder::new(test_config(), grid_network(3, 3), DijkstraRouter)
            .restaurant_at(Point::new(0.1, 0.2))
            .customer_at(Point::new(1.9, 2.2))
            .driver_at(Point::new(1.2, 0.9))
            .build()
            .unwrap();
        assert_eq!(sim.registry.restaurants[0].node, NodeId(0));
        assert_eq!(sim.registry.restaurants[0].pos, Point::new(0.1, 0.2));
        assert_eq!(sim.registry.customers[0].node, NodeId(8));
        let d = &sim.registry.drivers[0];
        assert_eq!(d.home, NodeId(4));
        assert_eq!(d.pos, Point::new(1.0, 1.0));
        assert_eq!(sim.driver_nodes, vec![NodeId(4)]);
    }

    #[test]
    fn driver_defaults_come_from_config() {
        let mut config = test_config();
        config.speed = 2.5;
        config.capacity = 4;
        let sim = SimBuilder::new(config, line_network(3), DijkstraRouter)
            .driver(NodeId(0))
            .driver_with(NodeId(1), 0.5, 1)
            .build()
            .unwrap();
        assert_eq!((sim.registry.drivers[0].speed, sim.registry.drivers[0].capacity), (2.5, 4));
        assert_eq!((sim.registry.drivers[1].speed, sim.registry.drivers[1].capacity), (0.5, 1));
    }

    #[test]
    fn invalid_config_errors() {
        let mut config = test_config();
        config.speed = 0.0;
        let result = SimBuilder::new(config, line_network(3), DijkstraRouter).build();
        assert!(matches!(result, Err(SimError::Fleet(FleetError::Config(_)))));
    }

    #[test]
    fn invalid_driver_override_errors() {
        let result = SimBuilder::new(test_config(), line_network(3), DijkstraRouter)
            .driver_with(NodeId(0), 1.0, 0)
            .build();
        assert!(matches!(result, Err(SimError::Fleet(FleetError::Config(_)))));
    }

    #[test]
    fn unknown_node_errors() {
        let result = SimBuilder::new(test_config(), line_network(3), DijkstraRouter)
            .restaurant(NodeId(9))
            .build();
        assert!(matches!(
            result,
            Err(SimError::Spatial(SpatialError::NodeNotFound(NodeId(9))))
        ));
    }

    #[test]
    fn empty_network_errors() {
        let result = SimBuilder::new(test_config(), RoadNetwork::empty(), DijkstraRouter).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn place_order_rejects_unknown_ids() {
        let mut sim = SimBuilder::new(test_config(), line_network(3), DijkstraRouter)
            .restaurant(NodeId(0))
            .customer(NodeId(2))
            .build()
            .unwrap();
        assert!(matches!(
            sim.place_order(RestaurantId(3), CustomerId(0)),
            Err(SimError::Fleet(FleetError::RestaurantNotFound(_)))
        ));
        assert_eq!(sim.state.placed_orders, 0);
    }
}
