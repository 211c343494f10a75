//! grid_city: a small delivery fleet on a synthetic grid city.
//!
//! Five restaurants, a dozen customers and seven drivers on a 10 × 10 block
//! grid.  Orders arrive at random; drivers pick up, deliver, and hand off
//! orders to each other when their routes converge.
//!
//! Set `RUST_LOG=fleet_sim=debug` to follow every order.

mod network;

use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fleet_agent::{OrderStatus, Registry};
use fleet_core::{FleetConfig, NodeId, Point, Tick};
use fleet_sim::{FleetEvent, RandomOrders, SimBuilder, SimObserver, SimState, TickSummary};
use fleet_spatial::DijkstraRouter;

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const GRID_SIZE:      u32 = 10;
const SEED:           u64 = 42;
const SIM_TICKS:      u64 = 500;
const ORDER_RATE:     f64 = 0.3;  // chance of a new order each tick
const REPORT_EVERY:   u64 = 100;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    assigned:    usize,
    handoffs:    usize,
    busy_ticks:  u64,
    peak_queue:  usize,
}

impl SimObserver for Progress {
    fn on_event(&mut self, _tick: Tick, event: &FleetEvent) {
        match event {
            FleetEvent::OrderAssigned { .. } => self.assigned += 1,
            FleetEvent::HandedOff { .. }     => self.handoffs += 1,
            _ => {}
        }
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        if summary.moving_drivers > 0 {
            self.busy_ticks += 1;
        }
        self.peak_queue = self.peak_queue.max(summary.queued);
    }

    fn on_snapshot(&mut self, tick: Tick, registry: &Registry, state: &SimState) {
        tracing::info!(
            "{tick}: {} placed, {} delivered, {} in flight, {} handoffs",
            state.placed_orders,
            state.completed_orders,
            registry.orders.iter().filter(|o| o.status() == OrderStatus::InTransit).count(),
            state.handoffs
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== grid_city — rust_fleet delivery simulation ===");
    println!("Grid: {GRID_SIZE}×{GRID_SIZE}  |  Ticks: {SIM_TICKS}  |  Seed: {SEED}");
    println!();

    // 1. Road network.
    let network = build_network(GRID_SIZE);
    println!("Road network: {} nodes, {} arcs", network.node_count(), network.edge_count());

    // 2. Configuration.
    let config = FleetConfig {
        speed:                      0.8,
        capacity:                   2,
        driver_handoff_threshold:   1.5,
        customer_handoff_threshold: 2.0,
        total_ticks:                SIM_TICKS,
        seed:                       SEED,
        snapshot_interval_ticks:    REPORT_EVERY,
    };

    // 3. Entities.  Restaurants and customers are declared by coordinate and
    //    snapped onto the grid; drivers start on fixed junctions.
    let restaurants = [(1.2, 1.1), (8.0, 1.9), (4.6, 4.4), (1.0, 8.3), (7.7, 7.9)];
    let customers = [
        (0.0, 4.0), (2.9, 0.2), (5.1, 2.0), (9.0, 0.0), (9.2, 4.8), (6.3, 5.7),
        (3.0, 6.1), (0.4, 9.0), (4.0, 9.0), (6.8, 9.3), (9.0, 9.0), (2.2, 3.3),
    ];
    let mut builder = SimBuilder::new(config.clone(), network, DijkstraRouter);
    for (x, y) in restaurants {
        builder = builder.restaurant_at(Point::new(x, y));
    }
    for (x, y) in customers {
        builder = builder.customer_at(Point::new(x, y));
    }
    for home in [0, 9, 45, 54, 90, 99] {
        builder = builder.driver(NodeId(home));
    }
    // One scooter: fast but carries a single order.
    builder = builder.driver_with(NodeId(22), 1.4, 1);

    let mut sim = builder
        .order_source(RandomOrders::new(config.seed, ORDER_RATE)?)
        .build()?;

    // 4. Run.
    let mut progress = Progress::default();
    let t0 = Instant::now();
    sim.run(&mut progress)?;
    let elapsed = t0.elapsed();

    // 5. Summary.
    let mut lead_times: Vec<u64> = sim.registry.orders.iter().filter_map(|o| o.lead_time()).collect();
    lead_times.sort_unstable();
    let median = lead_times.get(lead_times.len() / 2).copied().unwrap_or(0);

    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  orders placed     : {}", sim.state.placed_orders);
    println!("  orders assigned   : {}", progress.assigned);
    println!("  orders delivered  : {}", sim.state.completed_orders);
    println!("  handoffs          : {}", progress.handoffs);
    println!("  routing failures  : {}", sim.state.routing_failures);
    println!("  median lead time  : {median} ticks");
    println!("  peak queue        : {}", progress.peak_queue);
    println!("  ticks with motion : {}", progress.busy_ticks);
    println!();

    // 6. Per-driver table.
    println!("{:<10} {:<7} {:<9} {:<10} {:<8}", "Driver", "Speed", "Capacity", "Delivered", "Odometer");
    println!("{}", "-".repeat(48));
    for d in &sim.registry.drivers {
        println!(
            "{:<10} {:<7.2} {:<9} {:<10} {:<8.1}",
            d.id.0,
            d.speed,
            d.capacity,
            d.delivered.len(),
            d.odometer,
        );
    }

    Ok(())
}
