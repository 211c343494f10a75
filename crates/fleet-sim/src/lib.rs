//! `fleet-sim`: tick loop orchestrator for the rust_fleet simulation.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ⓪ Intake:   the OrderSource places this tick's orders.
//!   ① Dispatch: clear the distance cache; each restaurant with a queued
//!               order (ascending id) offers its front order to the
//!               nearest driver with spare capacity.
//!   ② Movement: each unlocked driver retargets if its orders changed,
//!               then advances one step.
//!   ③ Handoff:  one pass over driver pairs (A < B); transfers go A → B.
//!   ④ Snapshot: record each driver's last node for next tick's dispatch.
//! ```
//!
//! # Modules
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`builder`]  | `SimBuilder`: entities by node or snapped coordinate    |
//! | [`dispatch`] | `allocate`: nearest-driver assignment                   |
//! | [`handoff`]  | `scan`: pairwise in-flight transfers and driver locks   |
//! | [`observer`] | `SimObserver`, `FleetEvent`, `TickSummary`, `EventLog`  |
//! | [`orders`]   | `OrderSource`, `ScheduledOrders`, `RandomOrders`        |
//! | [`sim`]      | `Sim`: the tick loop                                    |
//! | [`state`]    | `SimState`: global counters                             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_core::{FleetConfig, NodeId};
//! use fleet_sim::{NoopObserver, RandomOrders, SimBuilder};
//! use fleet_spatial::DijkstraRouter;
//!
//! let config = FleetConfig::default();
//! let mut sim = SimBuilder::new(config.clone(), network, DijkstraRouter)
//!     .restaurant(NodeId(0))
//!     .customer(NodeId(7))
//!     .driver(NodeId(3))
//!     .order_source(RandomOrders::new(config.seed, 0.1)?)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod dispatch;
pub mod error;
pub mod handoff;
pub mod observer;
pub mod orders;
pub mod sim;
pub mod state;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use dispatch::{Allocation, DispatchOutcome};
pub use error::{SimError, SimResult};
pub use handoff::{Handoff, HandoffPass};
pub use observer::{EventLog, FleetEvent, NoopObserver, SimObserver, TickSummary};
pub use orders::{NoOrders, OrderRequest, OrderSource, RandomOrders, ScheduledOrders};
pub use sim::Sim;
pub use state::SimState;
