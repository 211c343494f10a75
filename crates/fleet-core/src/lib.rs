//! `fleet-core`: foundational types for the `rust_fleet` delivery simulation.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `DriverId`, `OrderId`, `RestaurantId`, `CustomerId` |
//! | [`geo`]         | `Point` (planar coordinate), Euclidean distance, stepping  |
//! | [`time`]        | `Tick`, `SimClock`                                         |
//! | [`config`]      | `FleetConfig`: flat scalar run parameters                  |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                           |
//! | [`error`]       | `FleetError`, `FleetResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FleetConfig, validate_driver};
pub use error::{FleetError, FleetResult};
pub use geo::Point;
pub use ids::{CustomerId, DriverId, NodeId, OrderId, RestaurantId};
pub use rng::SimRng;
pub use time::{SimClock, Tick, ticks_to_cover};
