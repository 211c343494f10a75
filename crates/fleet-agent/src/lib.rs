//! `fleet-agent`: delivery entities and the driver agent.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`order`]    | `Order`, `OrderStatus`: one delivery's lifecycle               |
//! | [`place`]    | `Restaurant` (with FIFO pending queue), `Customer`             |
//! | [`task`]     | `Task`, `Stop`, `Destination`: the driver's explicit state     |
//! | [`driver`]   | `Driver`: acceptance, target selection, movement, arrival      |
//! | [`registry`] | `Registry`: id-indexed `Vec`s owning every entity              |
//!
//! # Driver state machine
//!
//! A driver is idle-at-home, heading to a restaurant, or heading to a
//! customer.  The state is *derived* from its order lists (pending orders take
//! strict priority over carried ones) and cached as a [`Task`] each time
//! [`Driver::update_target`] runs:
//!
//! ```text
//!   pending non-empty  → Heading { stop: Restaurant, index }
//!   carrying non-empty → Heading { stop: Customer,   index }
//!   otherwise          → Idle (path leads home)
//! ```
//!
//! Entities refer to each other only by id; all lookups go through the
//! [`Registry`].

pub mod driver;
pub mod order;
pub mod place;
pub mod registry;
pub mod task;


pub use driver::{Driver, StepOutcome};
pub use order::{Order, OrderStatus};
pub use place::{Customer, Restaurant};
pub use registry::Registry;
pub use task::{Destination, Stop, Task};
