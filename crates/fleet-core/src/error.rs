//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `FleetError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{CustomerId, DriverId, NodeId, OrderId, RestaurantId};

/// The top-level error type for `fleet-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("driver {0} not found")]
    DriverNotFound(DriverId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("restaurant {0} not found")]
    RestaurantNotFound(RestaurantId),

    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `fleet-*` crates.
pub type FleetResult<T> = Result<T, FleetError>;
