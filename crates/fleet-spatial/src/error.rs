//! Spatial-subsystem error type.

use thiserror::Error;

use fleet_core::NodeId;

/// Errors produced by `fleet-spatial`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpatialError {
    #[error("no path between {from} and {to}")]
    UnreachableNodes { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
