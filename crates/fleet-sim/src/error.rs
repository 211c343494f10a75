use fleet_core::{FleetError, Point};
use fleet_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("no road node near {0}; the network is empty")]
    NoNearbyNode(Point),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type SimResult<T> = Result<T, SimError>;
