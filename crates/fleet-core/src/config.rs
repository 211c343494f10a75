//! Run configuration.
//!
//! Every parameter is a flat scalar supplied at construction.  Per-driver
//! speed and capacity default to the values here but may be overridden when a
//! driver is added to the simulation.

use crate::{FleetError, FleetResult, Tick};

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetConfig {
    /// Default driver speed, in network distance units per tick.
    pub speed: f64,

    /// Default driver capacity: maximum `pending + carrying` orders.
    pub capacity: usize,

    /// Maximum network distance between two drivers' next nodes for a
    /// handoff to be considered.
    pub driver_handoff_threshold: f64,

    /// Maximum network distance between two drivers' final destinations for
    /// a handoff to be considered.
    pub customer_handoff_threshold: f64,

    /// Tick budget used by `Sim::run`.  Callers stepping manually ignore it.
    pub total_ticks: u64,

    /// Master RNG seed for order generators.  The same seed always produces
    /// identical runs.
    pub seed: u64,

    /// Emit a snapshot to observers every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            speed:                      1.0,
            capacity:                   3,
            driver_handoff_threshold:   1.0,
            customer_handoff_threshold: 1.0,
            total_ticks:                1_000,
            seed:                       42,
            snapshot_interval_ticks:    1,
        }
    }
}

impl FleetConfig {
    /// The tick at which `Sim::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Reject parameter combinations the simulation cannot honour.
    pub fn validate(&self) -> FleetResult<()> {
        validate_driver(self.speed, self.capacity)?;
        if self.driver_handoff_threshold.is_nan() || self.driver_handoff_threshold < 0.0 {
            return Err(FleetError::Config(format!(
                "driver_handoff_threshold must be >= 0, got {}",
                self.driver_handoff_threshold
            )));
        }
        if self.customer_handoff_threshold.is_nan() || self.customer_handoff_threshold < 0.0 {
            return Err(FleetError::Config(format!(
                "customer_handoff_threshold must be >= 0, got {}",
                self.customer_handoff_threshold
            )));
        }
        Ok(())
    }
}

/// Per-driver parameter check shared by `FleetConfig::validate` and driver
/// overrides.
pub fn validate_driver(speed: f64, capacity: usize) -> FleetResult<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(FleetError::Config(format!("speed must be a positive finite number, got {speed}")));
    }
    if capacity == 0 {
        return Err(FleetError::Config("capacity must be at least 1".into()));
    }
    Ok(())
}
