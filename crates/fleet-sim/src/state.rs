//! Run-wide counters.

/// Global counters, written only by the orchestrator.
///
/// Agents and coordinators report what happened (a
/// [`StepOutcome`][fleet_agent::StepOutcome], an allocation, a handoff pass)
/// and the tick loop folds it in here, so there is exactly one writer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimState {
    /// Orders placed so far.
    pub placed_orders:    u64,
    /// Orders delivered so far.
    pub completed_orders: u64,
    /// Handoffs executed so far.
    pub handoffs:         u64,
    /// Oracle queries that failed with an unreachable pair.
    pub routing_failures: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}
