//! The driver's cached task: what it is heading to and which order that is.

/// Kind of stop a driver is heading to while serving orders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stop {
    /// Pick up the pending order at `index`.
    Restaurant,
    /// Deliver the carried order at `index`.
    Customer,
}

/// Destination category, as exposed to observers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    Restaurant,
    Customer,
    Home,
}

impl Destination {
    pub fn as_str(self) -> &'static str {
        match self {
            Destination::Restaurant => "restaurant",
            Destination::Customer   => "customer",
            Destination::Home       => "home",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit driver state, recomputed by `Driver::update_target`.
///
/// `index` points into the driver's `pending` list for
/// [`Stop::Restaurant`] and into its `carrying` list for [`Stop::Customer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Task {
    /// No orders: returning to, or parked at, the home node.
    #[default]
    Idle,
    Heading { stop: Stop, index: usize },
}

impl Task {
    pub fn destination(self) -> Destination {
        match self {
            Task::Idle => Destination::Home,
            Task::Heading { stop: Stop::Restaurant, .. } => Destination::Restaurant,
            Task::Heading { stop: Stop::Customer, .. }   => Destination::Customer,
        }
    }

    /// `true` while delivering.  Handoff eligibility keys on this.
    #[inline]
    pub fn is_heading_to_customer(self) -> bool {
        matches!(self, Task::Heading { stop: Stop::Customer, .. })
    }
}
