//! Fluent builder for constructing a [`Sim`].

use fleet_agent::Registry;
use fleet_core::{FleetConfig, NodeId, Point, validate_driver};
use fleet_spatial::{DistanceOracle, RoadNetwork, Router};

use crate::orders::{NoOrders, OrderSource};
use crate::{Sim, SimError, SimResult};

/// Where an entity sits: a road node, or a coordinate snapped to the nearest
/// node at build time.
#[derive(Copy, Clone, Debug)]
enum Site {
    Node(NodeId),
    At(Point),
}

#[derive(Copy, Clone, Debug)]
struct DriverSpec {
    home:     Site,
    speed:    Option<f64>,
    capacity: Option<usize>,
}

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`FleetConfig`]: default speed and capacity, handoff thresholds, …
/// - [`RoadNetwork`]: the graph drivers move on
/// - `R: Router`: the shortest-path metric (e.g. [`fleet_spatial::DijkstraRouter`])
///
/// # Entities
///
/// Restaurants, customers and drivers receive ids `0, 1, 2, …` in the order
/// they are added.  Each may be placed on a node directly or at a coordinate
/// that is snapped to the nearest node.
///
/// | Method                        | Default                       |
/// |-------------------------------|-------------------------------|
/// | `.driver_with(h, s, c)`       | `config.speed`, `config.capacity` |
/// | `.order_source(s)`            | No automatic orders           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network, DijkstraRouter)
///     .restaurant(NodeId(0))
///     .customer_at(Point::new(4.0, 2.0))
///     .driver(NodeId(3))
///     .order_source(RandomOrders::new(config.seed, 0.2)?)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: Router> {
    config:      FleetConfig,
    network:     RoadNetwork,
    router:      R,
    restaurants: Vec<Site>,
    customers:   Vec<Site>,
    drivers:     Vec<DriverSpec>,
    source:      Option<Box<dyn OrderSource>>,
}

impl<R: Router> SimBuilder<R> {
    pub fn new(config: FleetConfig, network: RoadNetwork, router: R) -> Self {
        Self {
            config,
            network,
            router,
            restaurants: Vec::new(),
            customers:   Vec::new(),
            drivers:     Vec::new(),
            source:      None,
        }
    }

    pub fn restaurant(mut self, node: NodeId) -> Self {
        self.restaurants.push(Site::Node(node));
        self
    }

    pub fn restaurant_at(mut self, pos: Point) -> Self {
        self.restaurants.push(Site::At(pos));
        self
    }

    pub fn customer(mut self, node: NodeId) -> Self {
        self.customers.push(Site::Node(node));
        self
    }

    pub fn customer_at(mut self, pos: Point) -> Self {
        self.customers.push(Site::At(pos));
        self
    }

    /// A driver stationed at `home` with the configured speed and capacity.
    pub fn driver(mut self, home: NodeId) -> Self {
        self.drivers.push(DriverSpec { home: Site::Node(home), speed: None, capacity: None });
        self
    }

    pub fn driver_at(mut self, home: Point) -> Self {
        self.drivers.push(DriverSpec { home: Site::At(home), speed: None, capacity: None });
        self
    }

    /// A driver with its own speed and capacity.
    pub fn driver_with(mut self, home: NodeId, speed: f64, capacity: usize) -> Self {
        self.drivers.push(DriverSpec {
            home:     Site::Node(home),
            speed:    Some(speed),
            capacity: Some(capacity),
        });
        self
    }

    pub fn order_source(mut self, source: impl OrderSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Validate inputs, resolve every site to a node, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;
        if self.network.is_empty() {
            return Err(SimError::Config("road network has no nodes".into()));
        }

        let mut registry = Registry::new();
        for &site in &self.restaurants {
            let (node, pos) = resolve(&self.network, site)?;
            registry.add_restaurant(pos, node);
        }
        for &site in &self.customers {
            let (node, pos) = resolve(&self.network, site)?;
            registry.add_customer(pos, node);
        }
        for spec in &self.drivers {
            let speed = spec.speed.unwrap_or(self.config.speed);
            let capacity = spec.capacity.unwrap_or(self.config.capacity);
            validate_driver(speed, capacity)?;
            let (home, _) = resolve(&self.network, spec.home)?;
            // Drivers start exactly on their home node.
            registry.add_driver(home, self.network.coord(home), speed, capacity);
        }

        let oracle = DistanceOracle::new(self.network, self.router);
        let source = self.source.unwrap_or_else(|| Box::new(NoOrders));
        Ok(Sim::new(self.config, registry, oracle, source))
    }
}

/// Node and display coordinate for a site.
fn resolve(network: &RoadNetwork, site: Site) -> SimResult<(NodeId, Point)> {
    match site {
        Site::Node(node) => Ok((node, network.coordinate_of(node)?)),
        Site::At(pos) => {
            let node = network.snap_to_node(pos).ok_or(SimError::NoNearbyNode(pos))?;
            Ok((node, pos))
        }
    }
}
