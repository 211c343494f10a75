//! Synthetic city road network.
//!
//! A square grid of blocks with two diagonal avenues, so that the
//! fewest-hop and shortest-length routes between far corners differ.

use fleet_core::{NodeId, Point};
use fleet_spatial::{RoadNetwork, RoadNetworkBuilder};

/// Build a `size × size` grid of unit blocks plus diagonal avenues through
/// every other block.  Node `y * size + x` sits at `(x, y)`.
pub fn build_network(size: u32) -> RoadNetwork {
    let mut b = RoadNetworkBuilder::with_capacity(
        (size * size) as usize,
        (2 * size * size) as usize,
    );
    for y in 0..size {
        for x in 0..size {
            b.add_node(Point::new(x as f64, y as f64));
        }
    }

    let id = |x: u32, y: u32| NodeId(y * size + x);
    for y in 0..size {
        for x in 0..size {
            if x + 1 < size {
                b.add_road(id(x, y), id(x + 1, y));
            }
            if y + 1 < size {
                b.add_road(id(x, y), id(x, y + 1));
            }
            // Avenues: length √2, one hop.
            if x + 1 < size && y + 1 < size && (x + y) % 2 == 0 {
                b.add_road(id(x, y), id(x + 1, y + 1));
            }
        }
    }
    b.build()
}
