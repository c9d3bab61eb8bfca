// Module declarations for the depot locator

pub mod error;

// Session state and user-facing commands
pub mod core {
    pub mod session;
    pub mod commands;
}

// Location calculators
pub mod analysis {
    pub mod centroid;
    pub mod weighted_centroid;
    pub mod p_median;
    pub mod minimizer;
}

// Ring graph and graph algorithms
pub mod graph {
    pub mod ring_graph;
    pub mod mst;
    pub mod nearest;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod locator_config;
}

// Data loaders
pub mod data {
    pub mod poi;
    pub mod polygon_loader;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export the core operations
pub use crate::analysis::centroid::compute_centroid;
pub use crate::analysis::p_median::{compute_p_median, compute_p_median_default};
pub use crate::analysis::weighted_centroid::compute_weighted_centroid;
pub use crate::core::session::Session;
pub use crate::data::poi::Coordinate;
pub use crate::data::polygon_loader::load_polygon_ring;
pub use crate::error::{LocatorError, LocatorResult};
pub use crate::graph::mst::compute_mst;
pub use crate::graph::nearest::NearestNode;
pub use crate::graph::ring_graph::{build_ring_graph, RingGraph};
