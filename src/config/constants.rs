// Ring Constants
pub const MIN_RING_COORDINATES: usize = 3;

// Minimizer Defaults
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_GRADIENT_TOLERANCE: f64 = 1e-5;
pub const DEFAULT_FUNCTION_TOLERANCE: f64 = 1e-12;  // Relative change in objective
pub const DEFAULT_FD_STEP: f64 = 1e-8;              // Central finite-difference step

// Line Search
pub const ARMIJO_C1: f64 = 1e-4;
pub const LINE_SEARCH_SHRINK: f64 = 0.5;
pub const LINE_SEARCH_MAX_HALVINGS: usize = 50;

// Geodesy
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;        // Mean Earth radius

// Weights
pub const DEFAULT_WEIGHT: f64 = 1.0;
pub const DEFAULT_WEIGHT_PROPERTY: &str = "population";

// Export
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
