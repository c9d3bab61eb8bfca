use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::constants::*;
use crate::error::{LocatorError, LocatorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    /// Great-circle distance in metres, treating x as longitude and y as latitude.
    Haversine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeWeighting {
    #[default]
    Unit,
    Distance,
}

/// Where the p-median demand points come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DemandSource {
    /// One demand point: the centroid of the loaded ring.
    #[default]
    Ring,
    /// One demand point per feature: that feature's ring centroid.
    Features,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimizeOptions {
    pub max_iterations: usize,
    pub gradient_tolerance: f64,
    pub function_tolerance: f64,
    pub fd_step: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            gradient_tolerance: DEFAULT_GRADIENT_TOLERANCE,
            function_tolerance: DEFAULT_FUNCTION_TOLERANCE,
            fd_step: DEFAULT_FD_STEP,
        }
    }
}

impl MinimizeOptions {
    pub fn validate(&self) -> LocatorResult<()> {
        if self.max_iterations == 0 {
            return Err(LocatorError::Config("max_iterations must be at least 1".to_string()));
        }
        for (name, value) in [
            ("gradient_tolerance", self.gradient_tolerance),
            ("function_tolerance", self.function_tolerance),
            ("fd_step", self.fd_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LocatorError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub metric: DistanceMetric,
    pub edge_weighting: EdgeWeighting,
    pub minimizer: MinimizeOptions,
    pub weight_property: String,
    pub demand_source: DemandSource,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Euclidean,
            edge_weighting: EdgeWeighting::Unit,
            minimizer: MinimizeOptions::default(),
            weight_property: DEFAULT_WEIGHT_PROPERTY.to_string(),
            demand_source: DemandSource::Ring,
        }
    }
}

impl LocatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> LocatorResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: LocatorConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| LocatorError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LocatorResult<()> {
        self.minimizer.validate()?;
        if self.weight_property.trim().is_empty() {
            return Err(LocatorError::Config("weight_property must not be empty".to_string()));
        }
        Ok(())
    }
}
