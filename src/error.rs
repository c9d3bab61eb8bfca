use std::fmt;

use crate::data::poi::Coordinate;

/// Every failure the locator core can report. The shell matches on these to
/// decide whether to re-prompt for a file, fix an input, or just warn.
#[derive(Debug)]
pub enum LocatorError {
    Io(std::io::Error),
    Parse(String),
    InvalidRing { len: usize },
    EmptyInput(&'static str),
    DimensionMismatch { expected: usize, actual: usize },
    InvalidWeight(String),
    /// The minimizer stopped without converging. `best` is still usable.
    Optimization { best: Coordinate, iterations: usize },
    NoPolygonLoaded,
    Config(String),
    Export(String),
}

impl From<std::io::Error> for LocatorError {
    fn from(err: std::io::Error) -> Self {
        LocatorError::Io(err)
    }
}

impl From<serde_json::Error> for LocatorError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json wraps reader failures; keep those as I/O with their kind
        if err.is_io() {
            LocatorError::Io(std::io::Error::from(err))
        } else {
            LocatorError::Parse(err.to_string())
        }
    }
}

impl From<csv::Error> for LocatorError {
    fn from(err: csv::Error) -> Self {
        LocatorError::Export(err.to_string())
    }
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::Io(e) => write!(f, "IO error: {}", e),
            LocatorError::Parse(s) => write!(f, "Parse error: {}", s),
            LocatorError::InvalidRing { len } => {
                write!(f, "Invalid ring: need at least 3 coordinates, got {}", len)
            }
            LocatorError::EmptyInput(what) => write!(f, "Empty input: no {} supplied", what),
            LocatorError::DimensionMismatch { expected, actual } => write!(
                f,
                "Dimension mismatch: expected {} weights, got {}",
                expected, actual
            ),
            LocatorError::InvalidWeight(s) => write!(f, "Invalid weight: {}", s),
            LocatorError::Optimization { best, iterations } => write!(
                f,
                "Optimization did not converge after {} iterations (best point: {:.6}, {:.6})",
                iterations, best.x, best.y
            ),
            LocatorError::NoPolygonLoaded => write!(f, "No polygon loaded, load a GeoJSON file first"),
            LocatorError::Config(s) => write!(f, "Config error: {}", s),
            LocatorError::Export(s) => write!(f, "Export error: {}", s),
        }
    }
}

impl std::error::Error for LocatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocatorError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type LocatorResult<T> = Result<T, LocatorError>;
