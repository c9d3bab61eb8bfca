use std::fmt;

use serde::Serialize;

use crate::data::poi::{Coordinate, POI};

/// The user actions the shell can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Centroid,
    WeightedCentroid,
    PMedian,
    MinimumSpanningTree,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Centroid,
        Command::WeightedCentroid,
        Command::PMedian,
        Command::MinimumSpanningTree,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::Centroid => "centroid",
            Command::WeightedCentroid => "weighted_centroid",
            Command::PMedian => "p_median",
            Command::MinimumSpanningTree => "minimum_spanning_tree",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A computed location and the graph node it snaps to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPoint {
    pub label: String,
    pub location: Coordinate,
    pub nearest_node: Option<usize>,
    pub node_location: Option<Coordinate>,
}

impl POI for LabeledPoint {
    fn get_coordinate(&self) -> &Coordinate {
        &self.location
    }

    fn get_id(&self) -> &str {
        &self.label
    }
}

/// Everything a renderer needs to draw one command's result over the ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutput {
    pub command: Command,
    pub points: Vec<LabeledPoint>,
    pub edges: Vec<(Coordinate, Coordinate)>,
    /// Total distance for the p-median, total edge weight for the tree.
    pub value: Option<f64>,
    pub warnings: Vec<String>,
}

impl CommandOutput {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            points: Vec::new(),
            edges: Vec::new(),
            value: None,
            warnings: Vec::new(),
        }
    }

    pub fn point(&self, label: &str) -> Option<&LabeledPoint> {
        self.points.iter().find(|p| p.get_id() == label)
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.command)?;
        for point in &self.points {
            write!(f, "  {}: ({:.6}, {:.6})", point.label, point.location.x, point.location.y)?;
            if let (Some(node), Some(at)) = (point.nearest_node, point.node_location) {
                write!(f, " -> node {} ({:.6}, {:.6})", node, at.x, at.y)?;
            }
            writeln!(f)?;
        }
        if !self.edges.is_empty() {
            writeln!(f, "  edges: {}", self.edges.len())?;
        }
        if let Some(value) = self.value {
            writeln!(f, "  value: {:.6}", value)?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {}", warning)?;
        }
        Ok(())
    }
}
