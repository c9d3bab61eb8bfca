use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::config::locator_config::{DemandSource, DistanceMetric, EdgeWeighting, LocatorConfig};
use crate::core::commands::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CommandArg {
    Centroid,
    WeightedCentroid,
    PMedian,
    Mst,
    All,
}

impl CommandArg {
    pub fn commands(&self) -> Vec<Command> {
        match self {
            CommandArg::Centroid => vec![Command::Centroid],
            CommandArg::WeightedCentroid => vec![Command::WeightedCentroid],
            CommandArg::PMedian => vec![Command::PMedian],
            CommandArg::Mst => vec![Command::MinimumSpanningTree],
            CommandArg::All => Command::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Euclidean,
    Haversine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EdgeWeightArg {
    Unit,
    Distance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DemandArg {
    Ring,
    Features,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Geojson,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Warehouse-site location summaries for a GeoJSON polygon", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "GeoJSON file with the candidate polygon")]
    input: PathBuf,

    #[arg(short = 'k', long, value_enum, default_value_t = CommandArg::All)]
    command: CommandArg,

    #[arg(long, help = "JSON config file; flags below override it")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    metric: Option<MetricArg>,

    #[arg(long, value_enum)]
    edge_weight: Option<EdgeWeightArg>,

    #[arg(long)]
    max_iterations: Option<usize>,

    #[arg(long)]
    gradient_tolerance: Option<f64>,

    #[arg(long, help = "Feature property holding the demand weight")]
    weight_property: Option<String>,

    #[arg(long, value_enum)]
    demand: Option<DemandArg>,

    #[arg(short, long, help = "Directory for exported results")]
    output_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Geojson)]
    format: ExportFormat,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(long, default_value_t = false)]
    debug_logging: bool,
}

impl Args {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn commands(&self) -> Vec<Command> {
        self.command.commands()
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    /// Applies the command-line overrides on top of `config`.
    pub fn apply_overrides(&self, mut config: LocatorConfig) -> LocatorConfig {
        if let Some(metric) = self.metric {
            config.metric = match metric {
                MetricArg::Euclidean => DistanceMetric::Euclidean,
                MetricArg::Haversine => DistanceMetric::Haversine,
            };
        }
        if let Some(weighting) = self.edge_weight {
            config.edge_weighting = match weighting {
                EdgeWeightArg::Unit => EdgeWeighting::Unit,
                EdgeWeightArg::Distance => EdgeWeighting::Distance,
            };
        }
        if let Some(demand) = self.demand {
            config.demand_source = match demand {
                DemandArg::Ring => DemandSource::Ring,
                DemandArg::Features => DemandSource::Features,
            };
        }
        if let Some(max_iterations) = self.max_iterations {
            config.minimizer.max_iterations = max_iterations;
        }
        if let Some(tolerance) = self.gradient_tolerance {
            config.minimizer.gradient_tolerance = tolerance;
        }
        if let Some(property) = &self.weight_property {
            config.weight_property = property.clone();
        }
        config
    }
}
