use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::analysis::centroid::compute_centroid;
use crate::analysis::minimizer::{Bfgs, Minimizer};
use crate::analysis::p_median::{compute_p_median, compute_weighted_p_median, PMedianResult};
use crate::analysis::weighted_centroid::{compute_weighted_centroid, feature_centroids};
use crate::config::constants::DEFAULT_WEIGHT;
use crate::config::locator_config::{DemandSource, LocatorConfig};
use crate::core::commands::{Command, CommandOutput, LabeledPoint};
use crate::data::poi::Coordinate;
use crate::data::polygon_loader::{self, FeatureRing};
use crate::error::{LocatorError, LocatorResult};
use crate::graph::mst::compute_mst;
use crate::graph::nearest::NearestNode;
use crate::graph::ring_graph::{build_ring_graph, RingGraph};

/// The loaded polygon and everything derived from it. Every command reads
/// from here and nothing else; a failed load or command leaves it untouched.
pub struct Session {
    config: LocatorConfig,
    minimizer: Box<dyn Minimizer>,
    source: Option<PathBuf>,
    ring: Option<Vec<Coordinate>>,
    features: Vec<FeatureRing>,
    graph: Option<RingGraph>,
}

impl Session {
    pub fn new(config: LocatorConfig) -> Self {
        Self::with_minimizer(config, Box::new(Bfgs))
    }

    pub fn with_minimizer(config: LocatorConfig, minimizer: Box<dyn Minimizer>) -> Self {
        Self {
            config,
            minimizer,
            source: None,
            ring: None,
            features: Vec::new(),
            graph: None,
        }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> LocatorResult<()> {
        let path = path.as_ref();
        let site = polygon_loader::load_site(path, &self.config.weight_property)?;
        self.replace(site.ring, site.features)?;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    pub fn load_str(&mut self, json: &str) -> LocatorResult<()> {
        let site = polygon_loader::parse_site(json, &self.config.weight_property)?;
        self.replace(site.ring, site.features)?;
        self.source = None;
        Ok(())
    }

    /// Loads a bare ring; the ring doubles as the only feature.
    pub fn set_ring(&mut self, ring: Vec<Coordinate>) -> LocatorResult<()> {
        let features = vec![FeatureRing { ring: ring.clone(), weight: DEFAULT_WEIGHT }];
        self.replace(ring, features)?;
        self.source = None;
        Ok(())
    }

    fn replace(&mut self, ring: Vec<Coordinate>, features: Vec<FeatureRing>) -> LocatorResult<()> {
        // build before committing so a bad ring keeps the previous polygon
        let graph = build_ring_graph(&ring, self.config.edge_weighting, self.config.metric)?;
        info!("Session holds a {}-node ring and {} features", graph.node_count(), features.len());
        self.ring = Some(ring);
        self.features = features;
        self.graph = Some(graph);
        Ok(())
    }

    pub fn ring(&self) -> LocatorResult<&[Coordinate]> {
        self.ring.as_deref().ok_or(LocatorError::NoPolygonLoaded)
    }

    pub fn features(&self) -> &[FeatureRing] {
        &self.features
    }

    pub fn graph(&self) -> LocatorResult<&RingGraph> {
        self.graph.as_ref().ok_or(LocatorError::NoPolygonLoaded)
    }

    /// Runs one command against the loaded polygon. The ring graph is rebuilt
    /// from the ring first, so config changes between commands take effect.
    #[instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, command: Command) -> LocatorResult<CommandOutput> {
        let ring = self.ring()?;
        let graph = build_ring_graph(ring, self.config.edge_weighting, self.config.metric)?;
        self.graph = Some(graph);

        match command {
            Command::Centroid => self.centroid(),
            Command::WeightedCentroid => self.weighted_centroid(),
            Command::PMedian => self.p_median(),
            Command::MinimumSpanningTree => self.minimum_spanning_tree(),
        }
    }

    pub fn execute_all(&mut self) -> Vec<LocatorResult<CommandOutput>> {
        Command::ALL.iter().map(|c| self.execute(*c)).collect()
    }

    fn snap(&self, label: impl Into<String>, location: Coordinate) -> LocatorResult<LabeledPoint> {
        let graph = self.graph()?;
        let node = graph.nearest_node(&location);
        Ok(LabeledPoint {
            label: label.into(),
            location,
            nearest_node: node.map(|n| n.index()),
            node_location: node.and_then(|n| graph.coordinate(n.index())),
        })
    }

    fn centroid(&self) -> LocatorResult<CommandOutput> {
        let centroid = compute_centroid(&self.graph()?.coordinates())?;
        let mut output = CommandOutput::new(Command::Centroid);
        output.points.push(self.snap(Command::Centroid.label(), centroid)?);
        Ok(output)
    }

    fn weighted_centroid(&self) -> LocatorResult<CommandOutput> {
        let (centroids, weights) = feature_centroids(&self.features)?;
        let weighted = compute_weighted_centroid(&centroids, &weights)?;

        let mut output = CommandOutput::new(Command::WeightedCentroid);
        output.points.push(self.snap(Command::WeightedCentroid.label(), weighted)?);
        if centroids.len() > 1 {
            for (i, c) in centroids.iter().enumerate() {
                output.points.push(self.snap(format!("feature_centroid_{}", i), *c)?);
            }
        }
        Ok(output)
    }

    fn p_median(&self) -> LocatorResult<CommandOutput> {
        let options = &self.config.minimizer;
        let metric = self.config.metric;
        let minimizer = self.minimizer.as_ref();

        let result = match self.config.demand_source {
            DemandSource::Ring => {
                let demand = [compute_centroid(&self.graph()?.coordinates())?];
                compute_p_median(&demand, options, metric, minimizer)
            }
            DemandSource::Features => {
                let (demand, weights) = feature_centroids(&self.features)?;
                compute_weighted_p_median(&demand, &weights, options, metric, minimizer)
            }
        };

        let mut output = CommandOutput::new(Command::PMedian);
        match result {
            Ok(PMedianResult { location, total_distance, .. }) => {
                output.points.push(self.snap(Command::PMedian.label(), location)?);
                output.value = Some(total_distance);
            }
            Err(LocatorError::Optimization { best, iterations }) => {
                warn!("Using best p-median point found after {} iterations", iterations);
                output.points.push(self.snap(Command::PMedian.label(), best)?);
                output.warnings.push(format!(
                    "minimizer did not converge after {} iterations, showing best point found",
                    iterations
                ));
            }
            Err(e) => return Err(e),
        }
        Ok(output)
    }

    fn minimum_spanning_tree(&self) -> LocatorResult<CommandOutput> {
        let graph = self.graph()?;
        debug!("Spanning tree over {:?}-weighted edges", graph.weighting());
        let tree = compute_mst(graph);
        let mut output = CommandOutput::new(Command::MinimumSpanningTree);
        output.edges = tree.segments();
        output.value = Some(tree.total_weight());
        Ok(output)
    }
}
