use petgraph::graph::NodeIndex;

use crate::data::poi::Coordinate;
use crate::graph::ring_graph::RingGraph;
use crate::utils::logging::{self, CalculationType, OperationCategory};

/// Snaps a free coordinate onto an existing graph node.
pub trait NearestNode {
    /// Closest node under the graph's metric, lowest index on ties.
    /// `None` only for an empty graph.
    fn nearest_node(&self, query: &Coordinate) -> Option<NodeIndex>;

    fn nearest_coordinate(&self, query: &Coordinate) -> Option<Coordinate>;
}

impl NearestNode for RingGraph {
    fn nearest_node(&self, query: &Coordinate) -> Option<NodeIndex> {
        let _timing = logging::start_timing("nearest_node",
            OperationCategory::Calculation { subcategory: CalculationType::NearestNode });

        let metric = self.metric();
        let graph = self.inner();
        let mut best: Option<(NodeIndex, f64)> = None;
        for node in graph.node_indices() {
            let distance = graph[node].distance_with(query, metric);
            // strict comparison keeps the earlier (lower) index on ties
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((node, distance));
            }
        }
        best.map(|(node, _)| node)
    }

    fn nearest_coordinate(&self, query: &Coordinate) -> Option<Coordinate> {
        self.nearest_node(query).map(|node| self.inner()[node])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::locator_config::{DistanceMetric, EdgeWeighting};
    use crate::graph::ring_graph::build_ring_graph;

    fn square(metric: DistanceMetric) -> RingGraph {
        let ring = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ];
        build_ring_graph(&ring, EdgeWeighting::Unit, metric).unwrap()
    }

    #[test]
    fn picks_the_closest_corner() {
        let graph = square(DistanceMetric::Euclidean);
        let node = graph.nearest_node(&Coordinate::new(0.9, 0.8)).unwrap();
        assert_eq!(node.index(), 2);
        assert_eq!(graph.nearest_coordinate(&Coordinate::new(0.9, 0.8)), Some(Coordinate::new(1.0, 1.0)));
    }

    #[test]
    fn ties_resolve_to_the_lowest_index() {
        let graph = square(DistanceMetric::Euclidean);
        // the centre is equidistant from all four corners
        assert_eq!(graph.nearest_node(&Coordinate::new(0.5, 0.5)).unwrap().index(), 0);
        // midpoint of the right side: nodes 1 and 2 tie
        assert_eq!(graph.nearest_node(&Coordinate::new(1.0, 0.5)).unwrap().index(), 1);
    }

    #[test]
    fn haversine_metric_is_honoured() {
        let graph = square(DistanceMetric::Haversine);
        assert_eq!(graph.nearest_node(&Coordinate::new(0.1, 0.95)).unwrap().index(), 3);
    }
}
