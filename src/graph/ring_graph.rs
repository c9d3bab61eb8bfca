use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::config::constants::MIN_RING_COORDINATES;
use crate::config::locator_config::{DistanceMetric, EdgeWeighting};
use crate::data::poi::Coordinate;
use crate::error::{LocatorError, LocatorResult};
use crate::utils::logging::{self, OperationCategory};

/// Cycle graph over a polygon boundary. Node `i` carries the i-th ring
/// coordinate; edge `i` joins node `i` to node `(i + 1) % n`.
#[derive(Debug, Clone)]
pub struct RingGraph {
    graph: UnGraph<Coordinate, f64>,
    metric: DistanceMetric,
    weighting: EdgeWeighting,
}

/// One edge as seen from outside the graph: endpoint indices and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingEdge {
    pub a: usize,
    pub b: usize,
    pub weight: f64,
}

pub fn build_ring_graph(
    ring: &[Coordinate],
    weighting: EdgeWeighting,
    metric: DistanceMetric,
) -> LocatorResult<RingGraph> {
    let _timing = logging::start_timing("build_ring_graph", OperationCategory::GraphBuild);

    let vertices = open_ring(ring);
    if vertices.len() < MIN_RING_COORDINATES {
        return Err(LocatorError::InvalidRing { len: vertices.len() });
    }

    let n = vertices.len();
    let mut graph = UnGraph::with_capacity(n, n);
    let nodes: Vec<NodeIndex> = vertices.iter().map(|c| graph.add_node(*c)).collect();

    for i in 0..n {
        let j = (i + 1) % n;
        let weight = match weighting {
            EdgeWeighting::Unit => 1.0,
            EdgeWeighting::Distance => vertices[i].distance_with(&vertices[j], metric),
        };
        graph.add_edge(nodes[i], nodes[j], weight);
    }

    debug!("Built ring graph: {} nodes, {} edges ({:?} weights)", n, graph.edge_count(), weighting);
    Ok(RingGraph { graph, metric, weighting })
}

/// GeoJSON rings repeat the first position at the end; that closing vertex
/// would become a duplicate node, so it is dropped.
pub fn open_ring(ring: &[Coordinate]) -> &[Coordinate] {
    match ring {
        [first, rest @ .., last] if !rest.is_empty() && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

impl RingGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn weighting(&self) -> EdgeWeighting {
        self.weighting
    }

    pub fn coordinate(&self, node: usize) -> Option<Coordinate> {
        self.graph.node_weight(NodeIndex::new(node)).copied()
    }

    /// Node coordinates in node order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.graph.node_indices().map(|i| self.graph[i]).collect()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> Vec<RingEdge> {
        self.graph
            .edge_references()
            .map(|e| RingEdge {
                a: e.source().index(),
                b: e.target().index(),
                weight: *e.weight(),
            })
            .collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.graph.raw_edges().iter().map(|e| e.weight).sum()
    }

    pub fn inner(&self) -> &UnGraph<Coordinate, f64> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ]
    }

    #[test]
    fn one_node_per_coordinate_and_wraparound_edge() {
        let graph = build_ring_graph(&square(), EdgeWeighting::Unit, DistanceMetric::Euclidean).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);

        let ends: Vec<(usize, usize)> = graph.edges().iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(ends, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(graph.coordinates(), square());
    }

    #[test]
    fn closing_duplicate_is_dropped() {
        let mut closed = square();
        closed.push(Coordinate::new(0.0, 0.0));
        let graph = build_ring_graph(&closed, EdgeWeighting::Unit, DistanceMetric::Euclidean).unwrap();
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn fewer_than_three_coordinates_is_invalid() {
        let ring = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)];
        let err = build_ring_graph(&ring, EdgeWeighting::Unit, DistanceMetric::Euclidean).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidRing { len: 2 }));
    }

    #[test]
    fn closed_triangle_with_two_distinct_vertices_is_invalid() {
        let ring = vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0), Coordinate::new(0.0, 0.0)];
        assert!(matches!(
            build_ring_graph(&ring, EdgeWeighting::Unit, DistanceMetric::Euclidean),
            Err(LocatorError::InvalidRing { len: 2 })
        ));
    }

    #[test]
    fn distance_weights_use_the_metric() {
        let ring = vec![Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 0.0), Coordinate::new(3.0, 4.0)];
        let graph = build_ring_graph(&ring, EdgeWeighting::Distance, DistanceMetric::Euclidean).unwrap();
        let weights: Vec<f64> = graph.edges().iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![3.0, 4.0, 5.0]);
        assert_relative_eq!(graph.total_weight(), 12.0);
    }
}
