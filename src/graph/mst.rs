use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::data::poi::Coordinate;
use crate::graph::ring_graph::{RingEdge, RingGraph};
use crate::utils::logging::{self, CalculationType, OperationCategory};

#[derive(Debug, Clone)]
pub struct SpanningTree {
    pub nodes: Vec<Coordinate>,
    /// Kept edges in the order Kruskal selected them.
    pub edges: Vec<RingEdge>,
}

impl SpanningTree {
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Edge endpoints as coordinate pairs, ready to draw.
    pub fn segments(&self) -> Vec<(Coordinate, Coordinate)> {
        self.edges
            .iter()
            .map(|e| (self.nodes[e.a], self.nodes[e.b]))
            .collect()
    }

    /// n - 1 edges, every edge joins two components, everything ends up connected.
    pub fn is_tree(&self) -> bool {
        let n = self.nodes.len();
        if n == 0 || self.edges.len() != n - 1 {
            return false;
        }
        let mut sets = UnionFind::<usize>::new(n);
        if !self.edges.iter().all(|e| e.a < n && e.b < n && sets.union(e.a, e.b)) {
            return false;
        }
        let root = sets.find(0);
        (1..n).all(|i| sets.find(i) == root)
    }
}

/// Kruskal over the ring graph. Equal weights keep their insertion order, so
/// on a uniformly weighted ring the closing edge `(n-1, 0)` is the one left out.
pub fn compute_mst(graph: &RingGraph) -> SpanningTree {
    let _timing = logging::start_timing("compute_mst",
        OperationCategory::Calculation { subcategory: CalculationType::SpanningTree });

    let n = graph.node_count();
    let mut candidates = graph.edges();
    // sort_by is stable
    candidates.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut sets = UnionFind::<usize>::new(n);
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for edge in candidates {
        if edges.len() == n.saturating_sub(1) {
            break;
        }
        if sets.union(edge.a, edge.b) {
            edges.push(edge);
        }
    }

    let tree = SpanningTree { nodes: graph.coordinates(), edges };
    debug!("Spanning tree keeps {} of {} edges, total weight {:.6}",
           tree.edges.len(), graph.edge_count(), tree.total_weight());
    tree
}
