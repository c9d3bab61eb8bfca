use tracing::{info, warn};

use crate::analysis::centroid::compute_centroid;
use crate::analysis::minimizer::{Bfgs, Minimizer};
use crate::analysis::weighted_centroid::validate_weights;
use crate::config::locator_config::{DistanceMetric, MinimizeOptions};
use crate::data::poi::Coordinate;
use crate::error::{LocatorError, LocatorResult};
use crate::utils::logging::{self, CalculationType, OperationCategory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PMedianResult {
    pub location: Coordinate,
    pub total_distance: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Sum of distances from `candidate` to every demand point.
pub fn total_distance(candidate: &Coordinate, demand_points: &[Coordinate], metric: DistanceMetric) -> f64 {
    demand_points.iter().map(|d| candidate.distance_with(d, metric)).sum()
}

pub fn weighted_total_distance(
    candidate: &Coordinate,
    demand_points: &[Coordinate],
    weights: &[f64],
    metric: DistanceMetric,
) -> f64 {
    demand_points
        .iter()
        .zip(weights)
        .map(|(d, w)| w * candidate.distance_with(d, metric))
        .sum()
}

/// Continuous single-facility approximation of the p-median: the point that
/// minimizes total distance to the demand points, searched from their
/// centroid. Nothing forces the answer onto the network; snap it with
/// [`NearestNode`](crate::graph::nearest::NearestNode) if a node is needed.
pub fn compute_p_median(
    demand_points: &[Coordinate],
    options: &MinimizeOptions,
    metric: DistanceMetric,
    minimizer: &dyn Minimizer,
) -> LocatorResult<PMedianResult> {
    let _timing = logging::start_timing("compute_p_median",
        OperationCategory::Calculation { subcategory: CalculationType::PMedian });

    if demand_points.is_empty() {
        return Err(LocatorError::EmptyInput("demand points"));
    }
    let start = compute_centroid(demand_points)?;
    let objective = |p: &Coordinate| total_distance(p, demand_points, metric);
    run(&objective, start, options, minimizer)
}

pub fn compute_p_median_default(demand_points: &[Coordinate]) -> LocatorResult<PMedianResult> {
    compute_p_median(demand_points, &MinimizeOptions::default(), DistanceMetric::Euclidean, &Bfgs)
}

/// As [`compute_p_median`], with each demand point's distance scaled by its
/// weight. Weights are validated like the weighted centroid's.
pub fn compute_weighted_p_median(
    demand_points: &[Coordinate],
    weights: &[f64],
    options: &MinimizeOptions,
    metric: DistanceMetric,
    minimizer: &dyn Minimizer,
) -> LocatorResult<PMedianResult> {
    let _timing = logging::start_timing("compute_weighted_p_median",
        OperationCategory::Calculation { subcategory: CalculationType::PMedian });

    validate_weights(demand_points, weights)?;
    let start = compute_centroid(demand_points)?;
    let objective = |p: &Coordinate| weighted_total_distance(p, demand_points, weights, metric);
    run(&objective, start, options, minimizer)
}

fn run(
    objective: &dyn Fn(&Coordinate) -> f64,
    start: Coordinate,
    options: &MinimizeOptions,
    minimizer: &dyn Minimizer,
) -> LocatorResult<PMedianResult> {
    let outcome = minimizer.minimize(objective, start, options)?;

    if !outcome.converged() {
        warn!("p-median search hit the {} iteration cap at ({:.6}, {:.6})",
              options.max_iterations, outcome.point.x, outcome.point.y);
        return Err(LocatorError::Optimization {
            best: outcome.point,
            iterations: outcome.iterations,
        });
    }

    info!("p-median at ({:.6}, {:.6}), total distance {:.6}, {} iterations",
          outcome.point.x, outcome.point.y, outcome.value, outcome.iterations);
    Ok(PMedianResult {
        location: outcome.point,
        total_distance: outcome.value,
        iterations: outcome.iterations,
        converged: true,
    })
}
