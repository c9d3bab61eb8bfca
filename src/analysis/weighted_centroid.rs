use tracing::debug;

use crate::analysis::centroid::compute_centroid;
use crate::data::poi::Coordinate;
use crate::data::polygon_loader::FeatureRing;
use crate::error::{LocatorError, LocatorResult};
use crate::graph::ring_graph::open_ring;
use crate::utils::logging::{self, CalculationType, OperationCategory};

/// Checks a weight vector against the points it belongs to.
/// Order: empty points, length mismatch, then the weights themselves.
pub fn validate_weights(points: &[Coordinate], weights: &[f64]) -> LocatorResult<f64> {
    if points.is_empty() {
        return Err(LocatorError::EmptyInput("centroids"));
    }
    if weights.len() != points.len() {
        return Err(LocatorError::DimensionMismatch {
            expected: points.len(),
            actual: weights.len(),
        });
    }
    if let Some((i, w)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0) {
        return Err(LocatorError::InvalidWeight(format!("weight {} is {}", i, w)));
    }

    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(LocatorError::InvalidWeight(format!("weights sum to {}", total)));
    }
    if total <= 0.0 {
        return Err(LocatorError::InvalidWeight("all weights are zero".to_string()));
    }
    Ok(total)
}

/// `Σ wᵢ·cᵢ / Σ wᵢ`
pub fn compute_weighted_centroid(centroids: &[Coordinate], weights: &[f64]) -> LocatorResult<Coordinate> {
    let _timing = logging::start_timing("compute_weighted_centroid",
        OperationCategory::Calculation { subcategory: CalculationType::WeightedCentroid });

    let total = validate_weights(centroids, weights)?;
    let (sum_x, sum_y) = centroids
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(sx, sy), (c, w)| (sx + w * c.x, sy + w * c.y));

    debug!("Weighted centroid over {} points, total weight {}", centroids.len(), total);
    Ok(Coordinate::new(sum_x / total, sum_y / total))
}

/// Per-feature centroids and their weights, the inputs for
/// [`compute_weighted_centroid`] and the feature-demand p-median. A closing
/// duplicate vertex is not counted twice.
pub fn feature_centroids(features: &[FeatureRing]) -> LocatorResult<(Vec<Coordinate>, Vec<f64>)> {
    let mut centroids = Vec::with_capacity(features.len());
    let mut weights = Vec::with_capacity(features.len());
    for feature in features {
        centroids.push(compute_centroid(open_ring(&feature.ring))?);
        weights.push(feature.weight);
    }
    Ok((centroids, weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn corners() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(4.0, 0.0),
            Coordinate::new(4.0, 2.0),
            Coordinate::new(0.0, 2.0),
        ]
    }

    #[rstest]
    #[case(1.0)]
    #[case(0.25)]
    #[case(1_000.0)]
    fn equal_weights_match_plain_centroid(#[case] w: f64) {
        let points = corners();
        let weighted = compute_weighted_centroid(&points, &vec![w; points.len()]).unwrap();
        let plain = compute_centroid(&points).unwrap();
        assert_relative_eq!(weighted.x, plain.x, epsilon = 1e-12);
        assert_relative_eq!(weighted.y, plain.y, epsilon = 1e-12);
    }

    #[test]
    fn heavier_points_pull_the_result() {
        let points = vec![Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 0.0)];
        let c = compute_weighted_centroid(&points, &[1.0, 3.0]).unwrap();
        assert_relative_eq!(c.x, 7.5);
        assert_relative_eq!(c.y, 0.0);
    }

    #[test]
    fn zero_weight_points_are_ignored() {
        let points = vec![Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)];
        let c = compute_weighted_centroid(&points, &[0.0, 2.0]).unwrap();
        assert_eq!(c, Coordinate::new(10.0, 10.0));
    }

    #[test]
    fn length_mismatch_is_reported() {
        let err = compute_weighted_centroid(&corners(), &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, LocatorError::DimensionMismatch { expected: 4, actual: 2 }));
    }

    #[rstest]
    #[case(vec![0.0, 0.0, 0.0, 0.0])]
    #[case(vec![1.0, -1.0, 1.0, 1.0])]
    #[case(vec![1.0, f64::NAN, 1.0, 1.0])]
    #[case(vec![f64::MAX, f64::MAX, 1.0, 1.0])]
    fn bad_weights_are_rejected(#[case] weights: Vec<f64>) {
        let err = compute_weighted_centroid(&corners(), &weights).unwrap_err();
        assert!(matches!(err, LocatorError::InvalidWeight(_)));
    }

    #[test]
    fn empty_centroids_are_rejected_first() {
        assert!(matches!(compute_weighted_centroid(&[], &[1.0]), Err(LocatorError::EmptyInput(_))));
    }

    #[test]
    fn feature_centroids_pair_up_with_weights() {
        let features = vec![
            FeatureRing { ring: [corners(), vec![Coordinate::new(0.0, 0.0)]].concat(), weight: 5.0 },
            FeatureRing { ring: vec![Coordinate::new(10.0, 10.0)], weight: 1.0 },
        ];
        let (centroids, weights) = feature_centroids(&features).unwrap();
        assert_eq!(centroids, vec![Coordinate::new(2.0, 1.0), Coordinate::new(10.0, 10.0)]);
        assert_eq!(weights, vec![5.0, 1.0]);
    }
}
