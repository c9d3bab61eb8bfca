use crate::data::poi::Coordinate;
use crate::error::{LocatorError, LocatorResult};
use crate::utils::logging::{self, CalculationType, OperationCategory};

pub fn compute_centroid(points: &[Coordinate]) -> LocatorResult<Coordinate> {
    let _timing = logging::start_timing("compute_centroid",
        OperationCategory::Calculation { subcategory: CalculationType::Centroid });

    if points.is_empty() {
        return Err(LocatorError::EmptyInput("coordinates"));
    }

    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Ok(Coordinate::new(sum_x / n, sum_y / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn unit_square_centre() {
        let square = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ];
        let c = compute_centroid(&square).unwrap();
        assert_relative_eq!(c.x, 0.5);
        assert_relative_eq!(c.y, 0.5);
    }

    #[test]
    fn single_point_is_its_own_centroid() {
        let p = Coordinate::new(-3.70379, 40.41678);
        assert_eq!(compute_centroid(&[p]).unwrap(), p);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(compute_centroid(&[]), Err(LocatorError::EmptyInput(_))));
    }

    #[test]
    fn centroid_stays_inside_the_bounding_box() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(1..40);
            let points: Vec<Coordinate> = (0..n)
                .map(|_| Coordinate::new(rng.gen_range(-180.0..180.0), rng.gen_range(-90.0..90.0)))
                .collect();

            let c = compute_centroid(&points).unwrap();
            let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            assert!(c.x >= min_x - 1e-9 && c.x <= max_x + 1e-9);
            assert!(c.y >= min_y - 1e-9 && c.y <= max_y + 1e-9);
        }
    }
}
