use tracing::{debug, trace};

use crate::config::constants::{ARMIJO_C1, LINE_SEARCH_MAX_HALVINGS, LINE_SEARCH_SHRINK};
use crate::config::locator_config::MinimizeOptions;
use crate::data::poi::Coordinate;
use crate::error::{LocatorError, LocatorResult};

/// Why a minimization run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    GradientTolerance,
    FunctionTolerance,
    /// No step along the search direction lowers the objective any further.
    LineSearchStalled,
    MaxIterations,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOutcome {
    pub point: Coordinate,
    pub value: f64,
    pub iterations: usize,
    pub termination: Termination,
}

impl MinimizeOutcome {
    pub fn converged(&self) -> bool {
        self.termination != Termination::MaxIterations
    }
}

/// Unconstrained minimization over the plane. Implementations report
/// non-convergence through [`MinimizeOutcome::termination`] and reserve
/// errors for inputs they cannot start from.
pub trait Minimizer {
    fn minimize(
        &self,
        objective: &dyn Fn(&Coordinate) -> f64,
        initial: Coordinate,
        options: &MinimizeOptions,
    ) -> LocatorResult<MinimizeOutcome>;
}

/// Quasi-Newton BFGS with a central finite-difference gradient and an Armijo
/// backtracking line search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bfgs;

type Vec2 = [f64; 2];
type Mat2 = [[f64; 2]; 2];

const IDENTITY: Mat2 = [[1.0, 0.0], [0.0, 1.0]];
const MIN_CURVATURE: f64 = 1e-12;

fn dot(a: Vec2, b: Vec2) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

fn mat_vec(m: &Mat2, v: Vec2) -> Vec2 {
    [m[0][0] * v[0] + m[0][1] * v[1], m[1][0] * v[0] + m[1][1] * v[1]]
}

fn to_point(v: Vec2) -> Coordinate {
    Coordinate::new(v[0], v[1])
}

fn gradient(objective: &dyn Fn(&Coordinate) -> f64, x: Vec2, fd_step: f64) -> Vec2 {
    let mut g = [0.0; 2];
    for i in 0..2 {
        let h = fd_step * x[i].abs().max(1.0);
        let mut forward = x;
        let mut backward = x;
        forward[i] += h;
        backward[i] -= h;
        g[i] = (objective(&to_point(forward)) - objective(&to_point(backward))) / (2.0 * h);
    }
    g
}

/// H ← (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ, with ρ = 1 / yᵀs
fn bfgs_update(h: &Mat2, s: Vec2, y: Vec2, sy: f64) -> Mat2 {
    let rho = 1.0 / sy;
    let mut left = IDENTITY;
    for i in 0..2 {
        for j in 0..2 {
            left[i][j] -= rho * s[i] * y[j];
        }
    }

    let mut tmp = [[0.0; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            tmp[i][j] = (0..2).map(|k| left[i][k] * h[k][j]).sum();
        }
    }

    let mut next = [[0.0; 2]; 2];
    for i in 0..2 {
        for j in 0..2 {
            // right factor is leftᵀ
            next[i][j] = (0..2).map(|k| tmp[i][k] * left[j][k]).sum::<f64>() + rho * s[i] * s[j];
        }
    }
    next
}

impl Minimizer for Bfgs {
    fn minimize(
        &self,
        objective: &dyn Fn(&Coordinate) -> f64,
        initial: Coordinate,
        options: &MinimizeOptions,
    ) -> LocatorResult<MinimizeOutcome> {
        options.validate()?;

        let mut x = [initial.x, initial.y];
        let mut f = objective(&initial);
        if !f.is_finite() {
            return Err(LocatorError::Optimization { best: initial, iterations: 0 });
        }
        let mut g = gradient(objective, x, options.fd_step);
        let mut h = IDENTITY;
        let mut fresh_hessian = true;

        let outcome = |x: Vec2, value: f64, iterations: usize, termination: Termination| -> LocatorResult<MinimizeOutcome> {
            debug!("BFGS stopped after {} iterations ({:?}), f = {:.9}", iterations, termination, value);
            Ok(MinimizeOutcome { point: to_point(x), value, iterations, termination })
        };

        for iteration in 0..options.max_iterations {
            let g_norm = g[0].abs().max(g[1].abs());
            if g_norm <= options.gradient_tolerance {
                return outcome(x, f, iteration, Termination::GradientTolerance);
            }

            let mut d = mat_vec(&h, g);
            d = [-d[0], -d[1]];
            if dot(g, d) >= 0.0 {
                h = IDENTITY;
                fresh_hessian = true;
                d = [-g[0], -g[1]];
            }
            let slope = dot(g, d);

            // an unscaled identity step can overshoot wildly, start at unit length instead
            let mut alpha = if fresh_hessian { (1.0 / g_norm).min(1.0) } else { 1.0 };
            let mut accepted = None;
            for _ in 0..LINE_SEARCH_MAX_HALVINGS {
                let candidate = [x[0] + alpha * d[0], x[1] + alpha * d[1]];
                let value = objective(&to_point(candidate));
                if value.is_finite() && value <= f + ARMIJO_C1 * alpha * slope {
                    accepted = Some((candidate, value));
                    break;
                }
                alpha *= LINE_SEARCH_SHRINK;
            }

            let Some((x_new, f_new)) = accepted else {
                return outcome(x, f, iteration, Termination::LineSearchStalled);
            };

            let g_new = gradient(objective, x_new, options.fd_step);
            let s = [x_new[0] - x[0], x_new[1] - x[1]];
            let y = [g_new[0] - g[0], g_new[1] - g[1]];
            let decrease = f - f_new;
            trace!("iteration {}: alpha = {:.3e}, f = {:.9}", iteration, alpha, f_new);

            x = x_new;
            f = f_new;
            g = g_new;

            if decrease <= options.function_tolerance * f.abs().max(1.0) {
                return outcome(x, f, iteration + 1, Termination::FunctionTolerance);
            }

            let sy = dot(s, y);
            if sy > MIN_CURVATURE {
                h = bfgs_update(&h, s, y, sy);
                fresh_hessian = false;
            }
        }

        outcome(x, f, options.max_iterations, Termination::MaxIterations)
    }
}
