//! Bounded minimization for maximum-likelihood calibration.
//!
//! [`minimize_bounded`] runs argmin's Nelder–Mead simplex on a box-projected
//! objective: every trial point is clamped into the box before the
//! objective is evaluated, and the squared distance to the box is added as
//! a penalty so the simplex is pulled back inside. The reported optimum is
//! always a feasible point.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::error::{MathError, MathResult};

/// Objective value substituted for non-finite evaluations.
const INFEASIBLE_COST: f64 = 1e100;

/// Penalty weight on the squared distance outside the box.
const BOX_PENALTY: f64 = 1e8;

/// Configuration for optimization algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationConfig {
    /// Standard-deviation tolerance of the simplex costs.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u64,
    /// Relative size of the initial simplex around the starting point.
    pub initial_step: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 5000,
            initial_step: 0.05,
        }
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    /// Optimal parameters found (inside the bounds).
    pub parameters: Vec<f64>,
    /// Final objective function value.
    pub objective_value: f64,
    /// Number of iterations used.
    pub iterations: u64,
    /// Whether the simplex met its tolerance before the iteration cap.
    pub converged: bool,
}

/// Per-coordinate box constraints; use infinities for open sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from `(lower, upper)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any lower bound exceeds its upper bound.
    pub fn new(pairs: &[(f64, f64)]) -> MathResult<Self> {
        if let Some((lo, hi)) = pairs.iter().find(|(lo, hi)| lo > hi) {
            return Err(MathError::invalid_input(format!(
                "lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        Ok(Self {
            lower: pairs.iter().map(|p| p.0).collect(),
            upper: pairs.iter().map(|p| p.1).collect(),
        })
    }

    /// Unbounded box of the given dimension.
    #[must_use]
    pub fn unbounded(dim: usize) -> Self {
        Self {
            lower: vec![f64::NEG_INFINITY; dim],
            upper: vec![f64::INFINITY; dim],
        }
    }

    /// Number of coordinates.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Clamps a point into the box.
    #[must_use]
    pub fn project(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi))
            .collect()
    }

    fn violation(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| {
                let d = if v < lo {
                    lo - v
                } else if v > hi {
                    v - hi
                } else {
                    0.0
                };
                d * d
            })
            .sum()
    }
}

struct ProjectedCost<'a, F> {
    objective: &'a F,
    bounds: &'a Bounds,
}

impl<F> CostFunction for ProjectedCost<'_, F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, ArgminError> {
        let value = (self.objective)(&self.bounds.project(x));
        let value = if value.is_finite() {
            value
        } else {
            INFEASIBLE_COST
        };
        Ok(value + BOX_PENALTY * self.bounds.violation(x))
    }
}

/// Starting simplex: the projected start plus one vertex per coordinate,
/// stepped inward when the outward step would leave the box.
fn initial_simplex(x0: &[f64], bounds: &Bounds, step: f64) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
        let mut vertex = x0.to_vec();
        let h = if x0[i] == 0.0 {
            0.00025
        } else {
            step * x0[i].abs()
        };
        vertex[i] = if x0[i] + h <= bounds.upper[i] {
            x0[i] + h
        } else {
            x0[i] - h
        };
        simplex.push(vertex);
    }
    simplex
}

/// Minimizes `objective` over the box `bounds`, starting from `initial`.
///
/// # Errors
///
/// Returns an error on a dimension mismatch or if the solver cannot be
/// constructed. Failing to converge is not an error: it is reported
/// through [`OptimizationResult::converged`].
pub fn minimize_bounded<F>(
    objective: F,
    initial: &[f64],
    bounds: &Bounds,
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    MathError::check_lengths(initial.len(), bounds.dim())?;
    if initial.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }

    let x0 = bounds.project(initial);
    let simplex = initial_simplex(&x0, bounds, config.initial_step);
    let problem = ProjectedCost {
        objective: &objective,
        bounds,
    };

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(config.tolerance)
        .map_err(|e| MathError::optimization_failed(e.to_string()))?;
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iterations))
        .run()
        .map_err(|e| MathError::optimization_failed(e.to_string()))?;

    let state = &result.state;
    let converged = matches!(
        state.get_termination_reason(),
        Some(TerminationReason::SolverConverged)
    );
    let best = state.get_best_param().cloned().unwrap_or_else(|| x0.clone());
    let parameters = bounds.project(&best);
    let objective_value = objective(&parameters);
    let iterations = state.get_iter();

    debug!(iterations, converged, objective_value, "bounded minimization finished");

    Ok(OptimizationResult {
        parameters,
        objective_value,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unconstrained_quadratic() {
        let f = |x: &[f64]| (x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2);
        let result = minimize_bounded(
            f,
            &[0.2, 0.3],
            &Bounds::unbounded(2),
            &OptimizationConfig::default(),
        )
        .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.parameters[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.parameters[1], -0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_active_bound() {
        // Unconstrained optimum at -2 lies below the lower bound of 0.5.
        let f = |x: &[f64]| (x[0] + 2.0).powi(2);
        let bounds = Bounds::new(&[(0.5, f64::INFINITY)]).unwrap();
        let result = minimize_bounded(f, &[3.0], &bounds, &OptimizationConfig::default()).unwrap();

        assert!(result.parameters[0] >= 0.5);
        assert_relative_eq!(result.parameters[0], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let config = OptimizationConfig {
            max_iterations: 3,
            ..OptimizationConfig::default()
        };
        let result =
            minimize_bounded(rosenbrock, &[-1.2, 1.0], &Bounds::unbounded(2), &config).unwrap();
        assert!(!result.converged);
        assert!(result.iterations <= 3);
    }

    #[test]
    fn test_start_outside_box_is_projected() {
        let f = |x: &[f64]| x[0];
        let bounds = Bounds::new(&[(1.0, 2.0)]).unwrap();
        let result = minimize_bounded(f, &[10.0], &bounds, &OptimizationConfig::default()).unwrap();
        assert!(result.parameters[0] >= 1.0 && result.parameters[0] <= 2.0);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Bounds::new(&[(1.0, 0.0)]).is_err());
        let bounds = Bounds::new(&[(0.0, 1.0)]).unwrap();
        assert_eq!(bounds.project(&[-1.0]), vec![0.0]);
        let mismatched = minimize_bounded(
            |x: &[f64]| x[0],
            &[0.5, 0.5],
            &bounds,
            &OptimizationConfig::default(),
        );
        assert!(mismatched.is_err());
    }
}
