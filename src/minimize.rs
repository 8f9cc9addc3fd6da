use crate::linalg::norm;
use ndarray::prelude::*;

pub mod bfgs;
pub mod config;
pub mod lbfgs;
pub mod line_search;
pub mod newton;
pub mod objective;
pub mod solver;

pub use crate::error::MinimizerError;
pub use self::bfgs::Bfgs;
pub use self::config::{CurvatureGuard, SolverConfig, SolverKind, WolfeParams};
pub use self::lbfgs::{CurvaturePair, Lbfgs};
pub use self::line_search::{LineSearchResult, wolfe_line_search};
pub use self::newton::Newton;
pub use self::objective::{
    EvalCounter, HessFn, MultiDimFn, MultiDimGradFn, MultiDimHessFn, MultiDimNumGradFn, ObjFn,
    ObjGradFn,
};
pub use self::solver::Solver;

/// Outcome of a single `solve` call
#[derive(Debug, Clone)]
pub struct Solution {
    pub x_min: Array1<f64>,
    pub f_min: f64,
    pub gradient_norm: f64,
    pub iterations: usize,
    /// `gradient_norm <= tolerance`
    pub converged: bool,
    pub function_evaluations: usize,
    pub gradient_evaluations: usize,
}

impl Solution {
    pub(crate) fn from_counter(
        x_min: Array1<f64>,
        counter: &EvalCounter,
        iterations: usize,
        tolerance: f64,
    ) -> Self {
        let f_min = counter.call(&x_min);
        let gradient_norm = norm(&counter.grad(&x_min));
        Solution {
            x_min,
            f_min,
            gradient_norm,
            iterations,
            converged: gradient_norm <= tolerance,
            function_evaluations: counter.fn_evals(),
            gradient_evaluations: counter.g_evals(),
        }
    }
}

/// Capability shared by every descent algorithm.
///
/// A solve owns its whole iteration loop and returns once the gradient norm
/// is at most the tolerance or `max_iterations` steps have been taken.
/// Curvature state lives only for the duration of one call; the instance keeps
/// its configuration and the iteration count of the last solve.
pub trait Minimizer {
    fn solve(&mut self, x0: Array1<f64>, f: &dyn ObjGradFn) -> Result<Solution, MinimizerError>;

    fn config(&self) -> &SolverConfig;

    fn config_mut(&mut self) -> &mut SolverConfig;

    /// Iterations performed by the last `solve`
    fn iterations(&self) -> usize;

    fn set_max_iterations(&mut self, max_iters: usize) {
        self.config_mut().max_iterations = max_iters;
    }

    fn set_tolerance(&mut self, tol: f64) {
        self.config_mut().tolerance = tol;
    }

    fn tolerance(&self) -> f64 {
        self.config().tolerance
    }

    /// Seed for a dense Hessian approximation. Solvers that keep none ignore it.
    fn set_initial_hessian(&mut self, _b0: Array2<f64>) {}
}

/// Common argument checks at the start of a solve
pub(crate) fn validate_start(
    config: &SolverConfig,
    x0: &Array1<f64>,
) -> Result<usize, MinimizerError> {
    config.validate()?;
    if x0.is_empty() {
        return Err(MinimizerError::InvalidDimension);
    }
    Ok(x0.len())
}

pub(crate) fn check_gradient(g: &Array1<f64>, n: usize) -> Result<f64, MinimizerError> {
    if g.len() != n {
        return Err(MinimizerError::GradientDimensionMismatch {
            expected: n,
            found: g.len(),
        });
    }
    let g_norm = norm(g);
    if !g_norm.is_finite() {
        return Err(MinimizerError::NonFiniteGradient);
    }
    Ok(g_norm)
}
