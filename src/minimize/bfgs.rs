use crate::linalg::{conjugate_gradient_solve, outer};
use crate::minimize::{
    Minimizer, MinimizerError, Solution, check_gradient,
    config::{CurvatureGuard, SolverConfig},
    line_search::wolfe_line_search,
    objective::{EvalCounter, ObjGradFn},
    validate_start,
};
use ndarray::prelude::*;

/// BFGS (Broyden-Fletcher-Goldfarb-Shanno) quasi-Newton method.
///
/// Keeps a dense approximation `B` of the Hessian, seeded with the initial
/// Hessian (identity by default), and computes every search direction by
/// solving `B p = -∇f(x)` with preconditioned conjugate gradients instead of
/// inverting `B`. After each accepted step `B` receives the rank-2 update
///
/// `B ← B + y yᵗ / (yᵗs) − (Bs)(Bs)ᵗ / (sᵗBs)`
///
/// which keeps `B` symmetric, and positive definite as long as `yᵗs > 0`.
#[derive(Debug, Clone)]
pub struct Bfgs {
    config: SolverConfig,
    initial_hessian: Option<Array2<f64>>,
    iters: usize,
}

impl Default for Bfgs {
    fn default() -> Self {
        Bfgs::new(SolverConfig::default())
    }
}

impl Bfgs {
    pub fn new(config: SolverConfig) -> Self {
        Bfgs {
            config,
            initial_hessian: None,
            iters: 0,
        }
    }

    fn seed(&self, n: usize) -> Result<Array2<f64>, MinimizerError> {
        match &self.initial_hessian {
            Some(b0) if b0.dim() != (n, n) => Err(MinimizerError::InitialHessianDimensionMismatch {
                rows: b0.nrows(),
                cols: b0.ncols(),
                expected: n,
            }),
            Some(b0) => Ok(b0.clone()),
            None => Ok(Array2::eye(n)),
        }
    }
}

/// Apply the BFGS rank-2 update to `b` in place.
///
/// Returns `false` when the update was skipped because the curvature terms
/// were not positive and `guard` is `CurvatureGuard::Skip`.
pub fn bfgs_update(
    b: &mut Array2<f64>,
    s: &Array1<f64>,
    y: &Array1<f64>,
    guard: CurvatureGuard,
) -> bool {
    let ys = y.dot(s);
    let bs = b.dot(s);
    let sbs = s.dot(&bs);

    if !(ys > 0.0 && sbs > 0.0) {
        match guard {
            CurvatureGuard::Skip => {
                log::warn!(
                    "[BFGS] Non-positive curvature (yᵗs = {:e}, sᵗBs = {:e}); skipping update.",
                    ys,
                    sbs
                );
                return false;
            }
            CurvatureGuard::Unguarded => {
                log::warn!(
                    "[BFGS] Non-positive curvature (yᵗs = {:e}, sᵗBs = {:e}); B may lose definiteness.",
                    ys,
                    sbs
                );
            }
        }
    }

    b.scaled_add(1.0 / ys, &outer(y, y));
    b.scaled_add(-1.0 / sbs, &outer(&bs, &bs));
    true
}

impl Minimizer for Bfgs {
    fn solve(&mut self, x0: Array1<f64>, f: &dyn ObjGradFn) -> Result<Solution, MinimizerError> {
        self.iters = 0;
        let n = validate_start(&self.config, &x0)?;
        let mut b = self.seed(n)?;
        let counter = EvalCounter::new(f);
        let tol = self.config.tolerance;
        let cg_max_iters = (10 * n).max(50);

        let mut x = x0;
        let mut g = counter.grad(&x);
        let mut g_norm = check_gradient(&g, n)?;

        while self.iters < self.config.max_iterations && g_norm > tol {
            let p = conjugate_gradient_solve(&b, &-&g, self.config.linear_tolerance, cg_max_iters)?.x;

            let step = wolfe_line_search(&x, &p, &counter, &self.config.wolfe);
            let s = &p * step.alpha;
            let x_next = &x + &s;

            let g_next = counter.grad(&x_next);
            g_norm = check_gradient(&g_next, n)?;
            let y = &g_next - &g;

            bfgs_update(&mut b, &s, &y, self.config.curvature_guard);

            x = x_next;
            g = g_next;
            self.iters += 1;

            log::debug!(
                "[BFGS] iter {}: |g| = {:e}, alpha = {:e}",
                self.iters,
                g_norm,
                step.alpha
            );
        }

        Ok(Solution::from_counter(x, &counter, self.iters, tol))
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }

    fn iterations(&self) -> usize {
        self.iters
    }

    fn set_initial_hessian(&mut self, b0: Array2<f64>) {
        self.initial_hessian = Some(b0);
    }
}
