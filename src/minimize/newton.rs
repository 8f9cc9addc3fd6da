use crate::linalg::symmetric_indefinite_solve;
use crate::minimize::{
    Minimizer, MinimizerError, Solution, check_gradient,
    config::SolverConfig,
    line_search::wolfe_line_search,
    objective::{EvalCounter, HessFn, ObjGradFn},
    validate_start,
};
use ndarray::prelude::*;

/// Full Newton method with line search.
///
/// Each iteration solves `H(x) p = -∇f(x)` with a symmetric-indefinite
/// factorization of the exact Hessian. When `p` is not a descent direction
/// (H is not positive definite along it) the step falls back to `-∇f(x)`.
#[derive(Clone)]
pub struct Newton {
    config: SolverConfig,
    hessian: Option<Box<dyn HessFn>>,
    iters: usize,
}

impl Default for Newton {
    fn default() -> Self {
        Newton::new(SolverConfig::default())
    }
}

impl Newton {
    pub fn new(config: SolverConfig) -> Self {
        Newton {
            config,
            hessian: None,
            iters: 0,
        }
    }

    /// Hessian oracle used in place of `ObjGradFn::hessian`.
    pub fn set_hessian<H>(&mut self, hessian: H)
    where
        H: Fn(&Array1<f64>) -> Array2<f64> + Clone + 'static,
    {
        self.hessian = Some(Box::new(hessian));
    }

    pub fn clear_hessian(&mut self) {
        self.hessian = None;
    }

    fn hessian_at(
        &self,
        f: &dyn ObjGradFn,
        x: &Array1<f64>,
    ) -> Result<Array2<f64>, MinimizerError> {
        match &self.hessian {
            Some(h) => Ok(h.hessian(x)),
            None => f.hessian(x).ok_or(MinimizerError::MissingHessian),
        }
    }

    fn newton_direction(
        &self,
        f: &dyn ObjGradFn,
        x: &Array1<f64>,
        g: &Array1<f64>,
    ) -> Result<Array1<f64>, MinimizerError> {
        let h = self.hessian_at(f, x)?;
        if h.nrows() != h.ncols() {
            return Err(MinimizerError::HessianNotSquare {
                rows: h.nrows(),
                cols: h.ncols(),
            });
        }
        if h.nrows() != g.len() {
            return Err(MinimizerError::HessianDimensionMismatch {
                size: h.nrows(),
                expected: g.len(),
            });
        }

        let p = symmetric_indefinite_solve(&h, &-g)?;
        if p.dot(g) >= 0.0 {
            log::warn!("[Newton] Non-descent direction; falling back to -g.");
            return Ok(-g);
        }
        Ok(p)
    }
}

impl Minimizer for Newton {
    fn solve(&mut self, x0: Array1<f64>, f: &dyn ObjGradFn) -> Result<Solution, MinimizerError> {
        self.iters = 0;
        let n = validate_start(&self.config, &x0)?;
        let counter = EvalCounter::new(f);
        let tol = self.config.tolerance;

        let mut x = x0;
        while self.iters < self.config.max_iterations {
            let g = counter.grad(&x);
            let g_norm = check_gradient(&g, n)?;
            if g_norm <= tol {
                break;
            }

            let p = self.newton_direction(&counter, &x, &g)?;
            let step = wolfe_line_search(&x, &p, &counter, &self.config.wolfe);
            x.scaled_add(step.alpha, &p);
            self.iters += 1;

            log::debug!(
                "[Newton] iter {}: |g| = {:e}, alpha = {:e}",
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimize::objective::{MultiDimGradFn, MultiDimHessFn};
    use approx::assert_abs_diff_eq;

    fn bowl() -> impl ObjGradFn + Clone {
        MultiDimHessFn::new(
            |x: &Array1<f64>| x.dot(x),
            |x: &Array1<f64>| x.mapv(|xi| 2.0 * xi),
            |x: &Array1<f64>| Array2::<f64>::eye(x.len()) * 2.0,
        )
    }

    #[test]
    fn test_newton_constructor() {
        let newton = Newton::default();
        assert_eq!(newton.iterations(), 0);
        assert_eq!(newton.tolerance(), 1e-10);
        assert!(newton.hessian.is_none());
    }

    #[test]
    fn test_quadratic_one_step() {
        let mut newton = Newton::default();
        let sol = newton.solve(array![1.0, -2.0, 3.0], &bowl()).unwrap();
        assert!(sol.converged);
        assert_eq!(sol.iterations, 1);
        assert_eq!(newton.iterations(), 1);
        for &xi in sol.x_min.iter() {
            assert_abs_diff_eq!(xi, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_already_at_minimum() {
        let mut newton = Newton::default();
        let sol = newton.solve(array![0.0, 0.0], &bowl()).unwrap();
        assert_eq!(sol.iterations, 0);
        assert!(sol.converged);
    }

    #[test]
    fn test_hessian_from_setter() {
        let obj = MultiDimGradFn::new(
            |x: &Array1<f64>| 3.0 * x[0].powi(2) + x[1].powi(2),
            |x: &Array1<f64>| array![6.0 * x[0], 2.0 * x[1]],
        );
        let mut newton = Newton::default();
        newton.set_hessian(|_x: &Array1<f64>| array![[6.0, 0.0], [0.0, 2.0]]);
        let sol = newton.solve(array![4.0, -7.0], &obj).unwrap();
        assert!(sol.converged);
        assert!(sol.iterations <= 2);
    }

    #[test]
    fn test_missing_hessian() {
        let obj = MultiDimGradFn::new(
            |x: &Array1<f64>| x.dot(x),
            |x: &Array1<f64>| x.mapv(|xi| 2.0 * xi),
        );
        let mut newton = Newton::default();
        let err = newton.solve(array![1.0], &obj).unwrap_err();
        assert_eq!(err, MinimizerError::MissingHessian);
    }

    #[test]
    fn test_non_square_hessian() {
        let mut newton = Newton::default();
        newton.set_hessian(|_x: &Array1<f64>| Array2::zeros((2, 3)));
        let err = newton.solve(array![1.0, 1.0], &bowl()).unwrap_err();
        assert_eq!(err, MinimizerError::HessianNotSquare { rows: 2, cols: 3 });
    }

    #[test]
    fn test_hessian_dimension_mismatch() {
        let mut newton = Newton::default();
        newton.set_hessian(|_x: &Array1<f64>| Array2::eye(3));
        let err = newton.solve(array![1.0, 1.0], &bowl()).unwrap_err();
        assert_eq!(
            err,
            MinimizerError::HessianDimensionMismatch {
                size: 3,
                expected: 2
            }
        );
    }

    #[test]
    fn test_indefinite_hessian_falls_back_to_steepest_descent() {
        // f = x0² - x1² + x1⁴ has a saddle at the origin and minima at x1 = ±1/√2
        let obj = MultiDimHessFn::new(
            |x: &Array1<f64>| x[0].powi(2) - x[1].powi(2) + x[1].powi(4),
            |x: &Array1<f64>| array![2.0 * x[0], -2.0 * x[1] + 4.0 * x[1].powi(3)],
            |x: &Array1<f64>| array![[2.0, 0.0], [0.0, -2.0 + 12.0 * x[1].powi(2)]],
        );
        let mut newton = Newton::new(SolverConfig::default().with_max_iterations(200));
        let sol = newton.solve(array![0.5, 0.1], &obj).unwrap();
        assert!(sol.converged);
        assert!(sol.f_min < 0.0);
        assert_abs_diff_eq!(sol.x_min[1].abs(), 1.0 / 2.0_f64.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_iteration_cap_respected() {
        let obj = crate::test_functions::rosenbrock_problem();
        let mut newton = Newton::default();
        newton.set_max_iterations(2);
        let sol = newton.solve(array![-1.2, 1.0], &obj).unwrap();
        assert_eq!(sol.iterations, 2);
        assert!(!sol.converged);
    }

    #[test]
    fn test_clear_hessian_restores_oracle_lookup() {
        let obj = MultiDimGradFn::new(
            |x: &Array1<f64>| x.dot(x),
            |x: &Array1<f64>| x.mapv(|xi| 2.0 * xi),
        );
        let mut newton = Newton::default();
        newton.set_hessian(|x: &Array1<f64>| Array2::<f64>::eye(x.len()) * 2.0);
        assert!(newton.solve(array![1.0, -2.0], &obj).unwrap().converged);

        newton.clear_hessian();
        assert!(newton.hessian.is_none());
        let err = newton.solve(array![1.0, -2.0], &obj).unwrap_err();
        assert_eq!(err, MinimizerError::MissingHessian);

        // an oracle that carries its own Hessian still works
        assert!(newton.solve(array![1.0, -2.0], &bowl()).unwrap().converged);
    }

    #[test]
    fn test_failed_solve_resets_iterations() {
        let obj = crate::test_functions::rosenbrock_problem();
        let mut newton = Newton::default();
        newton.solve(array![-1.2, 1.0], &obj).unwrap();
        assert!(newton.iterations() > 0);

        newton.set_tolerance(-1.0);
        assert_eq!(
            newton.solve(array![-1.2, 1.0], &obj).unwrap_err(),
            MinimizerError::InvalidTolerance
        );
        assert_eq!(newton.iterations(), 0);
    }
}
