use crate::minimize::{config::WolfeParams, objective::ObjGradFn};
use ndarray::prelude::*;

/// Line search result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchResult {
    pub alpha: f64,
    pub iterations: usize,
    /// False when the iteration cap ran out and `alpha` is the last trial step.
    pub converged: bool,
}

/// Bracketing line search for the weak Wolfe conditions.
///
/// `p` must be a descent direction at `x`. Starting from `alpha = 1` the
/// bracket `[alpha_min, alpha_max)` is grown by doubling until an upper bound
/// is known, then bisected (scaled by `rho`) until both
///
/// * `f(x + αp) ≤ f(x) + c1·α·∇f(x)·p` and
/// * `∇f(x + αp)·p ≥ c2·∇f(x)·p`
///
/// hold. If the cap is reached the last computed step is returned with
/// `converged == false`; it is not guaranteed to satisfy either condition.
pub fn wolfe_line_search(
    x: &Array1<f64>,
    p: &Array1<f64>,
    f: &dyn ObjGradFn,
    params: &WolfeParams,
) -> LineSearchResult {
    let f_old = f.call(x);
    let slope_old = f.grad(x).dot(p);

    let mut alpha_min = 0.0;
    let mut alpha_max = f64::INFINITY;
    let mut alpha = 1.0;

    for i in 0..params.max_iterations {
        let mut x_new = x.clone();
        x_new.scaled_add(alpha, p);
        let f_new = f.call(&x_new);

        // a non-finite value counts as too long a step
        if !f_new.is_finite() || f_new > f_old + params.c1 * alpha * slope_old {
            alpha_max = alpha;
            alpha = params.rho * (alpha_min + alpha_max);
            continue;
        }

        let slope_new = f.grad(&x_new).dot(p);
        if slope_new < params.c2 * slope_old {
            alpha_min = alpha;
            if alpha_max.is_infinite() {
                alpha *= 2.0;
            } else {
                alpha = params.rho * (alpha_min + alpha_max);
            }
            continue;
        }

        return LineSearchResult {
            alpha,
            iterations: i + 1,
            converged: true,
        };
    }

    log::debug!(
        "line search exhausted {} iterations, falling back to alpha = {:e}",
        params.max_iterations,
        alpha
    );
    LineSearchResult {
        alpha,
        iterations: params.max_iterations,
        converged: false,
    }
}
