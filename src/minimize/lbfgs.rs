use crate::minimize::{
    Minimizer, MinimizerError, Solution, check_gradient,
    config::{CurvatureGuard, SolverConfig},
    line_search::wolfe_line_search,
    objective::{EvalCounter, ObjGradFn},
    validate_start,
};
use crate::ring_buffer::RingBuffer;
use ndarray::prelude::*;

/// One step `s = x_{k+1} - x_k` and gradient change `y = g_{k+1} - g_k`.
#[derive(Debug, Clone)]
pub struct CurvaturePair {
    pub s: Array1<f64>,
    pub y: Array1<f64>,
    /// `1 / yᵗs`
    pub rho: f64,
}

impl CurvaturePair {
    pub fn new(s: Array1<f64>, y: Array1<f64>) -> Self {
        let rho = 1.0 / y.dot(&s);
        CurvaturePair { s, y, rho }
    }
}

/// Two-loop recursion: returns `-H ∇f` where `H` is the inverse Hessian
/// implied by `history` (oldest pair first), scaled by `γ = sᵗy / yᵗy` of the
/// newest pair. With no history this is steepest descent.
pub fn compute_direction(g: &Array1<f64>, history: &RingBuffer<CurvaturePair>) -> Array1<f64> {
    let Some(last) = history.last() else {
        return -g;
    };

    let mut q = g.clone();
    let mut alpha = vec![0.0; history.len()];

    for (i, pair) in history.iter().enumerate().rev() {
        alpha[i] = pair.rho * pair.s.dot(&q);
        q.scaled_add(-alpha[i], &pair.y);
    }

    let yy = last.y.dot(&last.y);
    let gamma = if yy > 0.0 { last.s.dot(&last.y) / yy } else { 1.0 };
    let mut r = q * gamma;

    for (i, pair) in history.iter().enumerate() {
        let beta = pair.rho * pair.y.dot(&r);
        r.scaled_add(alpha[i] - beta, &pair.s);
    }

    -r
}

/// Limited-memory BFGS.
///
/// Keeps the `memory` most recent curvature pairs instead of a dense matrix;
/// the oldest pair is dropped once the history is full.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    config: SolverConfig,
    iters: usize,
}

impl Default for Lbfgs {
    fn default() -> Self {
        Lbfgs::new(SolverConfig::default())
    }
}

impl Lbfgs {
    pub fn new(config: SolverConfig) -> Self {
        Lbfgs { config, iters: 0 }
    }

    pub fn memory(&self) -> usize {
        self.config.memory
    }
}

/// Push `(s, y)` onto `history` unless `yᵗs ≤ 0` and `guard` is
/// `CurvatureGuard::Skip`. Returns whether the pair was stored.
pub fn store_pair(
    history: &mut RingBuffer<CurvaturePair>,
    s: Array1<f64>,
    y: Array1<f64>,
    guard: CurvatureGuard,
) -> bool {
    let ys = y.dot(&s);
    if !(ys > 0.0) {
        match guard {
            CurvatureGuard::Skip => {
                log::warn!("[L-BFGS] Non-positive curvature yᵗs = {:e}; pair skipped.", ys);
                return false;
            }
            CurvatureGuard::Unguarded => {
                log::warn!("[L-BFGS] Non-positive curvature yᵗs = {:e}; storing pair anyway.", ys);
            }
        }
    }
    history.push(CurvaturePair::new(s, y));
    true
}

impl Lbfgs {
    // the solve loop; also hands back the curvature history it ended with
    fn run(
        &mut self,
        x0: Array1<f64>,
        f: &dyn ObjGradFn,
    ) -> Result<(Solution, RingBuffer<CurvaturePair>), MinimizerError> {
        self.iters = 0;
        let n = validate_start(&self.config, &x0)?;
        let mut history = RingBuffer::new(self.config.memory)?;
        let counter = EvalCounter::new(f);
        let tol = self.config.tolerance;

        let mut x = x0;
        let mut g = counter.grad(&x);
        let mut g_norm = check_gradient(&g, n)?;

        while self.iters < self.config.max_iterations && g_norm > tol {
            let p = compute_direction(&g, &history);

            let step = wolfe_line_search(&x, &p, &counter, &self.config.wolfe);
            let s = &p * step.alpha;
            let x_next = &x + &s;

            let g_next = counter.grad(&x_next);
            g_norm = check_gradient(&g_next, n)?;
            let y = &g_next - &g;

            store_pair(&mut history, s, y, self.config.curvature_guard);

            x = x_next;
            g = g_next;
            self.iters += 1;

            log::debug!(
                "[L-BFGS] iter {}: |g| = {:e}, alpha = {:e}, pairs = {}",
                self.iters,
                g_norm,
                step.alpha,
                history.len()
            );
        }

        Ok((Solution::from_counter(x, &counter, self.iters, tol), history))
    }
}

impl Minimizer for Lbfgs {
    fn solve(&mut self, x0: Array1<f64>, f: &dyn ObjGradFn) -> Result<Solution, MinimizerError> {
        self.run(x0, f).map(|(sol, _)| sol)
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
