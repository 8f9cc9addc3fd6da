use crate::minimize::{
    Bfgs, Lbfgs, Minimizer, MinimizerError, Newton, Solution,
    config::{SolverConfig, SolverKind},
    objective::ObjGradFn,
};
use ndarray::prelude::*;
use std::fmt;

/// Closed set of descent algorithms sharing the `Minimizer` contract.
#[derive(Clone)]
pub enum Solver {
    Newton(Newton),
    BFGS(Bfgs),
    LBFGS(Lbfgs),
}

impl Solver {
    pub fn new(kind: SolverKind, config: SolverConfig) -> Self {
        match kind {
            SolverKind::Newton => Solver::Newton(Newton::new(config)),
            SolverKind::BFGS => Solver::BFGS(Bfgs::new(config)),
            SolverKind::LBFGS => Solver::LBFGS(Lbfgs::new(config)),
        }
    }

    pub fn kind(&self) -> SolverKind {
        match self {
            Solver::Newton(_) => SolverKind::Newton,
            Solver::BFGS(_) => SolverKind::BFGS,
            Solver::LBFGS(_) => SolverKind::LBFGS,
        }
    }

    /// Install a Hessian oracle. Only Newton's method uses one; the call is
    /// ignored for the other variants.
    pub fn set_hessian<H>(&mut self, hessian: H)
    where
        H: Fn(&Array1<f64>) -> Array2<f64> + Clone + 'static,
    {
        if let Solver::Newton(newton) = self {
            newton.set_hessian(hessian);
        }
    }

    fn inner(&self) -> &dyn Minimizer {
        match self {
            Solver::Newton(s) => s,
            Solver::BFGS(s) => s,
            Solver::LBFGS(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Minimizer {
        match self {
            Solver::Newton(s) => s,
            Solver::BFGS(s) => s,
            Solver::LBFGS(s) => s,
        }
    }
}

impl Minimizer for Solver {
    fn solve(&mut self, x0: Array1<f64>, f: &dyn ObjGradFn) -> Result<Solution, MinimizerError> {
        self.inner_mut().solve(x0, f)
    }

    fn config(&self) -> &SolverConfig {
        self.inner().config()
    }

    fn config_mut(&mut self) -> &mut SolverConfig {
        self.inner_mut().config_mut()
    }

    fn iterations(&self) -> usize {
        self.inner().iterations()
    }

    fn set_initial_hessian(&mut self, b0: Array2<f64>) {
        self.inner_mut().set_initial_hessian(b0);
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}
