//! Timing harness that runs named test procedures against named solvers.
//!
//! The registry is an ordinary value: build a [`Suite`] (or hand the two
//! tables to [`run_suite`] directly) and inspect the returned reports.

use crate::minimize::{Minimizer, MinimizerError, Solution, Solver, SolverConfig, SolverKind};
use crate::test_functions::{
    ackley_hessian, ackley_problem, rastrigin_hessian, rastrigin_problem, rosenbrock_hessian,
    rosenbrock_problem,
};
use ndarray::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// A test body: configures the solver it is given, runs it and checks the result.
pub type Procedure = Box<dyn Fn(&mut Solver) -> Result<Solution, MinimizerError>>;

/// One (test, implementation) run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub test: String,
    pub implementation: String,
    pub elapsed: Duration,
    pub iterations: usize,
    pub tolerance: f64,
    pub outcome: Result<Solution, MinimizerError>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        matches!(&self.outcome, Ok(sol) if sol.converged)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  implementation: {}", self.implementation)?;
        writeln!(f, "\t time elapsed: {} us", self.elapsed.as_micros())?;
        writeln!(f, "\t iterations:   {}", self.iterations)?;
        write!(f, "\t tolerance:    {:e}", self.tolerance)?;
        match &self.outcome {
            Ok(sol) => write!(f, "\n\t |grad|:       {:e}", sol.gradient_norm),
            Err(e) => write!(f, "\n\t error:        {}", e),
        }
    }
}

/// Run every test (whose name matches `filter`, if given) on every
/// implementation, in registration order for tests and name order for
/// implementations.
pub fn run_suite(
    implementations: &mut BTreeMap<String, Solver>,
    tests: &[(String, Procedure)],
    filter: Option<&Regex>,
) -> Vec<RunReport> {
    let mut reports = Vec::new();

    for (test_name, procedure) in tests {
        if filter.is_some_and(|re| !re.is_match(test_name)) {
            continue;
        }
        log::info!("====================== RUNNING TEST: {} ======================", test_name);

        for (impl_name, solver) in implementations.iter_mut() {
            let before = Instant::now();
            let outcome = procedure(solver);
            let elapsed = before.elapsed();

            let report = RunReport {
                test: test_name.clone(),
                implementation: impl_name.clone(),
                elapsed,
                iterations: solver.iterations(),
                tolerance: solver.tolerance(),
                outcome,
            };
            log::info!("{}", report);
            if !report.passed() {
                log::warn!("{} did not converge on {}", impl_name, test_name);
            }
            reports.push(report);
        }
    }

    reports
}

#[derive(Default)]
pub struct Suite {
    implementations: BTreeMap<String, Solver>,
    tests: Vec<(String, Procedure)>,
}

impl Suite {
    pub fn new() -> Self {
        Suite::default()
    }

    /// Register a solver; a second registration under the same name replaces the first.
    pub fn add_implementation(&mut self, name: &str, solver: Solver) {
        self.implementations.insert(name.to_string(), solver);
    }

    pub fn add_test<P>(&mut self, name: &str, procedure: P)
    where
        P: Fn(&mut Solver) -> Result<Solution, MinimizerError> + 'static,
    {
        self.tests.push((name.to_string(), Box::new(procedure)));
    }

    pub fn implementation_names(&self) -> Vec<&str> {
        self.implementations.keys().map(|k| k.as_str()).collect()
    }

    pub fn test_names(&self) -> Vec<&str> {
        self.tests.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn run(&mut self, filter: Option<&Regex>) -> Vec<RunReport> {
        run_suite(&mut self.implementations, &self.tests, filter)
    }
}

fn alternating(n: usize, even: f64, odd: f64) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| if i % 2 == 0 { even } else { odd })
}

pub fn rosenbrock_test(solver: &mut Solver) -> Result<Solution, MinimizerError> {
    let n = 4;
    solver.set_max_iterations(4000);
    solver.set_tolerance(1e-12);
    solver.set_initial_hessian(Array2::eye(n));
    solver.set_hessian(rosenbrock_hessian);
    solver.solve(alternating(n, -1.2, 1.0), &rosenbrock_problem())
}

pub fn ackley_test(solver: &mut Solver) -> Result<Solution, MinimizerError> {
    let n = 3;
    solver.set_max_iterations(4000);
    solver.set_tolerance(1e-10);
    solver.set_initial_hessian(Array2::eye(n));
    solver.set_hessian(ackley_hessian);
    solver.solve(array![10.0, -5.0, 1.0], &ackley_problem())
}

pub fn rastrigin_test(solver: &mut Solver) -> Result<Solution, MinimizerError> {
    let n = 5;
    solver.set_max_iterations(5000);
    solver.set_tolerance(1e-9);
    solver.set_initial_hessian(Array2::eye(n));
    solver.set_hessian(rastrigin_hessian);
    solver.solve(alternating(n, 4.0, -4.0), &rastrigin_problem())
}

/// The three solvers against the Rosenbrock, Ackley and Rastrigin procedures.
pub fn standard_suite() -> Suite {
    let mut suite = Suite::new();
    for kind in SolverKind::all() {
        suite.add_implementation(kind.to_str(), Solver::new(kind, SolverConfig::default()));
    }
    suite.add_test("rosenbrock function", rosenbrock_test);
    suite.add_test("ackley function", ackley_test);
    suite.add_test("rastrigin function", rastrigin_test);
    suite
}
