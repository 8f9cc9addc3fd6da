//! Unconstrained minimization of smooth functions with Newton's method, BFGS
//! and L-BFGS, all sharing one weak-Wolfe line search.
//!
//! ```
//! use ndarray::array;
//! use optkit::prelude::*;
//!
//! let bowl = MultiDimGradFn::new(
//!     |x: &ndarray::Array1<f64>| x.dot(x),
//!     |x: &ndarray::Array1<f64>| x * 2.0,
//! );
//! let mut solver = Solver::new(SolverKind::BFGS, SolverConfig::default());
//! let sol = solver.solve(array![1.0, -2.0], &bowl).unwrap();
//! assert!(sol.converged);
//! ```

pub mod error;
pub mod harness;
pub mod linalg;
pub mod minimize;
pub mod prelude;
pub mod ring_buffer;
pub mod test_functions;
