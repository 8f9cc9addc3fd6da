//! optkit prelude.
//!
//! This module contains the most used types, traits and functions that you
//! can import easily as a group.
//!
//! ```
//! use optkit::prelude::*;
//!
//! ```

#[doc(no_inline)]
pub use crate::error::MinimizerError;

#[doc(no_inline)]
pub use crate::minimize::{
    Bfgs, CurvatureGuard, Lbfgs, Minimizer, MultiDimFn, MultiDimGradFn, MultiDimHessFn,
    MultiDimNumGradFn, Newton, ObjFn, ObjGradFn, Solution, Solver, SolverConfig, SolverKind,
    WolfeParams,
};

#[doc(no_inline)]
pub use crate::harness::{RunReport, Suite, run_suite, standard_suite};

#[doc(no_inline)]
pub use crate::ring_buffer::RingBuffer;
