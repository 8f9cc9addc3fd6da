use crate::error::MinimizerError;
use simple_error::{SimpleError, bail};
use std::fmt;
use std::str::FromStr;

/// Weak Wolfe line-search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WolfeParams {
    pub c1: f64,  // sufficient decrease (Armijo)
    pub c2: f64,  // curvature
    pub rho: f64, // contraction factor applied to the bracket
    pub max_iterations: usize,
}

impl Default for WolfeParams {
    fn default() -> Self {
        Self {
            c1: 1e-4,
            c2: 0.9,
            rho: 0.5,
            max_iterations: 50,
        }
    }
}

impl WolfeParams {
    pub fn validate(&self) -> Result<(), MinimizerError> {
        if !(self.c1 > 0.0 && self.c1 < self.c2 && self.c2 < 1.0) {
            return Err(MinimizerError::InvalidParameters(format!(
                "line search constants must satisfy 0 < c1 < c2 < 1, got c1 = {}, c2 = {}",
                self.c1, self.c2
            )));
        }
        if !(self.rho > 0.0 && self.rho < 1.0) {
            return Err(MinimizerError::InvalidParameters(format!(
                "contraction factor must lie in (0, 1), got {}",
                self.rho
            )));
        }
        if self.max_iterations == 0 {
            return Err(MinimizerError::InvalidParameters(
                "line search needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a quasi-Newton update does when the curvature term `yᵗs` is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurvatureGuard {
    /// Apply the update regardless; the approximation may lose definiteness.
    #[default]
    Unguarded,
    /// Leave the approximation or history untouched for that step.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub wolfe: WolfeParams,
    /// Number of curvature pairs kept by L-BFGS
    pub memory: usize,
    pub curvature_guard: CurvatureGuard,
    /// Relative residual accepted from the BFGS direction solve
    pub linear_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-10,
            wolfe: WolfeParams::default(),
            memory: 15,
            curvature_guard: CurvatureGuard::Unguarded,
            linear_tolerance: 1e-10,
        }
    }
}

impl SolverConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_wolfe(mut self, wolfe: WolfeParams) -> Self {
        self.wolfe = wolfe;
        self
    }

    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_curvature_guard(mut self, guard: CurvatureGuard) -> Self {
        self.curvature_guard = guard;
        self
    }

    pub fn with_linear_tolerance(mut self, tolerance: f64) -> Self {
        self.linear_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), MinimizerError> {
        if self.max_iterations == 0 {
            return Err(MinimizerError::InvalidParameters(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MinimizerError::InvalidTolerance);
        }
        if self.memory == 0 {
            return Err(MinimizerError::InvalidParameters(
                "memory must be at least 1".to_string(),
            ));
        }
        if !self.linear_tolerance.is_finite() || self.linear_tolerance <= 0.0 {
            return Err(MinimizerError::InvalidParameters(format!(
                "linear solve tolerance must be positive, got {}",
                self.linear_tolerance
            )));
        }
        self.wolfe.validate()
    }
}

/// The available descent algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Newton,
    BFGS,
    LBFGS,
}

impl SolverKind {
    // Convert text from a String into SolverKind
    pub fn from_string(val: String) -> Result<SolverKind, SimpleError> {
        match val.to_lowercase().as_str() {
            "newton" => Ok(SolverKind::Newton),
            "bfgs" => Ok(SolverKind::BFGS),
            "lbfgs" | "l-bfgs" | "l_bfgs" => Ok(SolverKind::LBFGS),
            _ => bail!("string not a valid solver name"),
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            SolverKind::Newton => "Newton",
            SolverKind::BFGS => "BFGS",
            SolverKind::LBFGS => "L-BFGS",
        }
    }

    pub fn all() -> Vec<SolverKind> {
        vec![SolverKind::Newton, SolverKind::BFGS, SolverKind::LBFGS]
    }
}

impl FromStr for SolverKind {
    type Err = SimpleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverKind::from_string(s.to_string())
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 1000);
        assert_eq!(config.tolerance, 1e-10);
        assert_eq!(config.memory, 15);
        assert_eq!(config.wolfe.c1, 1e-4);
        assert_eq!(config.wolfe.c2, 0.9);
        assert_eq!(config.wolfe.rho, 0.5);
        assert_eq!(config.wolfe.max_iterations, 50);
        assert_eq!(config.curvature_guard, CurvatureGuard::Unguarded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::default()
            .with_max_iterations(10)
            .with_tolerance(1e-6)
            .with_memory(3)
            .with_curvature_guard(CurvatureGuard::Skip);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.memory, 3);
        assert_eq!(config.curvature_guard, CurvatureGuard::Skip);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(SolverConfig::default().with_max_iterations(0).validate().is_err());
        assert_eq!(
            SolverConfig::default().with_tolerance(0.0).validate(),
            Err(MinimizerError::InvalidTolerance)
        );
        assert_eq!(
            SolverConfig::default().with_tolerance(f64::NAN).validate(),
            Err(MinimizerError::InvalidTolerance)
        );
        assert!(SolverConfig::default().with_memory(0).validate().is_err());

        let wolfe = WolfeParams {
            c1: 0.95,
            ..WolfeParams::default()
        };
        assert!(SolverConfig::default().with_wolfe(wolfe).validate().is_err());

        let wolfe = WolfeParams {
            rho: 1.0,
            ..WolfeParams::default()
        };
        assert!(wolfe.validate().is_err());
    }

    #[test]
    fn test_solver_kind_parsing() {
        assert_eq!(SolverKind::from_string("BFGS".to_string()).unwrap(), SolverKind::BFGS);
        assert_eq!("newton".parse::<SolverKind>().unwrap(), SolverKind::Newton);
        assert_eq!("L-BFGS".parse::<SolverKind>().unwrap(), SolverKind::LBFGS);
        assert!("gradient-descent".parse::<SolverKind>().is_err());
    }

    #[test]
    fn test_solver_kind_display() {
        assert_eq!(SolverKind::LBFGS.to_string(), "L-BFGS");
        assert_eq!(SolverKind::all().len(), 3);
    }
}
