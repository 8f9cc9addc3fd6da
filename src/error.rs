/// Error types for the minimizers.
///
/// Every variant is a fatal condition for the solve that produced it; the
/// iterate reached so far is not returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MinimizerError {
    #[error("Invalid dimension or empty vector")]
    InvalidDimension,
    #[error("Tolerance must be positive and finite")]
    InvalidTolerance,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Gradient has dimension {found}, expected {expected}")]
    GradientDimensionMismatch { expected: usize, found: usize },
    #[error("The gradient norm was NaN or infinity")]
    NonFiniteGradient,
    #[error("Hessian must be square, got {rows}x{cols}")]
    HessianNotSquare { rows: usize, cols: usize },
    #[error("Hessian/gradient size mismatch: Hessian is {size}x{size}, gradient has {expected}")]
    HessianDimensionMismatch { size: usize, expected: usize },
    #[error("Initial Hessian is {rows}x{cols}, expected {expected}x{expected}")]
    InitialHessianDimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
    },
    #[error("Newton's method requires a Hessian oracle")]
    MissingHessian,
    #[error("Factorization failed: {0}")]
    FactorizationFailed(String),
    #[error("Linear solve failed: {0}")]
    LinearSolveFailed(String),
}
