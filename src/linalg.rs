use crate::error::MinimizerError;
use faer::solvers::SpSolver;
use faer::{Mat, Side};
use ndarray::prelude::*;

/// Euclidean norm of a vector
pub fn norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}

/// Outer product `a bᵗ`
pub fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

/// Copy an ndarray matrix into a faer matrix.
pub fn to_faer(m: &Array2<f64>) -> Mat<f64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

/// Copy the first column of a faer matrix into an ndarray vector.
pub fn column_from_faer(m: &Mat<f64>) -> Array1<f64> {
    Array1::from_shape_fn(m.nrows(), |i| m.read(i, 0))
}

/// Solve `A x = b` for a symmetric, possibly indefinite `A`.
///
/// Uses the Bunch-Kaufman `LBLᵗ` decomposition; only the lower triangle of
/// `a` is read. A singular pivot shows up as non-finite entries in the
/// solution and is reported as a factorization failure.
pub fn symmetric_indefinite_solve(
    a: &Array2<f64>,
    b: &Array1<f64>,
) -> Result<Array1<f64>, MinimizerError> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(MinimizerError::FactorizationFailed(format!(
            "matrix is {}x{} but right-hand side has {} entries",
            a.nrows(),
            a.ncols(),
            n
        )));
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(MinimizerError::FactorizationFailed(
            "matrix contains non-finite entries".to_string(),
        ));
    }

    let lblt = to_faer(a).lblt(Side::Lower);
    let rhs = Mat::from_fn(n, 1, |i, _| b[i]);
    let x = column_from_faer(&lblt.solve(&rhs));

    if x.iter().any(|v| !v.is_finite()) {
        return Err(MinimizerError::FactorizationFailed(
            "LBLT solve produced non-finite values, matrix is singular".to_string(),
        ));
    }
    Ok(x)
}

/// Outcome of a converged conjugate-gradient solve
#[derive(Debug, Clone)]
pub struct LinearSolve {
    pub x: Array1<f64>,
    pub iterations: usize,
    pub relative_residual: f64,
}

/// Jacobi-preconditioned conjugate gradient for `A x = b`.
///
/// `A` must be symmetric positive definite. The solve fails as soon as this
/// is observed not to hold (a non-positive diagonal entry or a direction of
/// non-positive curvature), when a non-finite value shows up, or when the
/// relative residual `‖b - Ax‖ / ‖b‖` is still above `tol` after `max_iters`
/// iterations.
pub fn conjugate_gradient_solve(
    a: &Array2<f64>,
    b: &Array1<f64>,
    tol: f64,
    max_iters: usize,
) -> Result<LinearSolve, MinimizerError> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(MinimizerError::LinearSolveFailed(format!(
            "matrix is {}x{} but right-hand side has {} entries",
            a.nrows(),
            a.ncols(),
            n
        )));
    }

    let mut inv_diag = Array1::zeros(n);
    for i in 0..n {
        let d = a[[i, i]];
        if !d.is_finite() || d <= 0.0 {
            return Err(MinimizerError::LinearSolveFailed(format!(
                "diagonal entry {} is {}, matrix is not positive definite",
                i, d
            )));
        }
        inv_diag[i] = 1.0 / d;
    }

    let mut x = Array1::zeros(n);
    let b_norm = norm(b);
    if !b_norm.is_finite() {
        return Err(MinimizerError::LinearSolveFailed(
            "right-hand side contains non-finite entries".to_string(),
        ));
    }
    if b_norm == 0.0 {
        return Ok(LinearSolve {
            x,
            iterations: 0,
            relative_residual: 0.0,
        });
    }

    let mut r = b.clone();
    let mut z = &r * &inv_diag;
    let mut d = z.clone();
    let mut rz = r.dot(&z);
    let mut relative_residual = 1.0;

    for k in 0..max_iters {
        let ad = a.dot(&d);
        let curvature = d.dot(&ad);
        if !curvature.is_finite() {
            return Err(MinimizerError::LinearSolveFailed(
                "non-finite curvature encountered".to_string(),
            ));
        }
        if curvature <= 0.0 {
            return Err(MinimizerError::LinearSolveFailed(format!(
                "direction with curvature {:e}, matrix is not positive definite",
                curvature
            )));
        }

        let step = rz / curvature;
        x.scaled_add(step, &d);
        r.scaled_add(-step, &ad);

        relative_residual = norm(&r) / b_norm;
        if relative_residual <= tol {
            return Ok(LinearSolve {
                x,
                iterations: k + 1,
                relative_residual,
            });
        }

        z = &r * &inv_diag;
        let rz_next = r.dot(&z);
        let beta = rz_next / rz;
        rz = rz_next;
        d = &z + &(&d * beta);
    }

    Err(MinimizerError::LinearSolveFailed(format!(
        "conjugate gradient stopped after {} iterations with relative residual {:e}",
        max_iters, relative_residual
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_norm_and_outer() {
        let a = array![3.0, 4.0];
        assert_abs_diff_eq!(norm(&a), 5.0);

        let m = outer(&a, &array![1.0, 2.0, 3.0]);
        assert_eq!(m.dim(), (2, 3));
        assert_abs_diff_eq!(m[[1, 2]], 12.0);
        assert_abs_diff_eq!(m[[0, 1]], 6.0);
    }

    #[test]
    fn test_faer_round_trip_column() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let f = to_faer(&m);
        assert_eq!(f.nrows(), 2);
        assert_eq!(f.read(1, 0), 3.0);
        assert_eq!(column_from_faer(&f), array![1.0, 3.0]);
    }

    #[test]
    fn test_cg_spd_system() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![1.0, 2.0, 3.0];
        let sol = conjugate_gradient_solve(&a, &b, 1e-12, 50).unwrap();

        let residual = &b - &a.dot(&sol.x);
        assert!(norm(&residual) < 1e-10);
        assert!(sol.iterations <= 6);
    }

    #[test]
    fn test_cg_zero_rhs() {
        let a = Array2::eye(3);
        let sol = conjugate_gradient_solve(&a, &Array1::zeros(3), 1e-12, 10).unwrap();
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.x, Array1::<f64>::zeros(3));
    }

    #[test]
    fn test_cg_rejects_indefinite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let b = array![1.0, 0.0];
        let err = conjugate_gradient_solve(&a, &b, 1e-12, 10).unwrap_err();
        assert!(matches!(err, MinimizerError::LinearSolveFailed(_)));
    }

    #[test]
    fn test_cg_rejects_nonpositive_diagonal() {
        let a = array![[1.0, 0.0], [0.0, -1.0]];
        let err = conjugate_gradient_solve(&a, &array![1.0, 1.0], 1e-12, 10).unwrap_err();
        assert!(err.to_string().contains("not positive definite"));
    }

    #[test]
    fn test_cg_dimension_mismatch() {
        let a = Array2::eye(3);
        assert!(conjugate_gradient_solve(&a, &array![1.0, 1.0], 1e-12, 10).is_err());
    }

    #[test]
    fn test_lblt_indefinite_system() {
        // zero diagonal forces a 2x2 pivot
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let x = symmetric_indefinite_solve(&a, &array![1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(x[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lblt_spd_system() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = array![1.0, 2.0];
        let x = symmetric_indefinite_solve(&a, &b).unwrap();
        let residual = &b - &a.dot(&x);
        assert!(norm(&residual) < 1e-12);
    }

    #[test]
    fn test_lblt_rejects_non_finite_input() {
        let a = array![[f64::NAN, 0.0], [0.0, 1.0]];
        let err = symmetric_indefinite_solve(&a, &array![1.0, 1.0]).unwrap_err();
        assert!(matches!(err, MinimizerError::FactorizationFailed(_)));
    }
}
