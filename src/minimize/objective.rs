use dyn_clone::DynClone;
use ndarray::prelude::*;
use std::cell::Cell;

// Define a trait for the objective function
pub trait ObjFn: DynClone {
    fn call(&self, x: &Array1<f64>) -> f64;
}
dyn_clone::clone_trait_object!(ObjFn);

/// Objective with a gradient of the same dimension as `x`.
///
/// Oracles must be deterministic and mutually consistent; the line search
/// relies on the gradient matching the objective it differentiates.
/// `hessian` is only consulted by Newton's method.
pub trait ObjGradFn: ObjFn + DynClone {
    fn grad(&self, x: &Array1<f64>) -> Array1<f64>;

    fn hessian(&self, _x: &Array1<f64>) -> Option<Array2<f64>> {
        None
    }
}
dyn_clone::clone_trait_object!(ObjGradFn);

// Define a trait for a standalone Hessian oracle
pub trait HessFn: DynClone {
    fn hessian(&self, x: &Array1<f64>) -> Array2<f64>;
}
dyn_clone::clone_trait_object!(HessFn);

impl<F> ObjFn for F
where
    F: Fn(&Array1<f64>) -> f64 + DynClone,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        self(x)
    }
}

impl<F> HessFn for F
where
    F: Fn(&Array1<f64>) -> Array2<f64> + DynClone,
{
    fn hessian(&self, x: &Array1<f64>) -> Array2<f64> {
        self(x)
    }
}

// Wrapper for multi-dimensional function
#[derive(Clone)]
pub struct MultiDimFn<F>(pub F)
where
    F: Fn(&Array1<f64>) -> f64 + Clone;

impl<F> MultiDimFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    pub fn new(f: F) -> Self {
        MultiDimFn(f)
    }

    /// Attach a central-difference gradient so the objective can be minimized.
    pub fn with_numerical_gradient(self, step: Option<f64>) -> MultiDimNumGradFn<F> {
        MultiDimNumGradFn::new(self.0, step)
    }
}

impl<F> ObjFn for MultiDimFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        (self.0)(x)
    }
}

// Wrapper for multi-dimensional function w/gradient
#[derive(Clone)]
pub struct MultiDimGradFn<F, GF>(pub F, pub GF)
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone;

impl<F, GF> MultiDimGradFn<F, GF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
{
    pub fn new(f: F, gf: GF) -> Self {
        MultiDimGradFn(f, gf)
    }
}

impl<F, GF> ObjFn for MultiDimGradFn<F, GF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        (self.0)(x)
    }
}

impl<F, GF> ObjGradFn for MultiDimGradFn<F, GF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
{
    fn grad(&self, x: &Array1<f64>) -> Array1<f64> {
        (self.1)(x)
    }
}

// Wrapper for multi-dimensional function w/gradient and hessian
#[derive(Clone)]
pub struct MultiDimHessFn<F, GF, HF>(pub F, pub GF, pub HF)
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
    HF: Fn(&Array1<f64>) -> Array2<f64> + Clone;

impl<F, GF, HF> MultiDimHessFn<F, GF, HF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
    HF: Fn(&Array1<f64>) -> Array2<f64> + Clone,
{
    pub fn new(f: F, gf: GF, hf: HF) -> Self {
        MultiDimHessFn(f, gf, hf)
    }
}

impl<F, GF, HF> ObjFn for MultiDimHessFn<F, GF, HF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
    HF: Fn(&Array1<f64>) -> Array2<f64> + Clone,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        (self.0)(x)
    }
}

impl<F, GF, HF> ObjGradFn for MultiDimHessFn<F, GF, HF>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
    GF: Fn(&Array1<f64>) -> Array1<f64> + Clone,
    HF: Fn(&Array1<f64>) -> Array2<f64> + Clone,
{
    fn grad(&self, x: &Array1<f64>) -> Array1<f64> {
        (self.1)(x)
    }

    fn hessian(&self, x: &Array1<f64>) -> Option<Array2<f64>> {
        Some((self.2)(x))
    }
}

// Wrapper for multi-dimensional function w/numerical gradient
#[derive(Clone)]
pub struct MultiDimNumGradFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    f: F,
    step: f64,
}

impl<F> MultiDimNumGradFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    pub fn new(f: F, step: Option<f64>) -> Self {
        Self {
            f,
            step: step.unwrap_or(1e-6),
        }
    }

    /// Central-difference gradient
    pub fn numerical_gradient(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut grad = Array1::zeros(x.len());
        let mut probe = x.clone();

        for i in 0..x.len() {
            probe[i] = x[i] + self.step;
            let f_plus_h = (self.f)(&probe);

            probe[i] = x[i] - self.step;
            let f_minus_h = (self.f)(&probe);

            probe[i] = x[i];
            grad[i] = (f_plus_h - f_minus_h) / (2.0 * self.step);
        }

        grad
    }
}

impl<F> ObjFn for MultiDimNumGradFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        (self.f)(x)
    }
}

impl<F> ObjGradFn for MultiDimNumGradFn<F>
where
    F: Fn(&Array1<f64>) -> f64 + Clone,
{
    fn grad(&self, x: &Array1<f64>) -> Array1<f64> {
        self.numerical_gradient(x)
    }
}

/// Forwards to an oracle while counting objective and gradient calls.
#[derive(Clone)]
pub struct EvalCounter<'a> {
    f: &'a dyn ObjGradFn,
    fn_evals: Cell<usize>,
    g_evals: Cell<usize>,
}

impl<'a> EvalCounter<'a> {
    pub fn new(f: &'a dyn ObjGradFn) -> Self {
        EvalCounter {
            f,
            fn_evals: Cell::new(0),
            g_evals: Cell::new(0),
        }
    }

    pub fn fn_evals(&self) -> usize {
        self.fn_evals.get()
    }

    pub fn g_evals(&self) -> usize {
        self.g_evals.get()
    }
}

impl ObjFn for EvalCounter<'_> {
    fn call(&self, x: &Array1<f64>) -> f64 {
        self.fn_evals.set(self.fn_evals.get() + 1);
        self.f.call(x)
    }
}

impl ObjGradFn for EvalCounter<'_> {
    fn grad(&self, x: &Array1<f64>) -> Array1<f64> {
        self.g_evals.set(self.g_evals.get() + 1);
        self.f.grad(x)
    }

    fn hessian(&self, x: &Array1<f64>) -> Option<Array2<f64>> {
        self.f.hessian(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bowl() -> impl ObjGradFn + Clone {
        MultiDimGradFn::new(
            |x: &Array1<f64>| x.dot(x),
            |x: &Array1<f64>| x.mapv(|xi| 2.0 * xi),
        )
    }

    #[test]
    fn test_closure_is_objective() {
        let f = |x: &Array1<f64>| x.sum();
        assert_eq!(f.call(&array![1.0, 2.0]), 3.0);
    }

    #[test]
    fn test_objective_only_wrapper() {
        let f = MultiDimFn::new(|x: &Array1<f64>| x[0].powi(2) + 3.0 * x[1]);
        assert_eq!(f.call(&array![2.0, 1.0]), 7.0);

        let obj = f.with_numerical_gradient(Some(1e-5));
        let g = obj.grad(&array![2.0, 1.0]);
        assert_abs_diff_eq!(g[0], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_grad_fn_has_no_hessian() {
        let obj = bowl();
        assert_eq!(obj.call(&array![1.0, 2.0]), 5.0);
        assert_eq!(obj.grad(&array![1.0, 2.0]), array![2.0, 4.0]);
        assert!(obj.hessian(&array![1.0, 2.0]).is_none());
    }

    #[test]
    fn test_hess_fn_exposes_hessian() {
        let obj = MultiDimHessFn::new(
            |x: &Array1<f64>| x.dot(x),
            |x: &Array1<f64>| x.mapv(|xi| 2.0 * xi),
            |x: &Array1<f64>| Array2::<f64>::eye(x.len()) * 2.0,
        );
        let h = obj.hessian(&array![0.0, 0.0, 0.0]).unwrap();
        assert_eq!(h, Array2::<f64>::eye(3) * 2.0);
    }

    #[test]
    fn test_numerical_gradient() {
        let obj = MultiDimNumGradFn::new(
            |x: &Array1<f64>| (x[0] - 3.0).powi(2) + x[0] * x[1].powi(2),
            None,
        );
        let g = obj.grad(&array![1.0, 2.0]);
        assert_abs_diff_eq!(g[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g[1], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_boxed_oracle_clones() {
        let boxed: Box<dyn ObjGradFn> = Box::new(bowl());
        let copy = boxed.clone();
        assert_eq!(copy.call(&array![3.0]), 9.0);
    }

    #[test]
    fn test_eval_counter() {
        let obj = bowl();
        let counter = EvalCounter::new(&obj);
        let x = array![1.0, 1.0];
        counter.call(&x);
        counter.call(&x);
        counter.grad(&x);
        assert_eq!(counter.fn_evals(), 2);
        assert_eq!(counter.g_evals(), 1);
    }
}
