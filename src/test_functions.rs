//! Standard smooth benchmark objectives with exact gradients and Hessians.
//!
//! All functions accept any dimension `n ≥ 1`.

use crate::minimize::objective::{MultiDimHessFn, ObjGradFn};
use ndarray::prelude::*;
use std::f64::consts::{E, PI};

const RASTRIGIN_A: f64 = 10.0;

/// `f(x) = Σ xᵢ²`, minimum 0 at the origin
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.dot(x)
}

pub fn sphere_grad(x: &Array1<f64>) -> Array1<f64> {
    x * 2.0
}

pub fn sphere_hessian(x: &Array1<f64>) -> Array2<f64> {
    Array2::eye(x.len()) * 2.0
}

/// Extended Rosenbrock function, minimum 0 at `[1, 1, ..., 1]`
pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

pub fn rosenbrock_grad(x: &Array1<f64>) -> Array1<f64> {
    let n = x.len();
    let mut g = Array1::zeros(n);
    if n == 1 {
        g[0] = -2.0 * (1.0 - x[0]);
        return g;
    }

    for i in 0..n - 1 {
        let t = x[i + 1] - x[i] * x[i];
        g[i] += -2.0 * (1.0 - x[i]) - 400.0 * x[i] * t;
        g[i + 1] += 200.0 * t;
    }
    g
}

pub fn rosenbrock_hessian(x: &Array1<f64>) -> Array2<f64> {
    let n = x.len();
    let mut h = Array2::zeros((n, n));
    if n == 1 {
        h[[0, 0]] = 2.0;
        return h;
    }

    for i in 0..n - 1 {
        h[[i, i]] += 2.0 - 400.0 * (x[i + 1] - 3.0 * x[i] * x[i]);
        h[[i + 1, i + 1]] += 200.0;
        h[[i, i + 1]] = -400.0 * x[i];
        h[[i + 1, i]] = -400.0 * x[i];
    }
    h
}

/// Rastrigin function, `A·n + Σ (xᵢ² − A cos 2πxᵢ)` with `A = 10`.
/// Highly multimodal; the global minimum 0 is at the origin.
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    RASTRIGIN_A * x.len() as f64
        + x.iter()
            .map(|&xi| xi * xi - RASTRIGIN_A * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

pub fn rastrigin_grad(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|xi| 2.0 * xi + 2.0 * PI * RASTRIGIN_A * (2.0 * PI * xi).sin())
}

pub fn rastrigin_hessian(x: &Array1<f64>) -> Array2<f64> {
    Array2::from_diag(&x.mapv(|xi| 2.0 + 4.0 * PI * PI * RASTRIGIN_A * (2.0 * PI * xi).cos()))
}

/// Ackley function with `a = 20`, `b = 0.2`, `c = 2π`; minimum 0 at the origin.
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let r = (x.dot(x) / n).sqrt();
    let mean_cos = x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum::<f64>() / n;
    -20.0 * (-0.2 * r).exp() - mean_cos.exp() + 20.0 + E
}

pub fn ackley_grad(x: &Array1<f64>) -> Array1<f64> {
    let n = x.len() as f64;
    let r = (x.dot(x) / n).sqrt();
    let e1 = (-0.2 * r).exp();
    let e2 = (x.iter().map(|&xi| (2.0 * PI * xi).cos()).sum::<f64>() / n).exp();

    x.mapv(|xi| {
        // the radial term is continuous with limit 0 at the origin
        let radial = if r > 0.0 { 4.0 * e1 * xi / (n * r) } else { 0.0 };
        radial + (2.0 * PI / n) * e2 * (2.0 * PI * xi).sin()
    })
}

pub fn ackley_hessian(x: &Array1<f64>) -> Array2<f64> {
    let len = x.len();
    let n = len as f64;
    let two_pi = 2.0 * PI;
    // regularizes the radial term at the origin
    let r = (x.dot(x) / n + 1e-12).sqrt();
    let e1 = (-0.2 * r).exp();
    let e2 = (x.iter().map(|&xi| (two_pi * xi).cos()).sum::<f64>() / n).exp();
    let sin = x.mapv(|xi| (two_pi * xi).sin());
    let cos = x.mapv(|xi| (two_pi * xi).cos());

    Array2::from_shape_fn((len, len), |(i, j)| {
        let ai = x[i] / (n * r);
        let aj = x[j] / (n * r);
        let delta = if i == j { 1.0 } else { 0.0 };

        let dai_dxj = delta / (n * r) - x[i] * x[j] / (n * n * r.powi(3));
        let radial = 4.0 * (-0.2 * e1 * aj * ai + e1 * dai_dxj);

        let oscillating = -(two_pi / n).powi(2) * e2 * sin[i] * sin[j]
            + delta * (two_pi * two_pi / n) * e2 * cos[i];
        radial + oscillating
    })
}

pub fn sphere_problem() -> impl ObjGradFn + Clone {
    MultiDimHessFn::new(sphere, sphere_grad, sphere_hessian)
}

pub fn rosenbrock_problem() -> impl ObjGradFn + Clone {
    MultiDimHessFn::new(rosenbrock, rosenbrock_grad, rosenbrock_hessian)
}

pub fn rastrigin_problem() -> impl ObjGradFn + Clone {
    MultiDimHessFn::new(rastrigin, rastrigin_grad, rastrigin_hessian)
}

pub fn ackley_problem() -> impl ObjGradFn + Clone {
    MultiDimHessFn::new(ackley, ackley_grad, ackley_hessian)
}
