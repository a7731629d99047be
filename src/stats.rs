//! Closed-form statistics behind the charts.
//!
//! Everything here is a pure function of its inputs. Degenerate inputs
//! (a zero standard deviation) are not guarded: they produce non-finite
//! values and the UI keeps its slider minimums above zero instead.

use crate::core::{CovarianceModel, MeanVector};
use glam::{DMat2, DVec2};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Density of N(mean, std²) at `x`.
pub fn normal_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let norm = std * (2.0 * PI).sqrt();
    let z = x - mean;
    (-(z * z) / (2.0 * std * std)).exp() / norm
}

/// KL(P || Q) for P = N(mean_p, std_p²) and Q = N(mean_q, std_q²).
///
/// Not symmetric: swapping P and Q generally changes the result.
pub fn kl_divergence(mean_p: f64, std_p: f64, mean_q: f64, std_q: f64) -> f64 {
    let diff = mean_p - mean_q;
    (std_q / std_p).ln() + (std_p * std_p + diff * diff) / (2.0 * std_q * std_q) - 0.5
}

/// Σ = V · diag(λ) · Vᵀ, with the eigenvectors stored as the columns of V.
pub fn covariance_from_eigen(eigenvalues: DVec2, eigenvectors: DMat2) -> DMat2 {
    eigenvectors * DMat2::from_diagonal(eigenvalues) * eigenvectors.transpose()
}

/// V · diag(√λ): maps standard-normal draws onto N(0, Σ).
pub fn sample_transform(model: &CovarianceModel) -> DMat2 {
    let root = DVec2::new(
        model.eigenvalues().x.max(0.0).sqrt(),
        model.eigenvalues().y.max(0.0).sqrt(),
    );
    model.eigenvectors() * DMat2::from_diagonal(root)
}

/// Re-project fixed standard-normal draws through the current model.
pub fn project_samples(samples: &[DVec2], model: &CovarianceModel, mean: MeanVector) -> Vec<DVec2> {
    let t = sample_transform(model);
    let offset = mean.as_dvec2();
    samples.iter().map(|&z| t * z + offset).collect()
}

/// `n` i.i.d. draws from the 2-D standard normal.
pub fn standard_normal_samples<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<DVec2> {
    (0..n)
        .map(|_| DVec2::new(rng.sample(StandardNormal), rng.sample(StandardNormal)))
        .collect()
}

/// Points `start, start + step, ...` strictly below `stop`.
pub fn sample_grid(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(stop > start) {
        return vec![];
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n)
        .map(|i| start + i as f64 * step)
        .filter(|&x| x < stop)
        .collect()
}

/// Trapezoid rule over paired samples. Extra samples in the longer slice are ignored.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) * 0.5)
        .sum()
}

/// 90° clockwise rotation: (x, y) → (y, −x).
pub fn rotate_clockwise(v: DVec2) -> DVec2 {
    DVec2::new(v.y, -v.x)
}

/// 90° counter-clockwise rotation: (x, y) → (−y, x).
pub fn rotate_counter_clockwise(v: DVec2) -> DVec2 {
    v.perp()
}

pub fn is_orthonormal(m: DMat2, tol: f64) -> bool {
    (m.x_axis.length() - 1.0).abs() <= tol
        && (m.y_axis.length() - 1.0).abs() <= tol
        && m.x_axis.dot(m.y_axis).abs() <= tol
}

pub fn is_symmetric(m: DMat2, tol: f64) -> bool {
    (m.x_axis.y - m.y_axis.x).abs() <= tol
}
