//! Cubic spline smoothing kernel.
//!
//! `W(r, h)` is nonzero only for `r <= h`. The normalization constant depends
//! on the dimensionality:
//!
//! - 1D: `4/3`
//! - 2D: `40/(7π)`
//! - 3D: `8/π`
//!
//! each divided by `h^d`. Coefficients are computed once per kernel and reused
//! for every evaluation.

use std::f64::consts::PI;

use bevy::prelude::*;

use super::math::{norm, Vector2};

/// Below this separation the gradient direction is undefined.
pub const GRADIENT_EPSILON: f64 = 1e-5;

/// Spatial dimensionality of the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Dimension {
    One,
    #[default]
    Two,
    Three,
}

impl Dimension {
    /// Spatial dimension as an exponent for `h^d`.
    pub fn exponent(self) -> i32 {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Normalization constant before division by `h^d`.
    pub fn cubic_spline_sigma(self) -> f64 {
        match self {
            Dimension::One => 4.0 / 3.0,
            Dimension::Two => 40.0 / (7.0 * PI),
            Dimension::Three => 8.0 / PI,
        }
    }
}

/// Cubic spline kernel with precomputed coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSpline {
    h: f64,
    dimension: Dimension,
    /// `sigma / h^d`
    k: f64,
    /// `6 * k`
    k_grad: f64,
}

impl CubicSpline {
    /// Precompute the coefficients for support radius `h`.
    pub fn new(support_radius: f64, dimension: Dimension) -> Self {
        let k = dimension.cubic_spline_sigma() / support_radius.powi(dimension.exponent());
        Self {
            h: support_radius,
            dimension,
            k,
            k_grad: 6.0 * k,
        }
    }

    /// Support radius `h`.
    pub fn support_radius(&self) -> f64 {
        self.h
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Kernel value at zero separation, the maximum of `W`.
    pub fn peak(&self) -> f64 {
        self.k
    }

    /// `W(r, h)` for a separation distance `r`.
    #[inline]
    pub fn value(&self, r: f64) -> f64 {
        let q = r / self.h;
        if q > 1.0 {
            0.0
        } else if q <= 0.5 {
            let q2 = q * q;
            let q3 = q2 * q;
            self.k * (6.0 * q3 - 6.0 * q2 + 1.0)
        } else {
            let f = 1.0 - q;
            self.k * 2.0 * f * f * f
        }
    }

    /// `∇W(r, h)` with respect to the separation vector `r = x_i - x_j`.
    #[inline]
    pub fn gradient(&self, r: Vector2) -> Vector2 {
        let r_norm = norm(r);
        let q = r_norm / self.h;
        if r_norm <= GRADIENT_EPSILON || q > 1.0 {
            return Vector2::ZERO;
        }

        let grad_q = r / (r_norm * self.h);
        if q <= 0.5 {
            grad_q * (self.k_grad * q * (3.0 * q - 2.0))
        } else {
            let f = 1.0 - q;
            grad_q * (self.k_grad * -(f * f))
        }
    }
}
