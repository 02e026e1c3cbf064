//! Small 2D vector helpers shared by the solver.
//!
//! The solver works in double precision, so positions and velocities are
//! [`DVec2`] values from Bevy's math crate.

use bevy::math::DVec2;

/// 2D vector in double precision.
pub type Vector2 = DVec2;

/// Euclidean length of `v`.
#[inline]
pub fn norm(v: Vector2) -> f64 {
    v.length()
}

/// Inner product of `a` and `b`.
#[inline]
pub fn dot(a: Vector2, b: Vector2) -> f64 {
    a.dot(b)
}

/// `v` multiplied by the scalar `s`.
#[inline]
pub fn scale(v: Vector2, s: f64) -> Vector2 {
    v * s
}

/// `v` divided by the scalar `s`.
#[inline]
pub fn divide(v: Vector2, s: f64) -> Vector2 {
    v / s
}

/// Returns true if both components are neither NaN nor infinite.
#[inline]
pub fn is_finite(v: Vector2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
