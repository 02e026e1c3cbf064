//! Error type for the fluid simulation.
//!
//! The solver itself never fails: numerical hazards are guarded in place.
//! Errors only come from bad configuration or from feeding the simulation a
//! particle set it cannot accept.

use std::fmt;

/// Errors reported by [`FluidSimulation`](super::simulation::FluidSimulation)
/// and [`FluidParams::validate`](super::params::FluidParams::validate).
#[derive(Debug, Clone, PartialEq)]
pub enum FluidError {
    /// A simulation parameter is out of its valid range.
    InvalidParameter {
        /// Field name in `FluidParams`.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The simulation rectangle has a non-positive or non-finite side.
    InvalidDomain { width: f64, height: f64 },
    /// `set_particles` was given a collection of a different length.
    ParticleCountMismatch { expected: usize, actual: usize },
    /// A particle holds a NaN or infinite value.
    NonFiniteState { index: usize },
}

impl fmt::Display for FluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidError::InvalidParameter { name, value } => {
                write!(f, "Invalid fluid parameter `{}`: {}", name, value)
            }
            FluidError::InvalidDomain { width, height } => {
                write!(f, "Invalid simulation domain {} x {}", width, height)
            }
            FluidError::ParticleCountMismatch { expected, actual } => write!(
                f,
                "Particle count is fixed for a run: expected {}, got {}",
                expected, actual
            ),
            FluidError::NonFiniteState { index } => {
                write!(f, "Particle {} has a non-finite state", index)
            }
        }
    }
}

impl std::error::Error for FluidError {}
