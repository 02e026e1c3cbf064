//! Smoothed Particle Hydrodynamics simulation of a 2D fluid.
//!
//! Every step the particle positions are hashed into a uniform grid, densities
//! are summed over kernel neighborhoods and turned into pressures, and
//! gravity, viscosity and pressure gradients are accumulated into a
//! per-particle acceleration. The driver then integrates with semi-implicit
//! Euler and pushes escaped particles back into the domain.
//!
//! # Architecture
//!
//! - [`math`]: 2D vector helpers
//! - [`error`]: error type
//! - [`params`]: simulation parameters
//! - [`particle`]: particle data and block layout
//! - [`spatial`]: spatial hash grid for neighbor search
//! - [`kernel`]: cubic spline smoothing kernel
//! - [`solver`]: density, pressure and force passes
//! - [`integrator`]: semi-implicit Euler
//! - [`boundary`]: domain rectangle and collision response
//! - [`simulation`]: driver-facing simulation object
//! - [`plugin`]: Bevy plugin driving the simulation at a fixed rate
//!
//! # Example
//!
//! ```rust
//! use sph2d::fluid::prelude::*;
//!
//! let params = FluidParams::default();
//! let particles = spawn_particle_block(
//!     Vector2::new(10.0, 10.0),
//!     4,
//!     4,
//!     params.particle_diameter(),
//!     Vector2::ZERO,
//! );
//! let domain = Domain::new(Vector2::new(40.0, 40.0), Vector2::ZERO);
//! let mut simulation = FluidSimulation::new(particles, params, domain).unwrap();
//!
//! simulation.advance();
//! assert!(simulation.check_finite().is_ok());
//! ```

pub mod boundary;
pub mod error;
pub mod integrator;
pub mod kernel;
pub mod math;
pub mod params;
pub mod particle;
pub mod plugin;
pub mod simulation;
pub mod solver;
pub mod spatial;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::boundary::*;
    pub use super::error::*;
    pub use super::integrator::*;
    pub use super::kernel::*;
    pub use super::math::Vector2;
    pub use super::params::*;
    pub use super::particle::*;
    pub use super::plugin::*;
    pub use super::simulation::*;
    pub use super::solver::*;
    pub use super::spatial::*;
}
