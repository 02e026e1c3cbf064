//! sph2d - Smoothed Particle Hydrodynamics for 2D fluids
//!
//! This library simulates a fluid as a set of particles carrying position,
//! velocity, density and pressure. Forces come from neighboring particles
//! through a cubic spline kernel and are integrated with semi-implicit Euler.
//!
//! # Features
//!
//! - **SPH core**: density summation, Tait-like equation of state, viscosity
//!   and pressure forces
//! - **Spatial hashing**: sparse uniform grid for neighbor queries
//! - **Parallel passes**: each solver pass runs across particles with rayon
//! - **Boundary handling**: rectangular domain with restitution
//! - **Bevy integration**: fixed-rate driver plugin
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use sph2d::prelude::*;
//!
//! fn main() {
//!     let params = FluidParams::default().with_particle_radius(6.0);
//!     let particles = spawn_particle_block(
//!         Vector2::new(50.0, 10.0),
//!         60,
//!         40,
//!         params.particle_diameter(),
//!         Vector2::ZERO,
//!     );
//!
//!     App::new()
//!         .add_plugins(MinimalPlugins)
//!         .add_plugins(
//!             FluidPlugin::new(particles)
//!                 .with_params(params)
//!                 .with_domain(Domain::new(Vector2::new(1440.0, 1440.0), Vector2::ZERO)),
//!         )
//!         .run();
//! }
//! ```
//!
//! See [`fluid`] for the module layout.

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}
