//! Fluid particle data and a helper for laying out particle blocks.

use bevy::prelude::*;

use super::math::{is_finite, Vector2};

/// Material tag of a particle.
///
/// Only [`Material::Fluid`] particles receive forces. Other particles act as
/// static obstacles: they contribute to their neighbors' densities but are
/// pinned in place by the integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Material {
    #[default]
    Fluid,
    Boundary,
}

/// State of a single SPH particle.
///
/// Plain value with no owned resources; copying it is a full snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct Particle {
    /// Location relative to the domain offset.
    pub position: Vector2,
    pub velocity: Vector2,
    pub material: Material,
    /// Recomputed every step.
    pub density: f64,
    /// Derived from `density` by the equation of state.
    pub pressure: f64,
    /// Per-step scratch value written by the force passes.
    pub acceleration: Vector2,
}

impl Particle {
    /// Create a fluid particle at rest.
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            ..default()
        }
    }

    /// Create a static boundary particle.
    pub fn boundary(position: Vector2) -> Self {
        Self {
            position,
            material: Material::Boundary,
            ..default()
        }
    }

    /// Set the initial velocity.
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    /// True for particles that move with the flow.
    pub fn is_fluid(&self) -> bool {
        self.material == Material::Fluid
    }

    /// Returns true if no field holds a NaN or infinity.
    pub fn is_finite(&self) -> bool {
        is_finite(self.position)
            && is_finite(self.velocity)
            && is_finite(self.acceleration)
            && self.density.is_finite()
            && self.pressure.is_finite()
    }
}

/// Lay out `rows × columns` fluid particles on a square lattice.
///
/// The first particle sits at `origin`; x grows with the column and y with
/// the row. Particles are emitted row by row.
pub fn spawn_particle_block(
    origin: Vector2,
    rows: usize,
    columns: usize,
    spacing: f64,
    initial_velocity: Vector2,
) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for column in 0..columns {
            let offset = Vector2::new(column as f64, row as f64) * spacing;
            particles.push(Particle::new(origin + offset).with_velocity(initial_velocity));
        }
    }
    particles
}
