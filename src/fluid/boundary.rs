//! Domain boundary and collision response.
//!
//! The simulation lives in the axis-aligned rectangle `[0, width] × [0, height]`
//! in world space. Particle positions are stored relative to `offset`, so a
//! particle's world position is `offset + position`. With a screen-space
//! driver `top` is `y = 0` and `bottom` is `y = height`.

use bevy::prelude::*;

use super::error::FluidError;
use super::math::{dot, Vector2};
use super::particle::Particle;

/// Simulation rectangle and the offset of particle coordinates within it.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct Domain {
    /// Width and height of the rectangle.
    pub extent: Vector2,
    /// World position of the particle coordinate origin.
    pub offset: Vector2,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            extent: Vector2::new(100.0, 100.0),
            offset: Vector2::ZERO,
        }
    }
}

impl Domain {
    /// Create a domain of size `extent` with particle origin at `offset`.
    pub fn new(extent: Vector2, offset: Vector2) -> Self {
        Self { extent, offset }
    }

    /// Both sides must be positive and finite.
    pub fn validate(&self) -> Result<(), FluidError> {
        let Vector2 { x, y } = self.extent;
        if x.is_finite() && y.is_finite() && x > 0.0 && y > 0.0 {
            Ok(())
        } else {
            Err(FluidError::InvalidDomain {
                width: x,
                height: y,
            })
        }
    }

    /// World position of a particle position.
    pub fn to_world(&self, position: Vector2) -> Vector2 {
        self.offset + position
    }

    /// Check if a particle position is inside the rectangle.
    pub fn contains(&self, position: Vector2) -> bool {
        let world = self.to_world(position);
        world.x >= 0.0 && world.x <= self.extent.x && world.y >= 0.0 && world.y <= self.extent.y
    }

    /// Every side violated by `position`, as `(inward normal, penetration depth)`,
    /// in the order left, right, top, bottom.
    pub fn violations(&self, position: Vector2) -> Vec<(Vector2, f64)> {
        let world = self.to_world(position);
        let mut sides = Vec::new();
        if world.x < 0.0 {
            sides.push((Vector2::X, -world.x));
        }
        if world.x > self.extent.x {
            sides.push((Vector2::NEG_X, world.x - self.extent.x));
        }
        if world.y < 0.0 {
            sides.push((Vector2::Y, -world.y));
        }
        if world.y > self.extent.y {
            sides.push((Vector2::NEG_Y, world.y - self.extent.y));
        }
        sides
    }
}

/// Push a particle back along `normal` by `depth` and reflect the normal
/// component of its velocity, keeping a `restitution` fraction of it.
pub fn resolve_collision(particle: &mut Particle, normal: Vector2, depth: f64, restitution: f64) {
    particle.position += normal * depth;
    particle.velocity -= normal * ((1.0 + restitution) * dot(particle.velocity, normal));
}

/// Correct every particle that left the domain. Each violated side is
/// handled on its own, so a particle past a corner gets two corrections.
///
/// Returns the number of corrections applied.
pub fn enforce_domain(particles: &mut [Particle], domain: &Domain, restitution: f64) -> usize {
    let mut corrections = 0;
    for particle in particles.iter_mut() {
        for (normal, depth) in domain.violations(particle.position) {
            resolve_collision(particle, normal, depth, restitution);
            corrections += 1;
        }
    }
    corrections
}
