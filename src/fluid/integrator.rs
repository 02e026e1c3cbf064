//! Semi-implicit (symplectic) Euler integration.

use rayon::prelude::*;

use super::math::Vector2;
use super::particle::Particle;

/// Advance one particle: velocity first, then position with the new velocity.
///
/// Non-fluid particles are pinned in place.
#[inline]
pub fn integrate_particle(particle: &mut Particle, dt: f64) {
    if !particle.is_fluid() {
        particle.velocity = Vector2::ZERO;
        return;
    }
    particle.velocity += particle.acceleration * dt;
    particle.position += particle.velocity * dt;
}

/// Advance every particle by `dt` using its accumulated acceleration.
pub fn integrate(particles: &mut [Particle], dt: f64) {
    particles
        .par_iter_mut()
        .for_each(|particle| integrate_particle(particle, dt));
}
