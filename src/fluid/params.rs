//! Fluid simulation parameters.
//!
//! These parameters control the behavior of the SPH solver. They are a Bevy
//! resource so a driver can tweak them, but a running
//! [`FluidSimulation`](super::simulation::FluidSimulation) keeps its own copy
//! taken at construction time.

use bevy::prelude::*;

use super::error::FluidError;
use super::kernel::Dimension;

/// Parameters controlling the fluid simulation behavior.
///
/// Lengths are in the same unit as particle positions (pixels for a screen
/// driver). Gravity is positive along +y, which points down in screen space.
#[derive(Resource, Clone, Debug, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct FluidParams {
    /// Dimensionality used for kernel normalization and particle volume.
    pub dimension: Dimension,

    /// Rest density of the fluid. Pressure is driven by deviation from it.
    pub rest_density: f64,

    /// Viscosity coefficient (mu).
    pub viscosity: f64,

    /// Vertical gravity acceleration.
    pub gravity: f64,

    /// Fixed time step of the run.
    pub time_step: f64,

    /// Particle radius. Spacing between particles is one diameter.
    pub particle_radius: f64,

    /// Support radius expressed in particle radii.
    pub support_radius_factor: f64,

    /// Particle volume relative to `diameter^dimension`.
    pub volume_factor: f64,

    /// Equation of state stiffness.
    pub stiffness: f64,

    /// Equation of state exponent.
    pub exponent: f64,

    /// Coefficient of restitution for boundary collisions.
    /// 0.0 = fully inelastic, 1.0 = fully elastic.
    pub restitution: f64,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            dimension: Dimension::Two,
            rest_density: 1000.0,
            viscosity: 0.05,
            gravity: 9.8,
            time_step: 0.126,
            particle_radius: 0.5,
            support_radius_factor: 4.0,
            volume_factor: 0.8,
            stiffness: 50.0,
            exponent: 6.0,
            restitution: 0.3,
        }
    }
}

impl FluidParams {
    /// Water-like defaults.
    pub fn water() -> Self {
        Self::default()
    }

    /// Thick, slow fluid.
    pub fn viscous() -> Self {
        Self {
            viscosity: 0.5,
            restitution: 0.1,
            ..Self::default()
        }
    }

    /// Less compressible fluid. Needs a smaller time step to stay stable.
    pub fn stiff() -> Self {
        Self {
            stiffness: 200.0,
            exponent: 7.0,
            time_step: 0.05,
            ..Self::default()
        }
    }

    /// Set the particle radius; spacing, volume and support radius follow it.
    pub fn with_particle_radius(mut self, radius: f64) -> Self {
        self.particle_radius = radius;
        self
    }

    /// Set the fixed time step.
    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.time_step = dt;
        self
    }

    /// Set the gravity magnitude along +y.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the dynamic viscosity.
    pub fn with_viscosity(mut self, viscosity: f64) -> Self {
        self.viscosity = viscosity;
        self
    }

    /// Set the equation-of-state stiffness and exponent.
    pub fn with_stiffness(mut self, stiffness: f64, exponent: f64) -> Self {
        self.stiffness = stiffness;
        self.exponent = exponent;
        self
    }

    /// Set the fraction of normal velocity kept after a wall hit.
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the support radius as a multiple of the particle radius.
    pub fn with_support_radius_factor(mut self, factor: f64) -> Self {
        self.support_radius_factor = factor;
        self
    }

    /// Distance between neighboring particles at rest.
    pub fn particle_diameter(&self) -> f64 {
        2.0 * self.particle_radius
    }

    /// Kernel support radius (h). Also the spatial grid cell size.
    pub fn support_radius(&self) -> f64 {
        self.particle_radius * self.support_radius_factor
    }

    /// Volume represented by one particle.
    pub fn particle_volume(&self) -> f64 {
        self.volume_factor * self.particle_diameter().powi(self.dimension.exponent())
    }

    /// Mass of one particle at rest density.
    pub fn particle_mass(&self) -> f64 {
        self.particle_volume() * self.rest_density
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), FluidError> {
        positive("rest_density", self.rest_density)?;
        positive("time_step", self.time_step)?;
        positive("particle_radius", self.particle_radius)?;
        positive("support_radius_factor", self.support_radius_factor)?;
        positive("volume_factor", self.volume_factor)?;
        positive("stiffness", self.stiffness)?;
        positive("exponent", self.exponent)?;

        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(FluidError::InvalidParameter {
                name: "viscosity",
                value: self.viscosity,
            });
        }
        if !self.gravity.is_finite() {
            return Err(FluidError::InvalidParameter {
                name: "gravity",
                value: self.gravity,
            });
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(FluidError::InvalidParameter {
                name: "restitution",
                value: self.restitution,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), FluidError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FluidError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_quantities() {
        let params = FluidParams::default().with_particle_radius(6.0);

        assert_eq!(params.particle_diameter(), 12.0);
        assert_eq!(params.support_radius(), 24.0);
        assert!((params.particle_volume() - 0.8 * 144.0).abs() < 1e-12);
        assert!((params.particle_mass() - 0.8 * 144.0 * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(FluidParams::default().validate().is_ok());
        assert!(FluidParams::viscous().validate().is_ok());
        assert!(FluidParams::stiff().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = FluidParams::default()
            .with_time_step(0.0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            FluidError::InvalidParameter {
                name: "time_step",
                value: 0.0
            }
        );

        assert!(FluidParams::default()
            .with_restitution(1.5)
            .validate()
            .is_err());
        assert!(FluidParams::default()
            .with_viscosity(-0.1)
            .validate()
            .is_err());
        assert!(FluidParams::default()
            .with_gravity(f64::NAN)
            .validate()
            .is_err());
    }
}
