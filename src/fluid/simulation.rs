//! Fluid simulation driver-facing API.
//!
//! [`FluidSimulation`] owns the particle collection and the per-step spatial
//! grid. An external driver calls it once per tick:
//!
//! 1. [`step`](FluidSimulation::step): grid rebuild, density/pressure solve,
//!    force accumulation. Results land in each particle's `acceleration`.
//! 2. integration, either by the driver through
//!    [`particles`](FluidSimulation::particles) /
//!    [`set_particles`](FluidSimulation::set_particles) or with
//!    [`integrate`](FluidSimulation::integrate).
//! 3. boundary correction, through
//!    [`resolve_collision`](FluidSimulation::resolve_collision) per violated
//!    side or with [`enforce_boundary`](FluidSimulation::enforce_boundary).
//!
//! [`advance`](FluidSimulation::advance) runs all three in order.

use bevy::log::{debug, info, trace};
use bevy::prelude::*;
use rayon::prelude::*;

use super::boundary::{enforce_domain, resolve_collision, Domain};
use super::error::FluidError;
use super::integrator::integrate;
use super::kernel::CubicSpline;
use super::math::Vector2;
use super::params::FluidParams;
use super::particle::Particle;
use super::solver::{NeighborLists, SphSolver};
use super::spatial::{GridConfig, SpatialGrid};

/// Summary of the particle state, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidStats {
    pub particle_count: usize,
    pub max_density: f64,
    /// Mean of `|density - rest_density| / rest_density`.
    pub average_density_error: f64,
    pub max_speed: f64,
    pub kinetic_energy: f64,
    pub centroid: Vector2,
    pub mean_velocity: Vector2,
}

/// SPH fluid simulation.
#[derive(Resource, Clone, Debug)]
pub struct FluidSimulation {
    params: FluidParams,
    domain: Domain,
    solver: SphSolver,
    grid: SpatialGrid,
    neighbors: NeighborLists,
    particles: Vec<Particle>,
    frame: u64,
}

impl FluidSimulation {
    /// Create a simulation over `particles`. The particle count stays fixed
    /// for the lifetime of the simulation.
    pub fn new(
        particles: Vec<Particle>,
        params: FluidParams,
        domain: Domain,
    ) -> Result<Self, FluidError> {
        params.validate()?;
        domain.validate()?;

        let h = params.support_radius();
        let grid = SpatialGrid::new(GridConfig::for_domain(domain.extent, domain.offset, h));
        info!(
            "SPH simulation: {} particles, support radius {}, grid {}x{}",
            particles.len(),
            h,
            grid.config().columns,
            grid.config().rows
        );

        Ok(Self {
            solver: SphSolver::new(&params),
            params,
            domain,
            grid,
            neighbors: Vec::new(),
            particles,
            frame: 0,
        })
    }

    /// Parameters the solver currently runs with.
    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    /// Rectangle enforced by the boundary pass.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Smoothing kernel built from the current parameters.
    pub fn kernel(&self) -> &CubicSpline {
        self.solver.kernel()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Fixed time step of the run.
    pub fn dt(&self) -> f64 {
        self.params.time_step
    }

    /// Number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of particles, fixed for the run.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for in-place edits that keep the particle count.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Replace the particle state, typically after the driver integrated it.
    pub fn set_particles(&mut self, particles: Vec<Particle>) -> Result<(), FluidError> {
        if particles.len() != self.particles.len() {
            return Err(FluidError::ParticleCountMismatch {
                expected: self.particles.len(),
                actual: particles.len(),
            });
        }
        self.particles = particles;
        Ok(())
    }

    /// Swap in new parameters and domain, keeping the particle state and
    /// frame counter. On error the current configuration stays in place.
    pub fn reconfigure(&mut self, params: FluidParams, domain: Domain) -> Result<(), FluidError> {
        params.validate()?;
        domain.validate()?;

        let h = params.support_radius();
        self.grid = SpatialGrid::new(GridConfig::for_domain(domain.extent, domain.offset, h));
        self.solver = SphSolver::new(&params);
        self.neighbors.clear();
        self.params = params;
        self.domain = domain;

        info!(
            "SPH simulation reconfigured at frame {}: support radius {}, grid {}x{}",
            self.frame,
            h,
            self.grid.config().columns,
            self.grid.config().rows
        );
        Ok(())
    }

    /// Neighbors of particle `i` found during the last [`step`](Self::step).
    pub fn neighbors(&self, i: usize) -> &[usize] {
        self.neighbors.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rebuild the grid, solve densities and pressures and accumulate
    /// accelerations. Positions and velocities are not changed.
    pub fn step(&mut self) {
        self.grid.build(&self.particles);

        let grid = &self.grid;
        let particles: &[Particle] = &self.particles;
        self.neighbors = (0..particles.len())
            .into_par_iter()
            .map(|i| grid.neighbors(particles, i))
            .collect();

        self.solver.solve(&mut self.particles, &self.neighbors);
        self.frame += 1;

        trace!(
            "step {}: {} occupied cells",
            self.frame,
            self.grid.occupied_cells()
        );
    }

    /// Apply a boundary correction to `particle` with the configured
    /// restitution.
    pub fn resolve_collision(&self, particle: &mut Particle, normal: Vector2, depth: f64) {
        resolve_collision(particle, normal, depth, self.params.restitution);
    }

    /// Semi-implicit Euler with the fixed time step.
    pub fn integrate(&mut self) {
        integrate(&mut self.particles, self.params.time_step);
    }

    /// Push particles that left the domain back inside. Returns the number
    /// of corrections applied.
    pub fn enforce_boundary(&mut self) -> usize {
        enforce_domain(&mut self.particles, &self.domain, self.params.restitution)
    }

    /// One full tick: step, integrate, enforce the boundary.
    pub fn advance(&mut self) {
        self.step();
        self.integrate();
        let corrections = self.enforce_boundary();
        if corrections > 0 {
            debug!(
                "frame {}: {} boundary corrections",
                self.frame, corrections
            );
        }
    }

    /// Fails on the first particle holding a NaN or infinity.
    pub fn check_finite(&self) -> Result<(), FluidError> {
        match self.particles.iter().position(|p| !p.is_finite()) {
            Some(index) => Err(FluidError::NonFiniteState { index }),
            None => Ok(()),
        }
    }

    /// Aggregate diagnostics over all particles.
    pub fn stats(&self) -> FluidStats {
        let n = self.particles.len();
        if n == 0 {
            return FluidStats::default();
        }

        let rest = self.params.rest_density;
        let mass = self.params.particle_mass();
        let mut stats = FluidStats {
            particle_count: n,
            ..default()
        };
        let mut density_error = 0.0;
        for p in &self.particles {
            let speed_sq = p.velocity.length_squared();
            stats.max_density = stats.max_density.max(p.density);
            stats.max_speed = stats.max_speed.max(speed_sq.sqrt());
            stats.kinetic_energy += 0.5 * mass * speed_sq;
            stats.centroid += p.position;
            stats.mean_velocity += p.velocity;
            density_error += (p.density - rest).abs() / rest;
        }
        stats.centroid /= n as f64;
        stats.mean_velocity /= n as f64;
        stats.average_density_error = density_error / n as f64;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fluid::particle::spawn_particle_block;

    fn square_of_four(params: &FluidParams) -> Vec<Particle> {
        spawn_particle_block(
            Vector2::new(40.0, 40.0),
            2,
            2,
            params.particle_diameter(),
            Vector2::ZERO,
        )
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let err = FluidSimulation::new(
            Vec::new(),
            FluidParams::default().with_particle_radius(-1.0),
            Domain::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FluidError::InvalidParameter {
                name: "particle_radius",
                ..
            }
        ));

        let domain = Domain::new(Vector2::new(f64::NAN, 1.0), Vector2::ZERO);
        assert!(FluidSimulation::new(Vec::new(), FluidParams::default(), domain).is_err());
    }

    #[test]
    fn test_set_particles_keeps_count_fixed() {
        let params = FluidParams::default();
        let mut sim =
            FluidSimulation::new(square_of_four(&params), params, Domain::default()).unwrap();

        let err = sim.set_particles(vec![Particle::default(); 3]).unwrap_err();
        assert_eq!(
            err,
            FluidError::ParticleCountMismatch {
                expected: 4,
                actual: 3
            }
        );

        let mut moved = sim.particles().to_vec();
        moved[0].position.x += 1.0;
        sim.set_particles(moved).unwrap();
        assert_eq!(sim.particles()[0].position.x, 41.0);
    }

    #[test]
    fn test_step_leaves_kinematics_untouched() {
        let params = FluidParams::default();
        let particles = square_of_four(&params);
        let mut sim = FluidSimulation::new(particles.clone(), params, Domain::default()).unwrap();

        sim.step();

        assert_eq!(sim.frame(), 1);
        for (before, after) in particles.iter().zip(sim.particles()) {
            assert_eq!(before.position, after.position);
            assert_eq!(before.velocity, after.velocity);
            assert!(after.density >= sim.params().rest_density);
        }
        // support radius 2, spacing 1: everyone sees everyone
        for i in 0..4 {
            assert_eq!(sim.neighbors(i).len(), 3);
        }
    }

    #[test]
    fn test_zero_step_keeps_isolated_particles_at_rest() {
        let params = FluidParams::default().with_gravity(0.0);
        let particles = vec![
            Particle::new(Vector2::new(10.0, 10.0)),
            Particle::new(Vector2::new(50.0, 10.0)),
            Particle::new(Vector2::new(10.0, 50.0)),
            Particle::new(Vector2::new(50.0, 50.0)),
        ];
        let mut sim = FluidSimulation::new(particles.clone(), params, Domain::default()).unwrap();

        sim.step();

        for p in sim.particles() {
            assert_eq!(p.density, sim.params().rest_density);
            assert_eq!(p.pressure, 0.0);
            assert_eq!(p.acceleration, Vector2::ZERO);
        }

        sim.integrate();
        for (before, after) in particles.iter().zip(sim.particles()) {
            assert_eq!(before.position, after.position);
            assert_eq!(after.velocity, Vector2::ZERO);
        }
    }

    #[test]
    fn test_square_of_four_falls_with_gravity() {
        let params = FluidParams::default().with_gravity(9.8);
        let mut sim =
            FluidSimulation::new(square_of_four(&params), params, Domain::default()).unwrap();

        sim.step();
        sim.integrate();

        assert!(sim.check_finite().is_ok());
        let stats = sim.stats();
        assert_eq!(stats.particle_count, 4);
        assert!(stats.mean_velocity.y > 0.0);
        assert!(stats.mean_velocity.x.abs() < 1e-9);
    }

    #[test]
    fn test_driver_round_trip_matches_advance() {
        let params = FluidParams::default().with_time_step(0.05);
        let domain = Domain::new(Vector2::new(20.0, 20.0), Vector2::ZERO);
        let particles = spawn_particle_block(Vector2::new(2.0, 12.0), 4, 6, 1.0, Vector2::ZERO);
        let mut driven = FluidSimulation::new(particles.clone(), params.clone(), domain).unwrap();
        let mut automatic = FluidSimulation::new(particles, params, domain).unwrap();

        for _ in 0..20 {
            // integration and collision handled by the caller
            driven.step();
            let dt = driven.dt();
            let mut next: Vec<Particle> = driven
                .particles()
                .iter()
                .map(|p| {
                    let velocity = p.velocity + p.acceleration * dt;
                    Particle {
                        velocity,
                        position: p.position + velocity * dt,
                        ..*p
                    }
                })
                .collect();
            for p in &mut next {
                for (normal, depth) in domain.violations(p.position) {
                    driven.resolve_collision(p, normal, depth);
                }
            }
            driven.set_particles(next).unwrap();

            automatic.advance();
        }

        assert_eq!(driven.particles(), automatic.particles());
    }

    #[test]
    fn test_reconfigure_keeps_particles() {
        let params = FluidParams::default();
        let mut sim =
            FluidSimulation::new(square_of_four(&params), params.clone(), Domain::default())
                .unwrap();
        sim.advance();
        let before = sim.particles().to_vec();

        let wider = Domain::new(Vector2::new(200.0, 100.0), Vector2::ZERO);
        sim.reconfigure(params.clone().with_gravity(0.0), wider).unwrap();

        assert_eq!(sim.particles(), before.as_slice());
        assert_eq!(sim.frame(), 1);
        assert_eq!(sim.params().gravity, 0.0);
        assert_eq!(*sim.domain(), wider);
        assert!(sim.grid().config().columns > 10);

        let err = sim.reconfigure(params.clone().with_time_step(0.0), wider);
        assert!(err.is_err());
        assert_eq!(sim.params().gravity, 0.0);
    }

    #[test]
    fn test_dam_break_stays_finite_and_inside() {
        // stiff enough that the column compresses only a few percent
        let params = FluidParams::default()
            .with_stiffness(2.0e5, 6.0)
            .with_viscosity(0.5)
            .with_time_step(0.005);
        let domain = Domain::new(Vector2::new(12.0, 8.0), Vector2::ZERO);
        let particles = spawn_particle_block(Vector2::new(0.5, 3.75), 6, 6, 0.75, Vector2::ZERO);
        let mut sim = FluidSimulation::new(particles, params, domain).unwrap();
        let initial = sim.stats().centroid;

        for _ in 0..400 {
            sim.advance();
            assert!(sim.check_finite().is_ok(), "frame {}", sim.frame());
        }

        for p in sim.particles() {
            assert!(domain.contains(p.position));
        }
        let stats = sim.stats();
        // the column collapses away from the left wall
        assert!(stats.centroid.x > initial.x);
        assert!(stats.max_density < 2.0 * sim.params().rest_density);
    }
}
