//! SPH density, pressure and force passes.
//!
//! A step runs these passes in a fixed order, each one finishing for every
//! particle before the next starts:
//!
//! 1. density summation over neighbors
//! 2. density clamp to the rest density and equation of state
//! 3. non-pressure forces (gravity + viscosity)
//! 4. pressure forces
//!
//! Within a pass particles are processed in parallel. Each pass reads an
//! immutable view of the particle slice, collects one result per particle and
//! writes the results back only after the whole pass is done.

use rayon::prelude::*;

use super::kernel::CubicSpline;
use super::math::{dot, norm, Vector2};
use super::params::FluidParams;
use super::particle::Particle;

/// Neighbor indices of every particle, in particle order.
pub type NeighborLists = Vec<Vec<usize>>;

/// CPU SPH solver holding the constants derived from [`FluidParams`].
#[derive(Clone, Debug)]
pub struct SphSolver {
    kernel: CubicSpline,
    rest_density: f64,
    particle_volume: f64,
    particle_mass: f64,
    stiffness: f64,
    exponent: f64,
    viscosity: f64,
    gravity: f64,
    /// `2 * (d + 2) * mu`
    viscosity_factor: f64,
    /// `0.01 * h^2`, keeps the viscosity term finite as `r -> 0`
    viscosity_regularizer: f64,
}

impl SphSolver {
    /// Build the kernel and per-run constants from `params`.
    pub fn new(params: &FluidParams) -> Self {
        let h = params.support_radius();
        let d = params.dimension.exponent() as f64;
        Self {
            kernel: CubicSpline::new(h, params.dimension),
            rest_density: params.rest_density,
            particle_volume: params.particle_volume(),
            particle_mass: params.particle_mass(),
            stiffness: params.stiffness,
            exponent: params.exponent,
            viscosity: params.viscosity,
            gravity: params.gravity,
            viscosity_factor: 2.0 * (d + 2.0) * params.viscosity,
            viscosity_regularizer: 0.01 * h * h,
        }
    }

    pub fn kernel(&self) -> &CubicSpline {
        &self.kernel
    }

    /// Run all passes of one step. Densities, pressures and accelerations of
    /// `particles` are overwritten; positions and velocities are untouched.
    pub fn solve(&self, particles: &mut [Particle], neighbors: &NeighborLists) {
        self.compute_densities(particles, neighbors);
        self.apply_equation_of_state(particles);
        self.compute_non_pressure_forces(particles, neighbors);
        self.compute_pressure_forces(particles, neighbors);
    }

    /// Kernel-weighted density sum. A particle without neighbors gets 0.
    pub fn compute_densities(&self, particles: &mut [Particle], neighbors: &NeighborLists) {
        let view: &[Particle] = particles;
        let densities: Vec<f64> = view
            .par_iter()
            .zip(neighbors.par_iter())
            .map(|(p_i, list)| {
                let sum: f64 = list
                    .iter()
                    .map(|&j| {
                        let r = norm(p_i.position - view[j].position);
                        self.particle_volume * self.kernel.value(r)
                    })
                    .sum();
                sum * self.rest_density
            })
            .collect();

        for (p, density) in particles.iter_mut().zip(densities) {
            p.density = density;
        }
    }

    /// Clamp densities to the rest density and derive pressure.
    ///
    /// After this pass `density >= rest_density` and `pressure >= 0` for every
    /// particle, so sparse regions never pull particles together.
    pub fn apply_equation_of_state(&self, particles: &mut [Particle]) {
        particles.par_iter_mut().for_each(|p| {
            p.density = p.density.max(self.rest_density);
            p.pressure = self.pressure_from_density(p.density);
        });
    }

    /// Tait-like equation of state.
    pub fn pressure_from_density(&self, density: f64) -> f64 {
        self.stiffness * ((density / self.rest_density).powf(self.exponent) - 1.0)
    }

    /// Set acceleration to gravity plus viscosity for fluid particles, zero
    /// for everything else.
    pub fn compute_non_pressure_forces(
        &self,
        particles: &mut [Particle],
        neighbors: &NeighborLists,
    ) {
        let view: &[Particle] = particles;
        let accelerations: Vec<Vector2> = view
            .par_iter()
            .zip(neighbors.par_iter())
            .map(|(p_i, list)| {
                if !p_i.is_fluid() {
                    return Vector2::ZERO;
                }
                let mut dv = Vector2::new(0.0, self.gravity);
                if self.viscosity > 0.0 {
                    for &j in list {
                        dv += self.viscosity_force(p_i, &view[j]);
                    }
                }
                dv
            })
            .collect();

        for (p, acceleration) in particles.iter_mut().zip(accelerations) {
            p.acceleration = acceleration;
        }
    }

    /// Add pressure accelerations on top of the non-pressure ones.
    pub fn compute_pressure_forces(&self, particles: &mut [Particle], neighbors: &NeighborLists) {
        let view: &[Particle] = particles;
        let deltas: Vec<Vector2> = view
            .par_iter()
            .zip(neighbors.par_iter())
            .map(|(p_i, list)| {
                if !p_i.is_fluid() {
                    return Vector2::ZERO;
                }
                list.iter()
                    .map(|&j| self.pressure_force(p_i, &view[j]))
                    .fold(Vector2::ZERO, |acc, f| acc + f)
            })
            .collect();

        for (p, dv) in particles.iter_mut().zip(deltas) {
            p.acceleration += dv;
        }
    }

    /// Viscosity acceleration on `p_i` from `p_j`.
    pub fn viscosity_force(&self, p_i: &Particle, p_j: &Particle) -> Vector2 {
        let r = p_i.position - p_j.position;
        let r_norm = norm(r);
        let v_dot_r = dot(p_i.velocity - p_j.velocity, r);
        let magnitude = self.viscosity_factor * (self.particle_mass / p_j.density) * v_dot_r
            / (r_norm * r_norm + self.viscosity_regularizer);
        self.kernel.gradient(r) * magnitude
    }

    /// Pressure acceleration on `p_i` from `p_j`.
    pub fn pressure_force(&self, p_i: &Particle, p_j: &Particle) -> Vector2 {
        let r = p_i.position - p_j.position;
        let term = p_i.pressure / (p_i.density * p_i.density)
            + p_j.pressure / (p_j.density * p_j.density);
        self.kernel.gradient(r) * (-self.rest_density * self.particle_volume * term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fluid::spatial::{GridConfig, SpatialGrid};

    fn neighbor_lists(particles: &[Particle], h: f64) -> NeighborLists {
        let config = GridConfig::for_domain(Vector2::new(200.0, 200.0), Vector2::ZERO, h);
        let mut grid = SpatialGrid::new(config);
        grid.build(particles);
        (0..particles.len())
            .map(|i| grid.neighbors(particles, i))
            .collect()
    }

    fn cluster(spacing: f64) -> Vec<Particle> {
        let mut particles = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                particles.push(Particle::new(Vector2::new(
                    50.0 + x as f64 * spacing,
                    50.0 + y as f64 * spacing,
                )));
            }
        }
        particles
    }

    #[test]
    fn test_density_floor_and_non_negative_pressure() {
        let params = FluidParams::default();
        let solver = SphSolver::new(&params);
        // tight packing pushes interior densities above rest
        let mut particles = cluster(params.particle_diameter() * 0.5);
        particles.push(Particle::new(Vector2::new(150.0, 150.0)));
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.solve(&mut particles, &neighbors);

        for p in &particles {
            assert!(p.density >= params.rest_density);
            assert!(p.pressure >= 0.0);
        }
        assert!(particles[12].density > params.rest_density);
        assert!(particles[12].pressure > 0.0);
    }

    #[test]
    fn test_isolated_particle_has_zero_raw_density() {
        let params = FluidParams::default();
        let solver = SphSolver::new(&params);
        let mut particles = vec![Particle::new(Vector2::new(10.0, 10.0))];
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.compute_densities(&mut particles, &neighbors);
        assert_eq!(particles[0].density, 0.0);

        solver.apply_equation_of_state(&mut particles);
        assert_eq!(particles[0].density, params.rest_density);
        assert_eq!(particles[0].pressure, 0.0);
    }

    #[test]
    fn test_density_sum() {
        let params = FluidParams::default();
        let solver = SphSolver::new(&params);
        let mut particles = vec![
            Particle::new(Vector2::new(10.0, 10.0)),
            Particle::new(Vector2::new(10.5, 10.0)),
        ];
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.compute_densities(&mut particles, &neighbors);

        let expected =
            params.rest_density * params.particle_volume() * solver.kernel().value(0.5);
        assert!((particles[0].density - expected).abs() < 1e-9);
        assert!((particles[1].density - expected).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_particle_feels_only_gravity() {
        let params = FluidParams::default().with_gravity(9.8);
        let solver = SphSolver::new(&params);
        let mut particles = vec![Particle::new(Vector2::new(10.0, 10.0)).with_velocity(Vector2::X)];
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.compute_densities(&mut particles, &neighbors);
        solver.apply_equation_of_state(&mut particles);
        solver.compute_non_pressure_forces(&mut particles, &neighbors);
        assert_eq!(particles[0].acceleration, Vector2::new(0.0, 9.8));

        solver.compute_pressure_forces(&mut particles, &neighbors);
        assert_eq!(particles[0].acceleration, Vector2::new(0.0, 9.8));
    }

    #[test]
    fn test_pressure_pair_forces_are_antiparallel() {
        let params = FluidParams::default();
        let solver = SphSolver::new(&params);
        let mut a = Particle::new(Vector2::new(10.0, 10.0));
        let mut b = Particle::new(Vector2::new(10.6, 10.8));
        for p in [&mut a, &mut b] {
            p.density = 1200.0;
            p.pressure = solver.pressure_from_density(p.density);
        }

        let f_ab = solver.pressure_force(&a, &b);
        let f_ba = solver.pressure_force(&b, &a);

        assert!(f_ab.length() > 0.0);
        assert!((f_ab + f_ba).length() < 1e-12 * f_ab.length().max(1.0));
        // positive pressure pushes particles apart
        assert!(dot(f_ab, a.position - b.position) > 0.0);
    }

    #[test]
    fn test_viscosity_damps_relative_motion() {
        let params = FluidParams::default().with_viscosity(0.5);
        let solver = SphSolver::new(&params);
        let mut a = Particle::new(Vector2::new(10.0, 10.0)).with_velocity(Vector2::new(1.0, 0.0));
        let mut b = Particle::new(Vector2::new(10.8, 10.0)).with_velocity(Vector2::new(-1.0, 0.0));
        a.density = params.rest_density;
        b.density = params.rest_density;

        // approaching particles are slowed down
        let f = solver.viscosity_force(&a, &b);
        assert!(f.x < 0.0);
        let g = solver.viscosity_force(&b, &a);
        assert!((f + g).length() < 1e-12);
    }

    #[test]
    fn test_boundary_particles_receive_no_forces() {
        let params = FluidParams::default();
        let solver = SphSolver::new(&params);
        let mut particles = vec![
            Particle::boundary(Vector2::new(10.0, 10.0)),
            Particle::new(Vector2::new(10.5, 10.0)),
        ];
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.solve(&mut particles, &neighbors);

        assert_eq!(particles[0].acceleration, Vector2::ZERO);
        assert!(particles[0].density >= params.rest_density);
        assert!(particles[1].acceleration.length() > 0.0);
    }

    #[test]
    fn test_zero_gravity_isolated_particles_stay_at_rest() {
        let params = FluidParams::default().with_gravity(0.0);
        let solver = SphSolver::new(&params);
        let mut particles = vec![
            Particle::new(Vector2::new(10.0, 10.0)),
            Particle::new(Vector2::new(30.0, 10.0)),
            Particle::new(Vector2::new(10.0, 30.0)),
        ];
        let neighbors = neighbor_lists(&particles, params.support_radius());

        solver.solve(&mut particles, &neighbors);

        for p in &particles {
            assert_eq!(p.density, params.rest_density);
            assert_eq!(p.pressure, 0.0);
            assert_eq!(p.acceleration, Vector2::ZERO);
        }
    }
}
