//! Bevy plugin for fluid simulation.
//!
//! The plugin is a thin driver around [`FluidSimulation`]: it advances the
//! simulation by one tick every `FixedUpdate`, honoring pause and single-step
//! requests from [`FluidState`]. Edits to the [`FluidParams`] and [`Domain`]
//! resources are applied to the running simulation before the next tick.

use std::time::Duration;

use bevy::log::{error, warn};
use bevy::prelude::*;

use super::boundary::Domain;
use super::params::FluidParams;
use super::particle::Particle;
use super::simulation::FluidSimulation;

/// Default wall-clock interval between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Plugin that adds an SPH fluid simulation to a Bevy app.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use sph2d::prelude::*;
///
/// fn main() {
///     let particles = spawn_particle_block(Vector2::new(5.0, 5.0), 20, 20, 1.0, Vector2::ZERO);
///     App::new()
///         .add_plugins(MinimalPlugins)
///         .add_plugins(FluidPlugin::new(particles).with_domain(Domain::default()))
///         .run();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FluidPlugin {
    pub params: FluidParams,
    pub domain: Domain,
    pub particles: Vec<Particle>,
    pub tick_interval: Duration,
}

impl FluidPlugin {
    /// Create a plugin simulating `particles` with default settings.
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            params: FluidParams::default(),
            domain: Domain::default(),
            particles,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Use `params` instead of the defaults.
    pub fn with_params(mut self, params: FluidParams) -> Self {
        self.params = params;
        self
    }

    /// Simulate inside `domain`.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Wall-clock interval between `FixedUpdate` ticks.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FluidParams>()
            .register_type::<Domain>();

        app.insert_resource(self.params.clone())
            .insert_resource(self.domain)
            .insert_resource(Time::<Fixed>::from_duration(self.tick_interval))
            .init_resource::<FluidState>();

        match FluidSimulation::new(self.particles.clone(), self.params.clone(), self.domain) {
            Ok(simulation) => {
                app.world_mut().resource_mut::<FluidState>().particle_count =
                    simulation.num_particles();
                app.insert_resource(simulation);
            }
            Err(err) => {
                error!("Fluid simulation not started: {err}");
                return;
            }
        }

        app.add_systems(FixedUpdate, (apply_config_changes, run_simulation).chain());
    }
}

/// Runtime state of the driver.
#[derive(Resource, Clone, Debug, Default)]
pub struct FluidState {
    pub paused: bool,
    step_requested: bool,
    /// Ticks run so far.
    pub frame: u64,
    /// Simulated time.
    pub time: f64,
    pub particle_count: usize,
    pub avg_density_error: f64,
    /// Set once the simulation produced a NaN or infinity.
    pub diverged: bool,
}

impl FluidState {
    /// Pause or resume ticking.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Run exactly one tick while paused.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }
}

/// System pushing edited `FluidParams` / `Domain` resources into the simulation.
fn apply_config_changes(
    params: Res<FluidParams>,
    domain: Res<Domain>,
    mut simulation: ResMut<FluidSimulation>,
) {
    if !params.is_changed() && !domain.is_changed() {
        return;
    }
    if simulation.params() == &*params && simulation.domain() == &*domain {
        return;
    }
    if let Err(err) = simulation.reconfigure((*params).clone(), *domain) {
        warn!("Fluid configuration change ignored: {err}");
    }
}

/// System advancing the simulation by one tick.
fn run_simulation(mut state: ResMut<FluidState>, mut simulation: ResMut<FluidSimulation>) {
    if state.paused && !state.step_requested {
        return;
    }
    state.step_requested = false;

    simulation.advance();

    state.frame = simulation.frame();
    state.time += simulation.dt();
    state.avg_density_error = simulation.stats().average_density_error;

    if !state.diverged {
        if let Err(err) = simulation.check_finite() {
            warn!("Fluid simulation diverged at frame {}: {err}", state.frame);
            state.diverged = true;
        }
    }
}
