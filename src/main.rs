//! sph2d - headless dam break demo
//!
//! Lays out a block of fluid in a square canvas the way a phone-sized screen
//! driver would, runs the fixed-rate driver for a number of ticks and logs
//! statistics along the way.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use sph2d::prelude::*;

/// Particle radius in pixels.
const RADIUS: f64 = 6.0;
const COLUMNS: usize = 40;
const ROWS: usize = 60;
const TICKS: u64 = 300;
const REPORT_EVERY: u64 = 50;

fn main() {
    let params = FluidParams::default().with_particle_radius(RADIUS);

    let canvas = 2.0 * RADIUS * COLUMNS as f64 * 3.0;
    let extent = Vector2::new(canvas, canvas);
    // center the block horizontally with a small margin from the top
    let offset = Vector2::new(canvas / 2.0 - COLUMNS as f64 * RADIUS - 10.0, 10.0);

    let particles = spawn_particle_block(
        Vector2::ZERO,
        ROWS,
        COLUMNS,
        params.particle_diameter(),
        Vector2::ZERO,
    );

    let mut app = App::new();
    app.add_plugins(LogPlugin::default()).add_plugins(
        FluidPlugin::new(particles)
            .with_params(params)
            .with_domain(Domain::new(extent, offset)),
    );

    if app.world().get_resource::<FluidSimulation>().is_none() {
        return;
    }

    for _ in 0..TICKS {
        app.world_mut().run_schedule(FixedUpdate);

        let state = app.world().resource::<FluidState>();
        if state.diverged {
            break;
        }
        if state.frame % REPORT_EVERY == 0 {
            report(app.world());
        }
    }
    report(app.world());
}

fn report(world: &World) {
    let simulation = world.resource::<FluidSimulation>();
    let state = world.resource::<FluidState>();
    let stats = simulation.stats();
    info!(
        "frame {} (t = {:.2}): max density {:.1}, density error {:.2}%, \
         max speed {:.2}, centroid ({:.1}, {:.1})",
        state.frame,
        state.time,
        stats.max_density,
        stats.average_density_error * 100.0,
        stats.max_speed,
        stats.centroid.x,
        stats.centroid.y,
    );
}
