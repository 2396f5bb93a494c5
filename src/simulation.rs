/*
 * Simulation Module
 *
 * Headless host loop around a flock group. It plays the role of the game
 * engine: each fixed step runs the flock update (steering + frame limits)
 * and then the physics step that integrates the applied forces.
 *
 * Uses a fixed timestep with an accumulator so the flock sees the same dt
 * whatever the render frame rate is.
 */

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use tracing::{debug, info};

use crate::config::{FlockConfig, Settings};
use crate::debug::DebugInfo;
use crate::error::FlockError;
use crate::flock::{FlockOptions, TickStats};
use crate::group::FlockGroup;
use crate::motion::{MotionProvider, RigidBody};
use crate::spawn::UniformCube;

pub struct Simulation {
    group: FlockGroup<RigidBody>,
    config: Arc<FlockConfig>,
    physics_accumulator: Duration,
    physics_step_size: Duration,
    paused: bool,
    debug_info: DebugInfo,
}

impl Simulation {
    pub fn new(group: FlockGroup<RigidBody>, config: Arc<FlockConfig>, physics_step_size: Duration) -> Self {
        Self {
            group,
            config,
            physics_accumulator: Duration::ZERO,
            physics_step_size,
            paused: false,
            debug_info: DebugInfo::default(),
        }
    }

    /// Build the population described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, FlockError> {
        settings.validate()?;

        let config = Arc::new(settings.flock.clone());
        let population = &settings.population;
        let mut cube = match population.seed {
            Some(seed) => UniformCube::seeded(population.spawn_extent, seed),
            None => UniformCube::from_entropy(population.spawn_extent),
        };
        let options: FlockOptions = settings.optimizations.flock_options();
        let group = FlockGroup::partitioned(
            config.clone(),
            population.count,
            population.groups,
            cube.sampler(),
            options,
        )?;

        let mut simulation = Self::new(
            group,
            config,
            Duration::from_secs_f32(settings.run.timestep),
        );
        if let Some([x, y, z]) = settings.run.target {
            simulation.broadcast_target(Vec3::new(x, y, z))?;
        }

        info!(
            agents = simulation.group.len(),
            groups = population.groups,
            ?options,
            "simulation ready"
        );
        Ok(simulation)
    }

    /// Run exactly one fixed step: flock update, then physics integration.
    pub fn step(&mut self) -> Result<TickStats, FlockError> {
        let dt = self.physics_step_size.as_secs_f32();
        let stats = self.group.update(dt)?;

        let mut speed_sum = 0.0;
        let mut count = 0usize;
        for body in self.group.bodies_mut() {
            body.integrate(dt);
            speed_sum += body.linear_velocity().length();
            count += 1;
        }
        let mean_speed = if count > 0 { speed_sum / count as f32 } else { 0.0 };

        self.debug_info.record_tick(stats, mean_speed);
        Ok(stats)
    }

    /// Feed elapsed frame time and run as many fixed steps as fit.
    /// Returns the number of steps run.
    pub fn advance(&mut self, frame_time: Duration) -> Result<usize, FlockError> {
        if self.paused {
            self.debug_info.record_frame(frame_time, 0);
            return Ok(0);
        }

        self.physics_accumulator += frame_time;
        let mut physics_updates_this_frame = 0;
        while self.physics_accumulator >= self.physics_step_size {
            self.step()?;
            self.physics_accumulator -= self.physics_step_size;
            physics_updates_this_frame += 1;
        }

        self.debug_info.record_frame(frame_time, physics_updates_this_frame);
        Ok(physics_updates_this_frame)
    }

    /// Bias every flock towards `position` using the configured strength.
    pub fn broadcast_target(&mut self, position: Vec3) -> Result<(), FlockError> {
        debug!(?position, "retargeting simulation");
        self.group
            .broadcast_target(position, self.config.target_force_strength)
    }

    pub fn clear_target(&mut self) {
        self.group.clear_target();
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn group(&self) -> &FlockGroup<RigidBody> {
        &self.group
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    pub fn step_size(&self) -> Duration {
        self.physics_step_size
    }
}
