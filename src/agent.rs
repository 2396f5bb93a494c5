/*
 * Agent Module
 *
 * An agent is one member of a flock. Its position and velocity live in the
 * motion provider it owns; the agent itself only keeps the last steering
 * force, its optimisation flags and the target bias broadcast by the flock.
 *
 * Each tick an agent:
 * 1. Scans the whole population in index order, accumulating cohesion,
 *    alignment and separation neighbours (or copying a very close
 *    neighbour's force and stopping right there)
 * 2. Blends the three forces plus the target force into one steering force
 * 3. Pushes that force into its motion provider, clamps its speed, faces its
 *    velocity and is held inside the world cube
 */

use glam::{Quat, Vec3};

use crate::config::FlockConfig;
use crate::error::FlockError;
use crate::math::{clamp_to_world, look_rotation, normalize_or_zero};
use crate::motion::MotionProvider;

/// Read-only view of another agent during a neighbour scan.
pub trait Neighbor {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn steering_force(&self) -> Vec3;
}

/// Frozen copy of one agent's state, used by synchronized updates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub steering_force: Vec3,
}

impl Neighbor for AgentSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn steering_force(&self) -> Vec3 {
        self.steering_force
    }
}

/// Point the flock is biased towards. The pull is `(position - agent) / strength`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    pub position: Vec3,
    pub strength: f32,
}

impl Target {
    pub fn new(position: Vec3, strength: f32) -> Result<Self, FlockError> {
        if !strength.is_finite() || strength == 0.0 {
            return Err(FlockError::InvalidForceStrength(strength));
        }
        Ok(Self { position, strength })
    }

    pub fn origin(strength: f32) -> Result<Self, FlockError> {
        Self::new(Vec3::ZERO, strength)
    }

    #[inline]
    pub fn force_on(&self, position: Vec3) -> Vec3 {
        (self.position - position) / self.strength
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentOptions {
    pub copy_optimization: bool,
    pub neighbor_cap_enabled: bool,
    pub neighbor_cap: usize,
}

/// How a steering force was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteeringOutcome {
    /// Adopted the already computed force of the agent at `from`.
    Copied { from: usize },
    /// Neighbour counts per category.
    Computed {
        cohesion: usize,
        alignment: usize,
        separation: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    pub force: Vec3,
    pub outcome: SteeringOutcome,
}

impl Steering {
    pub fn copied(&self) -> bool {
        matches!(self.outcome, SteeringOutcome::Copied { .. })
    }

    /// True when the scan found no cohesion neighbour, which zeroes the force.
    pub fn without_cohesion(&self) -> bool {
        matches!(self.outcome, SteeringOutcome::Computed { cohesion: 0, .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    /// Speed after clamping.
    pub speed: f32,
    /// Whether the speed had to be raised or lowered.
    pub clamped: bool,
    /// Whether any axis was snapped to the world boundary.
    pub pinned: bool,
}

pub struct Agent<M> {
    body: M,
    steering_force: Vec3,
    options: AgentOptions,
    population_size: usize,
    target: Option<Target>,
}

impl<M: MotionProvider> Agent<M> {
    pub fn new(body: M, options: AgentOptions, population_size: usize, target: Option<Target>) -> Self {
        Self {
            body,
            steering_force: Vec3::ZERO,
            options,
            population_size,
            target,
        }
    }

    pub fn body(&self) -> &M {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut M {
        &mut self.body
    }

    pub fn options(&self) -> AgentOptions {
        self.options
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn steering_force(&self) -> Vec3 {
        self.steering_force
    }

    /// Overwrite the stored steering force. Neighbours with the copy
    /// optimisation read this value.
    pub fn set_steering_force(&mut self, force: Vec3) {
        self.steering_force = force;
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            position: self.body.position(),
            velocity: self.body.linear_velocity(),
            steering_force: self.steering_force,
        }
    }

    /// Compute this agent's steering force from `population`, where this agent
    /// sits at `self_index`.
    ///
    /// The scan is brute force over every other agent in index order. Two
    /// early exits exist: the copy short-circuit, which returns the neighbour's
    /// stored force untouched, and the separation ceiling, which ends the scan
    /// before the neighbour that would exceed it is counted anywhere.
    ///
    /// No cohesion neighbour means a zero force, even when alignment or
    /// separation neighbours were found.
    pub fn compute_force<N: Neighbor>(
        &self,
        population: &[N],
        self_index: usize,
        config: &FlockConfig,
    ) -> Result<Steering, FlockError> {
        if population.len() != self.population_size {
            return Err(FlockError::PopulationMismatch {
                declared: self.population_size,
                actual: population.len(),
            });
        }
        let me = population.get(self_index).ok_or(FlockError::AgentOutOfRange {
            index: self_index,
            len: population.len(),
        })?;
        let position = me.position();
        let velocity = me.velocity();

        let ceiling = if self.options.neighbor_cap_enabled {
            self.options.neighbor_cap
        } else {
            self.population_size
        };

        let mut cohesion_count = 0usize;
        let mut alignment_count = 0usize;
        let mut separation_count = 0usize;
        let mut centroid_sum = Vec3::ZERO;
        let mut direction_sum = Vec3::ZERO;
        let mut separation_sum = Vec3::ZERO;

        for (j, other) in population.iter().enumerate() {
            if j == self_index {
                continue;
            }

            let separation = position - other.position();
            let distance_squared = separation.length_squared();

            if self.options.copy_optimization && distance_squared < config.copy_range {
                return Ok(Steering {
                    force: other.steering_force(),
                    outcome: SteeringOutcome::Copied { from: j },
                });
            }

            // The separation ceiling is the one that ends the scan
            if separation_count >= ceiling {
                break;
            }

            if cohesion_count < ceiling && distance_squared < config.cohesion_range {
                centroid_sum += other.position();
                cohesion_count += 1;
            }

            if alignment_count < ceiling && distance_squared < config.alignment_range {
                direction_sum += other.velocity();
                alignment_count += 1;
            }

            if distance_squared < config.separation_range {
                separation_sum += normalize_or_zero(separation);
                separation_count += 1;
            }
        }

        let outcome = SteeringOutcome::Computed {
            cohesion: cohesion_count,
            alignment: alignment_count,
            separation: separation_count,
        };

        if cohesion_count == 0 {
            return Ok(Steering {
                force: Vec3::ZERO,
                outcome,
            });
        }

        let mut alignment_force = Vec3::ZERO;
        if alignment_count > 0 {
            let average_direction = direction_sum / alignment_count as f32;
            alignment_force = (average_direction - velocity) * config.alignment_factor;
        }

        let mut separation_force = Vec3::ZERO;
        if separation_count > 0 {
            separation_force = separation_sum * config.separation_factor;
        }

        let centroid = centroid_sum / cohesion_count as f32;
        let desired = normalize_or_zero(centroid - position) * config.cohesion_max_speed;
        let cohesion_force = (desired - velocity) * config.cohesion_factor;

        let target_force = self
            .target
            .map_or(Vec3::ZERO, |target| target.force_on(position));

        Ok(Steering {
            force: separation_force + alignment_force + cohesion_force + target_force,
            outcome,
        })
    }

    /// Push the stored steering force into the motion provider and apply the
    /// per-frame limits: speed clamp, facing and the hard world walls.
    ///
    /// The provider integrates the force on its own step, so `_dt` is not
    /// used by the frame update itself.
    pub fn apply_update(&mut self, _dt: f32, config: &FlockConfig) -> FrameOutcome {
        self.body.apply_force(self.steering_force);

        let velocity = self.body.linear_velocity();
        let speed = velocity.length();
        let direction = normalize_or_zero(velocity);

        let mut final_speed = speed;
        let mut clamped = false;
        if direction != Vec3::ZERO {
            final_speed = speed.clamp(config.min_speed, config.max_speed);
            clamped = final_speed != speed;
            self.body.set_linear_velocity(direction * final_speed);
            self.body.set_rotation(look_rotation(direction, Vec3::Y));
        }

        // Hard walls: velocity is left alone so a pinned agent keeps pressing outward
        let (position, pinned) = clamp_to_world(self.body.position(), config.world_size);
        if pinned {
            self.body.set_position(position);
        }

        FrameOutcome {
            speed: final_speed,
            clamped,
            pinned,
        }
    }

    pub fn rotation(&self) -> Quat {
        self.body.rotation()
    }
}

impl<M: MotionProvider> Neighbor for Agent<M> {
    fn position(&self) -> Vec3 {
        self.body.position()
    }

    fn velocity(&self) -> Vec3 {
        self.body.linear_velocity()
    }

    fn steering_force(&self) -> Vec3 {
        self.steering_force
    }
}
