/*
 * Motion Module
 *
 * The flocking core never stores authoritative position or velocity itself.
 * Every agent talks to a motion provider (normally a physics engine's rigid
 * body) through the narrow MotionProvider contract below.
 *
 * RigidBody is a minimal point-mass provider used by the headless runner,
 * the viewer, the tests and the benchmarks. Forces accumulate until the host
 * calls `integrate`, the same way a physics engine only moves bodies during
 * its own step.
 */

use glam::{Quat, Vec3};

use crate::error::ConfigError;

/// Motion state owned by an external physics collaborator.
pub trait MotionProvider: Send + Sync {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn apply_force(&mut self, force: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
}

#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    position: Vec3,
    velocity: Vec3,
    rotation: Quat,
    pending_force: Vec3,
    inverse_mass: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            pending_force: Vec3::ZERO,
            inverse_mass: 1.0,
        }
    }
}

impl RigidBody {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            ..Self::default()
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Result<Self, ConfigError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(ConfigError::invalid("mass", format!("must be positive, got {mass}")));
        }
        self.inverse_mass = 1.0 / mass;
        Ok(self)
    }

    pub fn mass(&self) -> f32 {
        1.0 / self.inverse_mass
    }

    /// Force accumulated since the last integration step.
    pub fn pending_force(&self) -> Vec3 {
        self.pending_force
    }

    // Semi-implicit Euler step, then clear the accumulated force
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.pending_force * self.inverse_mass * dt;
        self.position += self.velocity * dt;
        self.pending_force = Vec3::ZERO;
    }
}

impl MotionProvider for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn apply_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forces_accumulate_until_integration() {
        let mut body = RigidBody::new(Vec3::ZERO, Vec3::X);
        body.apply_force(Vec3::new(2.0, 0.0, 0.0));
        body.apply_force(Vec3::new(0.0, 4.0, 0.0));

        // Velocity only changes when the physics step runs
        assert_eq!(body.linear_velocity(), Vec3::X);
        assert_eq!(body.pending_force(), Vec3::new(2.0, 4.0, 0.0));

        body.integrate(0.5);
        assert_eq!(body.linear_velocity(), Vec3::new(2.0, 2.0, 0.0));
        assert_eq!(body.position(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(body.pending_force(), Vec3::ZERO);
    }

    #[test]
    fn heavier_bodies_accelerate_less() {
        let mut body = RigidBody::default().with_mass(4.0).unwrap();
        body.apply_force(Vec3::Z * 8.0);
        body.integrate(1.0);
        assert_eq!(body.linear_velocity(), Vec3::Z * 2.0);
        assert!((body.mass() - 4.0).abs() < 1.0e-6);
    }

    #[test]
    fn rejects_non_positive_mass() {
        assert!(RigidBody::default().with_mass(0.0).is_err());
        assert!(RigidBody::default().with_mass(f32::NAN).is_err());
    }
}
