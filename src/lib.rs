/*
 * Boid Flocking Core - Module Definitions
 *
 * Per-frame flocking steering for a fixed population of agents. Motion
 * state lives in an external motion provider; this crate computes steering
 * forces, applies speed/world limits and schedules the population updates.
 */

// Re-export key components for easier access
pub use agent::{Agent, AgentOptions, AgentSnapshot, Neighbor, Steering, SteeringOutcome, Target};
pub use config::{FlockConfig, Settings};
pub use debug::DebugInfo;
pub use error::{ConfigError, FlockError};
pub use flock::{Flock, FlockOptions, TickReport, TickStats, UpdateMode, UpdatePhase};
pub use group::FlockGroup;
pub use motion::{MotionProvider, RigidBody};
pub use simulation::Simulation;
pub use spawn::UniformCube;

// Define modules
pub mod agent;
pub mod config;
pub mod debug;
pub mod error;
pub mod flock;
pub mod group;
pub mod math;
pub mod motion;
pub mod simulation;
pub mod spawn;

#[cfg(feature = "viewer")]
pub mod viewer;

// Re-export the math types used throughout the public API
pub use glam::{Quat, Vec3};
