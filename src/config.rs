/*
 * Configuration Module
 *
 * FlockConfig holds the tuning values every agent's force computation reads:
 * squared-distance ranges, force factors and the per-frame speed and world
 * limits. It is built once per run, validated, and shared between flocks
 * through an Arc so no flock can change another's tuning.
 *
 * Settings is the run-level configuration loaded from TOML (population,
 * optimisation flags, timestep). Every field has a default so a partial file
 * is enough.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flock::{FlockOptions, UpdateMode};

/// Shared, immutable steering tunables.
///
/// All `*_range` values are squared distances and are compared against the
/// squared separation between two agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub cohesion_range: f32,
    pub separation_range: f32,
    pub alignment_range: f32,
    pub copy_range: f32,
    pub cohesion_factor: f32,
    pub separation_factor: f32,
    pub alignment_factor: f32,
    /// Magnitude of the desired velocity used by the cohesion term.
    pub cohesion_max_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Half-extent of the world cube; positions are held inside `[-world_size, world_size]`.
    pub world_size: f32,
    /// Neighbours considered per force category when capping is enabled.
    pub neighbor_cap: usize,
    /// Divisor of the target force every agent starts with.
    pub target_force_strength: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            cohesion_range: 900.0,
            separation_range: 625.0,
            alignment_range: 225.0,
            copy_range: 100.0,
            cohesion_factor: 15.0,
            separation_factor: 20.0,
            alignment_factor: 12.0,
            cohesion_max_speed: 3.0,
            min_speed: 5.0,
            max_speed: 10.0,
            world_size: 250.0,
            neighbor_cap: 10,
            target_force_strength: 2.0,
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("cohesion_range", self.cohesion_range),
            ("separation_range", self.separation_range),
            ("alignment_range", self.alignment_range),
            ("copy_range", self.copy_range),
            ("cohesion_factor", self.cohesion_factor),
            ("separation_factor", self.separation_factor),
            ("alignment_factor", self.alignment_factor),
            ("cohesion_max_speed", self.cohesion_max_speed),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }

        if self.min_speed > self.max_speed {
            return Err(ConfigError::invalid(
                "min_speed",
                format!("{} is above max_speed {}", self.min_speed, self.max_speed),
            ));
        }
        if !self.world_size.is_finite() || self.world_size <= 0.0 {
            return Err(ConfigError::invalid(
                "world_size",
                format!("must be positive, got {}", self.world_size),
            ));
        }
        if !self.target_force_strength.is_finite() || self.target_force_strength == 0.0 {
            return Err(ConfigError::invalid(
                "target_force_strength",
                format!("must be finite and non-zero, got {}", self.target_force_strength),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationSettings {
    pub count: usize,
    /// Number of independent flocks the population is split into.
    pub groups: usize,
    /// Start positions are sampled in `[-spawn_extent, spawn_extent)` on each axis.
    pub spawn_extent: f32,
    pub seed: Option<u64>,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            count: 100,
            groups: 5,
            spawn_extent: 25.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    pub copy: bool,
    pub neighbor_cap: bool,
    pub half_update: bool,
    pub mode: UpdateMode,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        Self {
            copy: true,
            neighbor_cap: true,
            half_update: true,
            mode: UpdateMode::Sequential,
        }
    }
}

impl OptimizationSettings {
    pub fn flock_options(&self) -> FlockOptions {
        FlockOptions {
            copy_optimization: self.copy,
            neighbor_cap: self.neighbor_cap,
            half_update: self.half_update,
            mode: self.mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub ticks: u64,
    /// Fixed simulation step in seconds.
    pub timestep: f32,
    pub target: Option<[f32; 3]>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: 600,
            timestep: 1.0 / 60.0,
            target: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub flock: FlockConfig,
    pub population: PopulationSettings,
    pub optimizations: OptimizationSettings,
    pub run: RunSettings,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flock.validate()?;

        let population = &self.population;
        if population.count == 0 {
            return Err(ConfigError::invalid("population.count", "must be at least 1"));
        }
        if population.groups == 0 || population.groups > population.count {
            return Err(ConfigError::invalid(
                "population.groups",
                format!("must be between 1 and count ({}), got {}", population.count, population.groups),
            ));
        }
        if !population.spawn_extent.is_finite() || population.spawn_extent <= 0.0 {
            return Err(ConfigError::invalid(
                "population.spawn_extent",
                format!("must be positive, got {}", population.spawn_extent),
            ));
        }
        if !self.run.timestep.is_finite() || self.run.timestep <= 0.0 {
            return Err(ConfigError::invalid(
                "run.timestep",
                format!("must be positive, got {}", self.run.timestep),
            ));
        }
        Ok(())
    }
}
