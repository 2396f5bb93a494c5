/*
 * Spawn Module
 *
 * Start-position samplers for flock initialisation.
 */

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform positions inside the cube `[-half_extent, half_extent)^3`.
pub struct UniformCube {
    half_extent: f32,
    rng: StdRng,
}

impl UniformCube {
    /// Reproducible sampler: the same seed yields the same positions.
    pub fn seeded(half_extent: f32, seed: u64) -> Self {
        Self {
            half_extent,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(half_extent: f32) -> Self {
        Self {
            half_extent,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn sample(&mut self) -> Vec3 {
        let h = self.half_extent;
        Vec3::new(
            self.rng.gen_range(-h..h),
            self.rng.gen_range(-h..h),
            self.rng.gen_range(-h..h),
        )
    }

    /// Adapter for APIs that take a position closure.
    pub fn sampler(&mut self) -> impl FnMut() -> Vec3 + '_ {
        move || self.sample()
    }
}
