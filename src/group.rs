/*
 * Flock Group Module
 *
 * Splits one population into several independent flocks. Agents only steer
 * against members of their own flock, so a group of k flocks costs roughly
 * 1/k of the brute-force scan of one big flock. Every flock keeps its own
 * half-update phase.
 */

use std::sync::Arc;

use glam::Vec3;
use tracing::debug;

use crate::config::FlockConfig;
use crate::error::FlockError;
use crate::flock::{Flock, FlockOptions, TickStats};
use crate::motion::MotionProvider;

pub struct FlockGroup<M> {
    flocks: Vec<Flock<M>>,
}

impl<M: MotionProvider + Default> FlockGroup<M> {
    /// Build `groups` flocks of `total / groups` agents each. Agents left over
    /// by the integer division are not created.
    pub fn partitioned(
        config: Arc<FlockConfig>,
        total: usize,
        groups: usize,
        mut sampler: impl FnMut() -> Vec3,
        options: FlockOptions,
    ) -> Result<Self, FlockError> {
        if groups == 0 || total / groups == 0 {
            return Err(FlockError::EmptyGroup);
        }

        let per_group = total / groups;
        let flocks = (0..groups)
            .map(|_| Flock::initialize(config.clone(), per_group, &mut sampler, options))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(groups, per_group, dropped = total - per_group * groups, "flock group built");
        Ok(Self { flocks })
    }
}

impl<M: MotionProvider> FlockGroup<M> {
    pub fn from_flocks(flocks: Vec<Flock<M>>) -> Self {
        Self { flocks }
    }

    /// Advance every flock one tick, in order.
    pub fn update(&mut self, dt: f32) -> Result<TickStats, FlockError> {
        let mut stats = TickStats::default();
        for flock in &mut self.flocks {
            let report = flock.update(dt)?;
            stats.absorb(&report.stats);
        }
        Ok(stats)
    }

    pub fn broadcast_target(&mut self, position: Vec3, strength: f32) -> Result<(), FlockError> {
        for flock in &mut self.flocks {
            flock.broadcast_target(position, strength)?;
        }
        Ok(())
    }

    pub fn clear_target(&mut self) {
        for flock in &mut self.flocks {
            flock.clear_target();
        }
    }

    pub fn flocks(&self) -> &[Flock<M>] {
        &self.flocks
    }

    /// Total number of agents across all flocks.
    pub fn len(&self) -> usize {
        self.flocks.iter().map(Flock::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bodies(&self) -> impl Iterator<Item = &M> {
        self.flocks.iter().flat_map(|flock| flock.bodies())
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut M> {
        self.flocks.iter_mut().flat_map(|flock| flock.bodies_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flock::UpdatePhase;
    use crate::motion::RigidBody;

    fn spaced() -> impl FnMut() -> Vec3 {
        let mut i = 0.0;
        move || {
            i += 1.0;
            Vec3::new(i * 2.0, 0.0, 0.0)
        }
    }

    #[test]
    fn splits_population_with_integer_division() {
        let config = Arc::new(FlockConfig::default());
        let group: FlockGroup<RigidBody> =
            FlockGroup::partitioned(config, 103, 5, spaced(), FlockOptions::default()).unwrap();
        assert_eq!(group.flocks().len(), 5);
        assert!(group.flocks().iter().all(|flock| flock.len() == 20));
        assert_eq!(group.len(), 100);
    }

    #[test]
    fn rejects_groups_that_would_be_empty() {
        let config = Arc::new(FlockConfig::default());
        let result: Result<FlockGroup<RigidBody>, _> =
            FlockGroup::partitioned(config.clone(), 3, 5, spaced(), FlockOptions::default());
        assert!(matches!(result, Err(FlockError::EmptyGroup)));

        let result: Result<FlockGroup<RigidBody>, _> =
            FlockGroup::partitioned(config, 10, 0, spaced(), FlockOptions::default());
        assert!(matches!(result, Err(FlockError::EmptyGroup)));
    }

    #[test]
    fn update_merges_stats_and_advances_each_phase() {
        let config = Arc::new(FlockConfig::default());
        let mut group: FlockGroup<RigidBody> =
            FlockGroup::partitioned(config, 100, 5, spaced(), FlockOptions::default()).unwrap();

        let stats = group.update(1.0 / 60.0).unwrap();
        assert_eq!(stats.processed, 50);
        assert!(group
            .flocks()
            .iter()
            .all(|flock| flock.phase() == UpdatePhase::SecondHalf));
    }

    #[test]
    fn broadcast_reaches_every_flock() {
        let config = Arc::new(FlockConfig::default());
        let mut group: FlockGroup<RigidBody> =
            FlockGroup::partitioned(config, 40, 2, spaced(), FlockOptions::default()).unwrap();
        group.broadcast_target(Vec3::new(0.0, 50.0, 0.0), 3.0).unwrap();
        for flock in group.flocks() {
            for agent in flock.agents() {
                assert_eq!(agent.target().map(|t| t.strength), Some(3.0));
            }
        }
        assert_eq!(group.bodies_mut().count(), 40);
    }
}
