/*
 * Flock Module
 *
 * A flock owns a fixed-size, ordered sequence of agents and drives them one
 * tick at a time. Agents are addressed by index only; the population size is
 * fixed when the flock is built.
 *
 * Two update modes exist:
 * - Sequential: for each active index in increasing order, compute the force
 *   and immediately apply the frame update. Lower indices therefore expose
 *   this tick's state to higher ones, while higher indices (and agents outside
 *   the active half) still expose last tick's state.
 * - Synchronized: snapshot every agent first, compute the active range's
 *   forces in parallel against that snapshot, then apply the updates in order.
 *
 * With half updates enabled only half of the population is processed per
 * tick, alternating between [0, n/2) and [n/2, n). The phase belongs to this
 * flock instance.
 */

use std::ops::Range;
use std::sync::Arc;

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::agent::{Agent, AgentOptions, AgentSnapshot, FrameOutcome, Steering, Target};
use crate::config::FlockConfig;
use crate::error::FlockError;
use crate::motion::MotionProvider;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    Sequential,
    Synchronized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdatePhase {
    FirstHalf,
    SecondHalf,
}

impl UpdatePhase {
    /// Index range processed in this phase for a population of `n`.
    pub fn active_range(self, n: usize, half_update: bool) -> Range<usize> {
        if !half_update {
            return 0..n;
        }
        match self {
            UpdatePhase::FirstHalf => 0..n / 2,
            UpdatePhase::SecondHalf => n / 2..n,
        }
    }

    pub fn next(self) -> Self {
        match self {
            UpdatePhase::FirstHalf => UpdatePhase::SecondHalf,
            UpdatePhase::SecondHalf => UpdatePhase::FirstHalf,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlockOptions {
    pub copy_optimization: bool,
    pub neighbor_cap: bool,
    pub half_update: bool,
    pub mode: UpdateMode,
}

impl Default for FlockOptions {
    fn default() -> Self {
        Self {
            copy_optimization: true,
            neighbor_cap: true,
            half_update: true,
            mode: UpdateMode::Sequential,
        }
    }
}

/// Counters gathered while processing agents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub processed: usize,
    /// Agents that adopted a neighbour's force.
    pub copied: usize,
    /// Agents whose scan found no cohesion neighbour.
    pub without_cohesion: usize,
    pub speed_clamped: usize,
    pub pinned: usize,
}

impl TickStats {
    fn record(&mut self, steering: &Steering, frame: &FrameOutcome) {
        self.processed += 1;
        self.copied += steering.copied() as usize;
        self.without_cohesion += steering.without_cohesion() as usize;
        self.speed_clamped += frame.clamped as usize;
        self.pinned += frame.pinned as usize;
    }

    pub fn absorb(&mut self, other: &TickStats) {
        self.processed += other.processed;
        self.copied += other.copied;
        self.without_cohesion += other.without_cohesion;
        self.speed_clamped += other.speed_clamped;
        self.pinned += other.pinned;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub range: Range<usize>,
    /// Phase that ran, or `None` when half updates are off.
    pub phase: Option<UpdatePhase>,
    pub stats: TickStats,
}

pub struct Flock<M> {
    config: Arc<FlockConfig>,
    agents: Vec<Agent<M>>,
    options: FlockOptions,
    phase: UpdatePhase,
}

impl<M: MotionProvider + Default> Flock<M> {
    /// Create `count` agents with default bodies placed at positions drawn from `sampler`.
    pub fn initialize(
        config: Arc<FlockConfig>,
        count: usize,
        mut sampler: impl FnMut() -> Vec3,
        options: FlockOptions,
    ) -> Result<Self, FlockError> {
        let bodies = (0..count)
            .map(|_| {
                let mut body = M::default();
                body.set_position(sampler());
                body
            })
            .collect();
        Self::from_bodies(config, bodies, options)
    }
}

impl<M: MotionProvider> Flock<M> {
    pub fn from_bodies(
        config: Arc<FlockConfig>,
        bodies: Vec<M>,
        options: FlockOptions,
    ) -> Result<Self, FlockError> {
        config.validate()?;

        let count = bodies.len();
        if options.neighbor_cap {
            if config.neighbor_cap > count {
                return Err(FlockError::NeighborCapExceedsPopulation {
                    cap: config.neighbor_cap,
                    population: count,
                });
            }
            if config.neighbor_cap + 1 >= count {
                warn!(
                    cap = config.neighbor_cap,
                    count, "neighbour cap can never be reached by a flock this small"
                );
            }
        }

        let agent_options = AgentOptions {
            copy_optimization: options.copy_optimization,
            neighbor_cap_enabled: options.neighbor_cap,
            neighbor_cap: config.neighbor_cap,
        };
        let target = Target::origin(config.target_force_strength)?;
        let agents = bodies
            .into_iter()
            .map(|body| Agent::new(body, agent_options, count, Some(target)))
            .collect();

        debug!(count, ?options, "flock initialized");

        Ok(Self {
            config,
            agents,
            options,
            phase: UpdatePhase::FirstHalf,
        })
    }

    /// Advance one tick.
    pub fn update(&mut self, dt: f32) -> Result<TickReport, FlockError> {
        let phase = self.phase;
        let range = phase.active_range(self.agents.len(), self.options.half_update);
        let mut stats = TickStats::default();

        match self.options.mode {
            UpdateMode::Sequential => {
                for i in range.clone() {
                    let steering = self.agents[i].compute_force(&self.agents, i, &self.config)?;
                    let agent = &mut self.agents[i];
                    agent.set_steering_force(steering.force);
                    let frame = agent.apply_update(dt, &self.config);
                    stats.record(&steering, &frame);
                }
            }
            UpdateMode::Synchronized => {
                let snapshot: Vec<AgentSnapshot> = self.agents.iter().map(Agent::snapshot).collect();
                let agents = &self.agents;
                let config = self.config.as_ref();
                let steerings = range
                    .clone()
                    .into_par_iter()
                    .map(|i| agents[i].compute_force(&snapshot, i, config))
                    .collect::<Result<Vec<_>, _>>()?;

                for (i, steering) in range.clone().zip(steerings) {
                    let agent = &mut self.agents[i];
                    agent.set_steering_force(steering.force);
                    let frame = agent.apply_update(dt, &self.config);
                    stats.record(&steering, &frame);
                }
            }
        }

        if self.options.half_update {
            self.phase = phase.next();
        }

        trace!(?range, processed = stats.processed, copied = stats.copied, "flock tick");

        Ok(TickReport {
            range,
            phase: self.options.half_update.then_some(phase),
            stats,
        })
    }

    /// Give every agent the same target and force strength.
    pub fn broadcast_target(&mut self, position: Vec3, strength: f32) -> Result<(), FlockError> {
        let target = Target::new(position, strength)?;
        for agent in &mut self.agents {
            agent.set_target(target);
        }
        debug!(?position, strength, "target broadcast");
        Ok(())
    }

    pub fn clear_target(&mut self) {
        for agent in &mut self.agents {
            agent.clear_target();
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent<M>] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent<M>> {
        self.agents.get(index)
    }

    pub fn agent_mut(&mut self, index: usize) -> Option<&mut Agent<M>> {
        self.agents.get_mut(index)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &M> {
        self.agents.iter().map(Agent::body)
    }

    /// Mutable access to every body, for the host's physics step.
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut M> {
        self.agents.iter_mut().map(Agent::body_mut)
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn options(&self) -> FlockOptions {
        self.options
    }

    pub fn config(&self) -> &Arc<FlockConfig> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::RigidBody;

    fn options(copy: bool, half: bool, mode: UpdateMode) -> FlockOptions {
        FlockOptions {
            copy_optimization: copy,
            neighbor_cap: false,
            half_update: half,
            mode,
        }
    }

    fn line_of_bodies(n: usize, spacing: f32) -> Vec<RigidBody> {
        (0..n)
            .map(|i| RigidBody::new(Vec3::new(i as f32 * spacing, 0.0, 0.0), Vec3::Z * 6.0))
            .collect()
    }

    #[test]
    fn half_update_ranges_split_at_floor_half() {
        assert_eq!(UpdatePhase::FirstHalf.active_range(7, true), 0..3);
        assert_eq!(UpdatePhase::SecondHalf.active_range(7, true), 3..7);
        assert_eq!(UpdatePhase::SecondHalf.active_range(7, false), 0..7);
        assert_eq!(UpdatePhase::FirstHalf.active_range(1, true), 0..0);
        assert_eq!(UpdatePhase::SecondHalf.active_range(1, true), 0..1);
    }

    #[test]
    fn phase_alternates_and_starts_with_first_half() {
        let config = Arc::new(FlockConfig::default());
        let mut flock = Flock::from_bodies(config, line_of_bodies(10, 3.0), options(false, true, UpdateMode::Sequential)).unwrap();
        assert_eq!(flock.phase(), UpdatePhase::FirstHalf);

        let first = flock.update(1.0 / 60.0).unwrap();
        assert_eq!(first.range, 0..5);
        assert_eq!(first.phase, Some(UpdatePhase::FirstHalf));
        let second = flock.update(1.0 / 60.0).unwrap();
        assert_eq!(second.range, 5..10);
        assert_eq!(second.phase, Some(UpdatePhase::SecondHalf));
        assert_eq!(flock.phase(), UpdatePhase::FirstHalf);
    }

    #[test]
    fn full_update_processes_everyone_each_tick() {
        let config = Arc::new(FlockConfig::default());
        let mut flock = Flock::from_bodies(config, line_of_bodies(6, 3.0), options(false, false, UpdateMode::Sequential)).unwrap();
        for _ in 0..3 {
            let report = flock.update(1.0 / 60.0).unwrap();
            assert_eq!(report.range, 0..6);
            assert_eq!(report.phase, None);
            assert_eq!(report.stats.processed, 6);
        }
    }

    #[test]
    fn flocks_keep_independent_phases() {
        let config = Arc::new(FlockConfig::default());
        let opts = options(false, true, UpdateMode::Sequential);
        let mut a = Flock::from_bodies(config.clone(), line_of_bodies(4, 3.0), opts).unwrap();
        let mut b = Flock::from_bodies(config, line_of_bodies(4, 3.0), opts).unwrap();

        a.update(0.1).unwrap();
        assert_eq!(a.phase(), UpdatePhase::SecondHalf);
        assert_eq!(b.phase(), UpdatePhase::FirstHalf);
        assert_eq!(b.update(0.1).unwrap().range, 0..2);
    }

    #[test]
    fn sequential_mode_exposes_this_tick_state_to_higher_indices() {
        let config = Arc::new(FlockConfig::default());
        let bodies = vec![
            RigidBody::new(Vec3::ZERO, Vec3::X * 6.0),
            RigidBody::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X * 6.0),
        ];
        let mut flock = Flock::from_bodies(config, bodies, options(true, false, UpdateMode::Sequential)).unwrap();
        let old_zero = Vec3::new(1.0, 0.0, 0.0);
        let old_one = Vec3::new(0.0, 2.0, 0.0);
        flock.agent_mut(0).unwrap().set_steering_force(old_zero);
        flock.agent_mut(1).unwrap().set_steering_force(old_one);

        let report = flock.update(1.0 / 60.0).unwrap();
        assert_eq!(report.stats.copied, 2);
        // Agent 0 copies agent 1's previous force, agent 1 then copies that new value
        assert_eq!(flock.agents()[0].steering_force(), old_one);
        assert_eq!(flock.agents()[1].steering_force(), old_one);
    }

    #[test]
    fn synchronized_mode_reads_only_the_snapshot() {
        let config = Arc::new(FlockConfig::default());
        let bodies = vec![
            RigidBody::new(Vec3::ZERO, Vec3::X * 6.0),
            RigidBody::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X * 6.0),
        ];
        let mut flock = Flock::from_bodies(config, bodies, options(true, false, UpdateMode::Synchronized)).unwrap();
        let old_zero = Vec3::new(1.0, 0.0, 0.0);
        let old_one = Vec3::new(0.0, 2.0, 0.0);
        flock.agent_mut(0).unwrap().set_steering_force(old_zero);
        flock.agent_mut(1).unwrap().set_steering_force(old_one);

        flock.update(1.0 / 60.0).unwrap();
        assert_eq!(flock.agents()[0].steering_force(), old_one);
        assert_eq!(flock.agents()[1].steering_force(), old_zero);
    }

    #[test]
    fn synchronized_matches_sequential_without_interaction_shortcuts() {
        // Agents far apart do not influence each other, so both modes agree
        let config = Arc::new(FlockConfig::default());
        let mut sequential = Flock::from_bodies(config.clone(), line_of_bodies(5, 100.0), options(false, false, UpdateMode::Sequential)).unwrap();
        let mut synchronized = Flock::from_bodies(config, line_of_bodies(5, 100.0), options(false, false, UpdateMode::Synchronized)).unwrap();
        sequential.update(0.1).unwrap();
        synchronized.update(0.1).unwrap();
        for (a, b) in sequential.agents().iter().zip(synchronized.agents()) {
            assert_eq!(a.steering_force(), b.steering_force());
            assert_eq!(a.body(), b.body());
        }
    }

    #[test]
    fn broadcast_sets_every_target_and_rejects_zero_strength() {
        let config = Arc::new(FlockConfig::default());
        let mut flock = Flock::from_bodies(config, line_of_bodies(3, 3.0), options(false, false, UpdateMode::Sequential)).unwrap();
        flock.broadcast_target(Vec3::new(10.0, 0.0, 5.0), 4.0).unwrap();
        for agent in flock.agents() {
            assert_eq!(agent.target(), Some(Target { position: Vec3::new(10.0, 0.0, 5.0), strength: 4.0 }));
        }

        let err = flock.broadcast_target(Vec3::ZERO, 0.0).unwrap_err();
        assert!(matches!(err, FlockError::InvalidForceStrength(_)));

        flock.clear_target();
        assert!(flock.agents().iter().all(|agent| agent.target().is_none()));
    }

    #[test]
    fn initialize_places_agents_at_sampled_positions() {
        let config = Arc::new(FlockConfig::default());
        let mut next = 0.0;
        let flock: Flock<RigidBody> = Flock::initialize(
            config,
            12,
            || {
                next += 1.0;
                Vec3::splat(next)
            },
            FlockOptions::default(),
        )
        .unwrap();

        assert_eq!(flock.len(), 12);
        assert_eq!(flock.agents()[0].body().position(), Vec3::ONE);
        assert_eq!(flock.agents()[11].body().position(), Vec3::splat(12.0));
        assert!(flock.agents().iter().all(|agent| agent.population_size() == 12));
        assert_eq!(flock.agents()[3].options().neighbor_cap, 10);
    }

    #[test]
    fn rejects_cap_larger_than_population() {
        let config = Arc::new(FlockConfig::default());
        let result = Flock::from_bodies(config, line_of_bodies(4, 3.0), FlockOptions::default());
        assert!(matches!(
            result,
            Err(FlockError::NeighborCapExceedsPopulation { cap: 10, population: 4 })
        ));
    }

    #[test]
    fn empty_flock_updates_as_a_no_op() {
        let config = Arc::new(FlockConfig::default());
        let mut flock: Flock<RigidBody> = Flock::from_bodies(config, Vec::new(), options(true, true, UpdateMode::Sequential)).unwrap();
        let report = flock.update(0.1).unwrap();
        assert_eq!(report.range, 0..0);
        assert_eq!(report.stats, TickStats::default());
    }
}
