/*
 * Debug Information Module
 *
 * Running counters about the simulation, shown by the viewer and logged by
 * the headless runner.
 */

use std::time::Duration;

use crate::flock::TickStats;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    /// Fixed steps run since the simulation started.
    pub ticks: u64,
    pub physics_updates_per_frame: usize,
    /// Counters of the most recent fixed step.
    pub last_tick: TickStats,
    /// Counters accumulated over every step.
    pub totals: TickStats,
    pub mean_speed: f32,
}

impl DebugInfo {
    pub fn record_frame(&mut self, frame_time: Duration, physics_updates: usize) {
        self.frame_time = frame_time;
        self.physics_updates_per_frame = physics_updates;
        let seconds = frame_time.as_secs_f32();
        if seconds > 0.0 {
            self.fps = 1.0 / seconds;
        }
    }

    pub fn record_tick(&mut self, stats: TickStats, mean_speed: f32) {
        self.ticks += 1;
        self.last_tick = stats;
        self.totals.absorb(&stats);
        self.mean_speed = mean_speed;
    }

    /// Share of processed agents that adopted a neighbour's force.
    pub fn copy_ratio(&self) -> f32 {
        if self.totals.processed == 0 {
            return 0.0;
        }
        self.totals.copied as f32 / self.totals.processed as f32
    }
}
