use std::time::{Duration, Instant};

use super::*;
use crate::error::EcsError;

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1 for the first tick.
    pub tick: u64,
    pub collision_pairs: usize,
    pub script_calls: usize,
    pub failures: Vec<ScriptFailure>,
    /// Deferred commands that could not be applied, e.g. destroying the same entity twice.
    pub command_failures: Vec<EcsError>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.command_failures.is_empty()
    }
}

impl FrameDriver {
    /// Runs one tick. Phases never overlap: physics, collision index, scripts, command flush.
    pub fn tick(&mut self) -> TickReport {
        profiling::scope!("FrameDriver::tick");
        self.tick += 1;
        let delta_time = self.config.delta_time_secs();

        let pairs = {
            profiling::scope!("physics");
            match self.physics.as_mut() {
                Some(physics) => physics.step(&mut self.world, delta_time),
                None => Vec::new(),
            }
        };
        self.collisions.rebuild(pairs);

        let mut failures = Vec::new();
        let mut script_calls = 0;
        {
            profiling::scope!("scripts");
            let mut frame = FrameContext{
                world: &self.world,
                collisions: &self.collisions,
                commands: &mut self.commands,
                delta_time,
                tick: self.tick,
            };
            for script in self.scripts.iter_mut() {
                script_calls += script.run(&mut frame, &mut failures);
            }
        }

        let command_failures = self.world.flush_commands(&mut self.commands);

        let report = TickReport{
            tick: self.tick,
            collision_pairs: self.collisions.pair_count(),
            script_calls,
            failures,
            command_failures,
        };
        log::trace!(
            "tick {}: {} collision pairs, {} script calls, {} failures",
            report.tick,
            report.collision_pairs,
            report.script_calls,
            report.failures.len() + report.command_failures.len()
        );
        report
    }

    /// Runs `ticks` ticks back to back, sleeping out each tick's remaining `fixed_delta_time` when pacing is on.
    pub fn run_fixed(&mut self, ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        self.last_tick_end = Instant::now();
        for _ in 0..ticks {
            reports.push(self.tick());
            if self.config.pace_ticks {
                self.pace();
            }
            profiling::finish_frame!();
            self.last_tick_end = Instant::now();
        }
        reports
    }

    fn pace(&self) {
        profiling::scope!("pace");
        let step = self.config.fixed_delta_time;
        let taken = self.last_tick_end.elapsed().clamp(Duration::ZERO, step);
        spin_sleep::sleep(step - taken);
    }
}
