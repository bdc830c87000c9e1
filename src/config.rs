use std::time::Duration;

use crate::entity::handle::EntityIndex;

/// Settings for a [`World`](crate::entity::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    /// Upper bound on the number of entity slots. Creating past it fails with `AllocationExhausted`.
    pub max_entities: EntityIndex,
    /// Slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self{
            max_entities: EntityIndex::MAX,
            initial_capacity: 0,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn with_max_entities(mut self, max_entities: EntityIndex) -> Self {
        self.max_entities = max_entities;
        self
    }

    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}

/// Settings for the [`FrameDriver`](crate::app::FrameDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Simulated time per tick, handed to scripts as `delta_time`.
    pub fixed_delta_time: Duration,
    /// Sleep out the rest of `fixed_delta_time` after each tick in `run_fixed`.
    pub pace_ticks: bool,
    /// Install `env_logger` when the driver is created.
    pub init_logger: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self{
            fixed_delta_time: Duration::from_nanos(33_000_000),
            pace_ticks: false,
            init_logger: true,
        }
    }
}

impl DriverConfig {
    #[must_use]
    pub fn with_fixed_delta_time(mut self, fixed_delta_time: Duration) -> Self {
        self.fixed_delta_time = fixed_delta_time;
        self
    }

    #[must_use]
    pub fn with_pacing(mut self, pace_ticks: bool) -> Self {
        self.pace_ticks = pace_ticks;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, init_logger: bool) -> Self {
        self.init_logger = init_logger;
        self
    }

    pub fn delta_time_secs(&self) -> f32 {
        self.fixed_delta_time.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_step() {
        let config = DriverConfig::default();
        assert_eq!(config.fixed_delta_time, Duration::from_millis(33));
        assert!((config.delta_time_secs() - 0.033).abs() < 1e-6);

        let world = WorldConfig::default().with_max_entities(4);
        assert_eq!(world.max_entities, 4);
    }
}
