mod script;
mod ticks;

use std::time::Instant;

pub use script::{FrameContext, ScriptFailure};
pub use ticks::TickReport;
use script::{ComponentScript, Script};

use crate::collision::{CollisionIndex, CollisionInfo};
use crate::config::DriverConfig;
use crate::entity::{CommandBuffer, Component, EntityHandle, World};
use crate::error::Result;

//o------------ Physics ---------------o

/// Moves the world forward by `delta_time` seconds and reports what collided.
pub trait PhysicsStep {
    fn step(&mut self, world: &mut World, delta_time: f32) -> Vec<CollisionInfo>;
}

impl<F> PhysicsStep for F
where
    F: FnMut(&mut World, f32) -> Vec<CollisionInfo>,
{
    fn step(&mut self, world: &mut World, delta_time: f32) -> Vec<CollisionInfo> {
        self(world, delta_time)
    }
}

//o------------ Driver ---------------o

/// Owns a world and runs it tick by tick: physics, collision index, scripts, deferred commands.
pub struct FrameDriver {
    world: World,
    collisions: CollisionIndex,
    commands: CommandBuffer,
    physics: Option<Box<dyn PhysicsStep>>,
    scripts: Vec<Box<dyn Script>>,
    config: DriverConfig,
    tick: u64,
    last_tick_end: Instant,
}

impl FrameDriver {
    pub fn new(world: World, config: DriverConfig) -> Self {
        if config.init_logger {
            // a host that already installed a logger keeps it
            let _ = env_logger::try_init();
        }
        Self{
            world,
            collisions: CollisionIndex::new(),
            commands: CommandBuffer::new(),
            physics: None,
            scripts: Vec::new(),
            config,
            tick: 0,
            last_tick_end: Instant::now(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access between ticks, e.g. to set up the level.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// The index built by the last tick.
    pub fn collisions(&self) -> &CollisionIndex {
        &self.collisions
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn set_physics<P: PhysicsStep + 'static>(&mut self, physics: P) {
        self.physics = Some(Box::new(physics));
    }

    /// Registers a script run once per tick for every spawned entity carrying `T`, in view order.
    /// Scripts run in the order they were added.
    pub fn add_script<T, F>(&mut self, name: impl Into<String>, script: F)
    where
        T: Component,
        F: FnMut(EntityHandle, &mut T, &mut FrameContext<'_>) -> Result<()> + 'static,
    {
        let script = ComponentScript::<T, F>::new(name.into(), script);
        log::debug!("added script {}", script.name());
        self.scripts.push(Box::new(script));
    }

    pub fn script_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scripts.iter().map(|script| script.name())
    }
}
