use std::marker::PhantomData;

use crate::collision::CollisionIndex;
use crate::entity::{CommandBuffer, Component, EntityHandle, World};
use crate::error::{EcsError, Result};

/// Everything a script may touch besides its own component.
///
/// Structural changes go through `commands`; they are applied after every script has run.
pub struct FrameContext<'f> {
    pub world: &'f World,
    pub collisions: &'f CollisionIndex,
    pub commands: &'f mut CommandBuffer,
    /// Seconds simulated by this tick.
    pub delta_time: f32,
    pub tick: u64,
}

/// A script invocation that returned an error. The tick carries on without it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptFailure {
    pub script: String,
    /// None when the script could not start at all (e.g. unregistered component).
    pub entity: Option<EntityHandle>,
    pub error: EcsError,
}

pub(crate) trait Script {
    fn name(&self) -> &str;

    /// Runs once per spawned entity carrying the script's component. Returns the number of calls made.
    fn run(&mut self, frame: &mut FrameContext<'_>, failures: &mut Vec<ScriptFailure>) -> usize;
}

pub(crate) struct ComponentScript<T, F> {
    name: String,
    func: F,
    _component: PhantomData<fn(&mut T)>,
}

impl<T, F> ComponentScript<T, F> {
    pub(crate) fn new(name: String, func: F) -> Self {
        Self{
            name,
            func,
            _component: PhantomData,
        }
    }

    fn fail(&self, entity: Option<EntityHandle>, error: EcsError, failures: &mut Vec<ScriptFailure>) {
        log::warn!("script {} failed on {:?}: {}", self.name, entity, error);
        failures.push(ScriptFailure{
            script: self.name.clone(),
            entity,
            error,
        });
    }
}

impl<T, F> Script for ComponentScript<T, F>
where
    T: Component,
    F: FnMut(EntityHandle, &mut T, &mut FrameContext<'_>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, frame: &mut FrameContext<'_>, failures: &mut Vec<ScriptFailure>) -> usize {
        profiling::scope!("script", self.name.as_str());
        // copied out so the view and the guards borrow the world, not `frame`
        let world = frame.world;
        let view = match world.spawned_view::<(T,)>() {
            Ok(view) => view,
            Err(error) => {
                self.fail(None, error, failures);
                return 0;
            }
        };

        let mut calls = 0;
        for entity in view {
            let mut value = match world.get_comp_mut::<T>(entity) {
                Ok(value) => value,
                Err(error) => {
                    self.fail(Some(entity), error, failures);
                    continue;
                }
            };
            calls += 1;
            if let Err(error) = (self.func)(entity, &mut *value, frame) {
                self.fail(Some(entity), error, failures);
            }
        }
        calls
    }
}
