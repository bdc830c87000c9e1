use crate::entity::component_manager::World;
use crate::entity::component_storage::Component;
use crate::entity::entity_view::EntityView;
use crate::entity::handle::EntityHandle;
use crate::error::{EcsError, Result};

type DeferredFn = Box<dyn FnOnce(&mut World) -> Result<()>>;

/// A structural change recorded during a pass and applied afterwards.
pub enum Command {
    Spawn(EntityHandle),
    Despawn(EntityHandle),
    Destroy(EntityHandle),
    Deferred(DeferredFn),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Spawn(entity) => f.debug_tuple("Spawn").field(entity).finish(),
            Command::Despawn(entity) => f.debug_tuple("Despawn").field(entity).finish(),
            Command::Destroy(entity) => f.debug_tuple("Destroy").field(entity).finish(),
            Command::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Queue of structural changes issued while a view or store is being walked.
///
/// Nothing touches the world until [`World::flush_commands`] runs, strictly after the pass.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn spawn(&mut self, entity: EntityHandle) {
        self.push(Command::Spawn(entity));
    }

    pub fn despawn(&mut self, entity: EntityHandle) {
        self.push(Command::Despawn(entity));
    }

    pub fn destroy(&mut self, entity: EntityHandle) {
        self.push(Command::Destroy(entity));
    }

    pub fn add<T: Component>(&mut self, entity: EntityHandle, value: T) {
        self.push(Command::Deferred(Box::new(move |world: &mut World| world.add_comp(entity, value).map(drop))));
    }

    pub fn remove<T: Component>(&mut self, entity: EntityHandle) {
        self.push(Command::Deferred(Box::new(move |world: &mut World| world.rem_comp::<T>(entity).map(drop))));
    }

    /// Creates an entity at flush time and hands it to `build`.
    /// If `build` fails the half-built entity is destroyed again.
    pub fn create<F>(&mut self, build: F)
    where
        F: FnOnce(EntityView<'_>) -> Result<()> + 'static,
    {
        self.push(Command::Deferred(Box::new(move |world: &mut World| {
            let entity = world.create()?;
            if let Err(error) = build(world.entity(entity)?) {
                world.destroy(entity)?;
                return Err(error);
            }
            Ok(())
        })));
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl World {
    /// Applies and empties `buffer` in queue order. Every failing command is reported; the rest still apply.
    pub fn flush_commands(&mut self, buffer: &mut CommandBuffer) -> Vec<EcsError> {
        profiling::scope!("World::flush_commands");
        let mut failures = Vec::new();
        for command in buffer.commands.drain(..) {
            let result = match command {
                Command::Spawn(entity) => self.spawn(entity),
                Command::Despawn(entity) => self.despawn(entity),
                Command::Destroy(entity) => self.destroy(entity),
                Command::Deferred(apply) => apply(self),
            };
            if let Err(error) = result {
                log::debug!("deferred command failed: {}", error);
                failures.push(error);
            }
        }
        failures
    }
}
