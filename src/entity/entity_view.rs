use std::cell::{Ref, RefMut};

use crate::entity::component_manager::World;
use crate::entity::component_storage::Component;
use crate::entity::handle::EntityHandle;
use crate::error::Result;

/// Cursor over a single entity's components.
///
/// Holds the world exclusively, so the entity can not be destroyed out from under it.
pub struct EntityView<'w> {
    world: &'w mut World,
    handle: EntityHandle,
}

impl<'w> EntityView<'w> {
    pub(crate) fn new(world: &'w mut World, handle: EntityHandle) -> Self {
        Self{world, handle}
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn is_spawned(&self) -> bool {
        self.world.is_spawned(self.handle.index)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.world.has_comps::<(T,)>(self.handle.index)
    }

    pub fn get<T: Component>(&self) -> Result<Ref<'_, T>> {
        self.world.get_comp::<T>(self.handle)
    }

    pub fn get_mut<T: Component>(&self) -> Result<RefMut<'_, T>> {
        self.world.get_comp_mut::<T>(self.handle)
    }

    pub fn add<T: Component>(&mut self, value: T) -> Result<bool> {
        self.world.add_comp(self.handle, value)
    }

    /// Builder form of [`EntityView::add`].
    pub fn with<T: Component>(mut self, value: T) -> Result<Self> {
        self.add(value)?;
        Ok(self)
    }

    pub fn remove<T: Component>(&mut self) -> Result<bool> {
        self.world.rem_comp::<T>(self.handle)
    }

    pub fn spawn(&mut self) -> Result<()> {
        self.world.spawn(self.handle)
    }

    pub fn despawn(&mut self) -> Result<()> {
        self.world.despawn(self.handle)
    }
}
