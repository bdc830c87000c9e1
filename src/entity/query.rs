use std::any::TypeId;
use std::cell::{Ref, RefMut};

use crate::entity::component_manager::{ComponentMask, World};
use crate::entity::component_storage::*;
use crate::entity::handle::*;
use crate::error::Result;

/// A tuple of component types that a view or presence check requires.
pub trait ComponentQuery {
    fn type_ids() -> Vec<TypeId>;

    fn mask(world: &World) -> Result<ComponentMask>;
}

macro_rules! impl_component_query {
    ( () ) => {};
    ( ( $t0:ident $(, $types:ident)* ) ) => {
        impl<$t0: Component, $($types: Component,)*> ComponentQuery for ($t0, $($types,)*) {
            fn type_ids() -> Vec<TypeId> {
                vec![TypeId::of::<$t0>() $(, TypeId::of::<$types>())*]
            }

            fn mask(world: &World) -> Result<ComponentMask> {
                Ok(world.component_bit::<$t0>()? $(| world.component_bit::<$types>()?)*)
            }
        }

        // Recurse for one smaller size:
        impl_component_query! { ($($types),*) }
    };
}

impl_component_query! {
    (A, B, C, D, E, F, G, H)
}

/// Handles matched by a view, captured when the view was built.
///
/// The view borrows the world, so nothing can be created or destroyed while it is walked.
/// Structural changes issued during the walk go through a [`CommandBuffer`](crate::entity::CommandBuffer).
#[derive(Clone)]
pub struct View<'w> {
    world: &'w World,
    handles: std::vec::IntoIter<EntityHandle>,
}

impl<'w> View<'w> {
    pub(crate) fn new(world: &'w World, handles: Vec<EntityHandle>) -> Self {
        Self{
            world,
            handles: handles.into_iter(),
        }
    }
}

impl<'w> Iterator for View<'w> {
    type Item = EntityHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let world = self.world;
        self.handles.find(|entity| world.is_valid(*entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.handles.size_hint().1)
    }
}

/// Shared borrow of one component store. Data access only.
pub struct StoreRef<'w, T: Component> {
    inner: Ref<'w, T::Storage>,
}

impl<'w, T: Component> StoreRef<'w, T> {
    pub(crate) fn new(inner: Ref<'w, T::Storage>) -> Self {
        Self{inner}
    }

    pub fn get(&self, index: EntityIndex) -> Option<&T> {
        self.inner.get(index)
    }

    pub fn fetch(&self, index: EntityIndex) -> Result<&T> {
        self.inner.fetch(index)
    }

    pub fn has(&self, index: EntityIndex) -> bool {
        self.inner.has(index)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.inner.iter_entity()
    }
}

/// Exclusive borrow of one component store. Values can change, membership can not.
pub struct StoreMut<'w, T: Component> {
    inner: RefMut<'w, T::Storage>,
}

impl<'w, T: Component> StoreMut<'w, T> {
    pub(crate) fn new(inner: RefMut<'w, T::Storage>) -> Self {
        Self{inner}
    }

    pub fn get(&self, index: EntityIndex) -> Option<&T> {
        self.inner.get(index)
    }

    pub fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        self.inner.get_mut(index)
    }

    pub fn fetch_mut(&mut self, index: EntityIndex) -> Result<&mut T> {
        self.inner.fetch_mut(index)
    }

    pub fn has(&self, index: EntityIndex) -> bool {
        self.inner.has(index)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.inner.iter_entity()
    }

    pub fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.inner.iter_entity_mut()
    }
}
