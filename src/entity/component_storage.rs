use std::any::*;

use crate::entity::handle::*;
use crate::error::{EcsError, Result};

mod dense_store;
pub use dense_store::*;

mod linear_store;
pub use linear_store::*;

mod lookup_store;
pub use lookup_store::*;

mod hash_store;
pub use hash_store::*;

/// The index -> value mapping a store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageStrategy {
    /// One optional slot per entity index. For components nearly every entity has.
    DirectIndexing,
    /// Packed values plus an index -> dense slot table.
    SparseSet,
    /// Sorted `(index, value)` array, binary searched.
    LookupTable,
    /// Hash map from index to value.
    Hashing,
}

/// Type-erased half of a component store, usable without knowing the component type.
pub trait GenericComponentStore {
    fn optimize(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn has(&self, index: EntityIndex) -> bool;

    /// Removes the value at `index`, returns false when there was none.
    fn rem(&mut self, index: EntityIndex) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn indices(&self) -> Box<dyn Iterator<Item = EntityIndex> + '_>;
}

pub trait ComponentStore<T: 'static> : GenericComponentStore + Sized {
    const STRATEGY: StorageStrategy;

    fn new() -> Self;

    fn get(&self, index: EntityIndex) -> Option<&T>;

    fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T>;

    /// Inserts or overwrites. Returns whether a value was already present.
    fn add(&mut self, index: EntityIndex, value: T) -> bool;

    fn take(&mut self, index: EntityIndex) -> Option<T>;

    /// Live entries. The store can not change structurally while this borrow is held.
    fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)>;

    fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)>;

    fn fetch(&self, index: EntityIndex) -> Result<&T> {
        self.get(index).ok_or(EcsError::MissingComponent{index, component: type_name::<T>()})
    }

    fn fetch_mut(&mut self, index: EntityIndex) -> Result<&mut T> {
        self.get_mut(index).ok_or(EcsError::MissingComponent{index, component: type_name::<T>()})
    }
}

/// A component type and the store backing it.
///
/// Usually implemented through [`component_table!`](crate::component_table).
pub trait Component : Sized + 'static
{
    type Storage : ComponentStore<Self> + 'static;
}

/**
 * Declares which store backs each component type and generates a function registering the whole table.
 * syntax:  (visibility fn register_fn_name; ComponentType => StoreType, ...)
 */
#[macro_export]
macro_rules! component_table {
    ($vis:vis fn $register:ident; $($component:ty => $store:ident),+ $(,)?) => {
        $(
            impl $crate::entity::Component for $component {
                type Storage = $crate::entity::$store<$component>;
            }
        )+

        $vis fn $register(world: &mut $crate::entity::World) -> $crate::error::Result<()> {
            $(world.register_component::<$component>()?;)+
            Ok(())
        }
    };
}
