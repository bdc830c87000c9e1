use std::any::*;
use std::cell::{Ref, RefCell, RefMut};

use rustc_hash::FxHashMap;

use crate::config::WorldConfig;
use crate::entity::component_storage::*;
use crate::entity::entity_manager::*;
use crate::entity::entity_view::EntityView;
use crate::entity::handle::*;
use crate::entity::query::{ComponentQuery, StoreMut, StoreRef, View};
use crate::error::{EcsError, Result};

/// One bit per registered component type, per entity slot.
pub type ComponentMask = u64;

pub const MAX_COMPONENT_TYPES: usize = ComponentMask::BITS as usize;

pub(crate) trait ComponentStoreAccessor {
    fn exec(&mut self, f: &mut dyn FnMut(&mut dyn GenericComponentStore));

    /// Appends the store's indices to `out`. Returns false when the store is mutably borrowed.
    fn collect_indices(&self, out: &mut Vec<EntityIndex>) -> bool;

    fn as_any_ref(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: GenericComponentStore + 'static> ComponentStoreAccessor for RefCell<S> {
    fn exec(&mut self, f: &mut dyn FnMut(&mut dyn GenericComponentStore)) {
        f(self.get_mut());
    }

    fn collect_indices(&self, out: &mut Vec<EntityIndex>) -> bool {
        match self.try_borrow() {
            Ok(store) => {
                out.extend(store.indices());
                true
            }
            Err(_) => false,
        }
    }

    fn as_any_ref(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct StoreEntry {
    name: &'static str,
    strategy: StorageStrategy,
    bit: ComponentMask,
    len: usize,
    accessor: Box<dyn ComponentStoreAccessor>,
}

/// The registry: entity handles plus one store per registered component type.
///
/// Component data sits behind a `RefCell` per store, so it can be read and written through
/// `&World` while structural changes (create, destroy, add, remove) need `&mut World` and
/// therefore can not happen while a store or view borrow is alive.
pub struct World {
    entities: EntityManager,
    stores: FxHashMap<TypeId, StoreEntry>,
    masks: Vec<ComponentMask>,
}

impl Default for World {
    fn default() -> Self {
        Self::with_config(WorldConfig::default())
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self{
            entities: EntityManager::with_config(&config),
            stores: FxHashMap::default(),
            masks: Vec::with_capacity(config.initial_capacity),
        }
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    //o------------ Component registration ---------------o

    pub fn register_component<T: Component>(&mut self) -> Result<()> {
        let type_id = TypeId::of::<T>();
        let name = type_name::<T>();
        if self.stores.contains_key(&type_id) {
            return Err(EcsError::DuplicateComponent(name));
        }
        if self.stores.len() >= MAX_COMPONENT_TYPES {
            return Err(EcsError::AllocationExhausted{resource: "component types", capacity: MAX_COMPONENT_TYPES});
        }
        let strategy = <T::Storage as ComponentStore<T>>::STRATEGY;
        let bit = 1 << self.stores.len();
        self.stores.insert(type_id, StoreEntry{
            name,
            strategy,
            bit,
            len: 0,
            accessor: Box::new(RefCell::new(<T::Storage as ComponentStore<T>>::new())),
        });
        log::debug!("registered component {} with {:?} storage", name, strategy);
        Ok(())
    }

    pub fn is_registered<T: Component>(&self) -> bool {
        self.stores.contains_key(&TypeId::of::<T>())
    }

    pub fn storage_strategy<T: Component>(&self) -> Option<StorageStrategy> {
        self.stores.get(&TypeId::of::<T>()).map(|entry| entry.strategy)
    }

    /// Registered `(component, strategy)` pairs in registration order.
    pub fn component_table(&self) -> Vec<(&'static str, StorageStrategy)> {
        let mut table: Vec<_> = self.stores.values().map(|entry| (entry.bit, entry.name, entry.strategy)).collect();
        table.sort_unstable_by_key(|(bit, _, _)| *bit);
        table.into_iter().map(|(_, name, strategy)| (name, strategy)).collect()
    }

    /// Number of entities carrying `T`.
    pub fn component_count<T: Component>(&self) -> usize {
        self.stores.get(&TypeId::of::<T>()).map_or(0, |entry| entry.len)
    }

    //o------------ Entity lifecycle ---------------o

    pub fn create(&mut self) -> Result<EntityHandle> {
        let entity = self.entities.create()?;
        let index = entity.index as usize;
        if index >= self.masks.len() {
            self.masks.resize(index + 1, 0);
        }
        debug_assert_eq!(self.masks[index], 0, "fresh slot still carries components");
        Ok(entity)
    }

    /// Strips every component of the entity, then frees its slot.
    pub fn destroy(&mut self, entity: EntityHandle) -> Result<()> {
        self.entities.check(entity)?;
        let index = entity.index;
        let mask = self.mask_of(index);
        for entry in self.stores.values_mut() {
            if mask & entry.bit == 0 {
                continue;
            }
            let mut removed = false;
            entry.accessor.exec(&mut |store: &mut dyn GenericComponentStore| removed = store.rem(index));
            debug_assert!(removed, "presence mask of {} out of sync", entry.name);
            if removed {
                entry.len -= 1;
            }
        }
        self.masks[index as usize] = 0;
        self.entities.destroy(entity)
    }

    pub fn spawn(&mut self, entity: EntityHandle) -> Result<()> {
        self.entities.spawn(entity)
    }

    pub fn despawn(&mut self, entity: EntityHandle) -> Result<()> {
        self.entities.despawn(entity)
    }

    pub fn is_valid(&self, entity: EntityHandle) -> bool {
        self.entities.is_valid(entity)
    }

    pub fn is_alive(&self, index: EntityIndex) -> bool {
        self.entities.is_alive(index)
    }

    pub fn is_spawned(&self, index: EntityIndex) -> bool {
        self.entities.is_spawned(index)
    }

    pub fn handle_at(&self, index: EntityIndex) -> Option<EntityHandle> {
        self.entities.handle_at(index)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Cursor bound to a single entity.
    pub fn entity(&mut self, entity: EntityHandle) -> Result<EntityView<'_>> {
        self.entities.check(entity)?;
        Ok(EntityView::new(self, entity))
    }

    //o------------ Components ---------------o

    /// Inserts or overwrites. Returns whether the entity already had a `T`.
    pub fn add_comp<T: Component>(&mut self, entity: EntityHandle, value: T) -> Result<bool> {
        self.entities.check(entity)?;
        let entry = self.stores.get_mut(&TypeId::of::<T>()).ok_or(EcsError::UnregisteredComponent(type_name::<T>()))?;
        let replaced = typed_store_mut::<T>(&mut *entry.accessor)?.add(entity.index, value);
        if !replaced {
            entry.len += 1;
        }
        self.masks[entity.index as usize] |= entry.bit;
        Ok(replaced)
    }

    /// Returns false, not an error, when the entity had no `T`.
    pub fn rem_comp<T: Component>(&mut self, entity: EntityHandle) -> Result<bool> {
        self.entities.check(entity)?;
        let entry = self.stores.get_mut(&TypeId::of::<T>()).ok_or(EcsError::UnregisteredComponent(type_name::<T>()))?;
        let removed = typed_store_mut::<T>(&mut *entry.accessor)?.rem(entity.index);
        if removed {
            entry.len -= 1;
            self.masks[entity.index as usize] &= !entry.bit;
        }
        Ok(removed)
    }

    pub fn has_comp<T: Component>(&self, entity: EntityHandle) -> Result<bool> {
        self.entities.check(entity)?;
        let bit = self.component_bit::<T>()?;
        Ok(self.mask_of(entity.index) & bit != 0)
    }

    pub fn get_comp<T: Component>(&self, entity: EntityHandle) -> Result<Ref<'_, T>> {
        self.check_present::<T>(entity)?;
        let store = self.cell::<T>()?.try_borrow().map_err(|_| EcsError::StoreBorrowed(type_name::<T>()))?;
        Ref::filter_map(store, |store| store.get(entity.index)).map_err(|_| missing::<T>(entity.index))
    }

    pub fn get_comp_mut<T: Component>(&self, entity: EntityHandle) -> Result<RefMut<'_, T>> {
        self.check_present::<T>(entity)?;
        let store = self.cell::<T>()?.try_borrow_mut().map_err(|_| EcsError::StoreBorrowed(type_name::<T>()))?;
        RefMut::filter_map(store, |store| store.get_mut(entity.index)).map_err(|_| missing::<T>(entity.index))
    }

    /// True iff the live entity at `index` carries every component of `Q`.
    pub fn has_comps<Q: ComponentQuery>(&self, index: EntityIndex) -> bool {
        match Q::mask(self) {
            Ok(mask) => self.entities.is_alive(index) && self.mask_of(index) & mask == mask,
            Err(_) => false,
        }
    }

    pub fn hasnt_comp<T: Component>(&self, index: EntityIndex) -> bool {
        !self.has_comps::<(T,)>(index)
    }

    //o------------ Queries ---------------o

    /// Snapshot of the live entities carrying every component of `Q`.
    pub fn view<Q: ComponentQuery>(&self) -> Result<View<'_>> {
        self.collect_view::<Q>(false)
    }

    /// Like [`World::view`], restricted to spawned entities.
    pub fn spawned_view<Q: ComponentQuery>(&self) -> Result<View<'_>> {
        self.collect_view::<Q>(true)
    }

    pub fn store<T: Component>(&self) -> Result<StoreRef<'_, T>> {
        let store = self.cell::<T>()?.try_borrow().map_err(|_| EcsError::StoreBorrowed(type_name::<T>()))?;
        Ok(StoreRef::new(store))
    }

    pub fn store_mut<T: Component>(&self) -> Result<StoreMut<'_, T>> {
        let store = self.cell::<T>()?.try_borrow_mut().map_err(|_| EcsError::StoreBorrowed(type_name::<T>()))?;
        Ok(StoreMut::new(store))
    }

    /// Compacts every store.
    pub fn optimize(&mut self) {
        for entry in self.stores.values_mut() {
            entry.accessor.exec(&mut |store: &mut dyn GenericComponentStore| store.optimize());
        }
    }

    pub(crate) fn component_bit<T: Component>(&self) -> Result<ComponentMask> {
        self.stores
            .get(&TypeId::of::<T>())
            .map(|entry| entry.bit)
            .ok_or(EcsError::UnregisteredComponent(type_name::<T>()))
    }

    fn collect_view<Q: ComponentQuery>(&self, spawned_only: bool) -> Result<View<'_>> {
        profiling::scope!("World::view");
        let mask = Q::mask(self)?;

        // drive from the smallest store, fall back to scanning masks if it is mutably borrowed
        let driver = Q::type_ids()
            .into_iter()
            .filter_map(|type_id| self.stores.get(&type_id))
            .min_by_key(|entry| entry.len);
        let mut indices = Vec::new();
        let driven = driver.map_or(false, |entry| entry.accessor.collect_indices(&mut indices));
        if !driven {
            log::trace!("view falls back to a mask scan");
            indices = (0..self.masks.len() as EntityIndex).collect();
        }

        let handles = indices
            .into_iter()
            .filter(|index| self.mask_of(*index) & mask == mask)
            .filter(|index| !spawned_only || self.entities.is_spawned(*index))
            .filter_map(|index| self.entities.handle_at(index))
            .collect();
        Ok(View::new(self, handles))
    }

    fn mask_of(&self, index: EntityIndex) -> ComponentMask {
        self.masks.get(index as usize).copied().unwrap_or(0)
    }

    fn check_present<T: Component>(&self, entity: EntityHandle) -> Result<()> {
        self.entities.check(entity)?;
        if self.mask_of(entity.index) & self.component_bit::<T>()? == 0 {
            return Err(missing::<T>(entity.index));
        }
        Ok(())
    }

    fn cell<T: Component>(&self) -> Result<&RefCell<T::Storage>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.accessor.as_any_ref().downcast_ref::<RefCell<T::Storage>>())
            .ok_or(EcsError::UnregisteredComponent(type_name::<T>()))
    }
}

fn typed_store_mut<'a, T: Component>(accessor: &'a mut (dyn ComponentStoreAccessor + 'static)) -> Result<&'a mut T::Storage> {
    accessor
        .as_any_mut()
        .downcast_mut::<RefCell<T::Storage>>()
        .map(RefCell::get_mut)
        .ok_or(EcsError::UnregisteredComponent(type_name::<T>()))
}

fn missing<T>(index: EntityIndex) -> EcsError {
    EcsError::MissingComponent{index, component: type_name::<T>()}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct A(u32);
    #[derive(Debug, Clone, PartialEq)]
    struct B(u32);
    #[derive(Debug, Clone, PartialEq)]
    struct C;

    crate::component_table! {
        fn register_test_components;
        A => LinearStore,
        B => HashStore,
        C => DenseStore,
    }

    fn world() -> World {
        let mut world = World::new();
        register_test_components(&mut world).unwrap();
        world
    }

    #[test]
    fn add_get_remove_roundtrip() {
        let mut world = world();
        let e = world.create().unwrap();
        assert!(!world.add_comp(e, A(1)).unwrap());
        assert!(world.add_comp(e, A(2)).unwrap());
        assert_eq!(*world.get_comp::<A>(e).unwrap(), A(2));
        world.get_comp_mut::<A>(e).unwrap().0 = 5;
        assert_eq!(*world.get_comp::<A>(e).unwrap(), A(5));
        assert!(world.has_comp::<A>(e).unwrap());
        assert!(world.rem_comp::<A>(e).unwrap());
        assert!(!world.rem_comp::<A>(e).unwrap());
        assert!(!world.has_comp::<A>(e).unwrap());
        assert_eq!(world.get_comp::<A>(e).err(), Some(missing::<A>(e.index())));
        assert_eq!(world.component_count::<A>(), 0);
    }

    #[test]
    fn stale_handle_rejected_before_touching_storage() {
        let mut world = world();
        let e = world.create().unwrap();
        world.add_comp(e, B(1)).unwrap();
        world.destroy(e).unwrap();
        let reused = world.create().unwrap();
        assert_eq!(reused.index(), e.index());

        assert_eq!(world.add_comp(e, B(2)), Err(EcsError::StaleHandle(e)));
        assert_eq!(world.rem_comp::<B>(e), Err(EcsError::StaleHandle(e)));
        assert_eq!(world.has_comp::<B>(e), Err(EcsError::StaleHandle(e)));
        assert_eq!(world.get_comp::<B>(e).err(), Some(EcsError::StaleHandle(e)));
        assert_eq!(world.destroy(e), Err(EcsError::StaleHandle(e)));
        assert!(!world.has_comp::<B>(reused).unwrap());
    }

    #[test]
    fn destroy_strips_every_store() {
        let mut world = world();
        let e = world.create().unwrap();
        world.add_comp(e, A(1)).unwrap();
        world.add_comp(e, B(1)).unwrap();
        world.add_comp(e, C).unwrap();
        world.destroy(e).unwrap();
        assert!(world.entities().is_empty());
        assert_eq!(world.component_count::<A>(), 0);
        assert_eq!(world.component_count::<B>(), 0);
        assert_eq!(world.component_count::<C>(), 0);
        assert!(world.store::<A>().unwrap().is_empty());
        assert!(!world.store::<B>().unwrap().has(e.index()));
    }

    #[test]
    fn registration_errors() {
        let mut world = world();
        assert_eq!(world.register_component::<A>(), Err(EcsError::DuplicateComponent(type_name::<A>())));

        struct Unknown;
        impl Component for Unknown {
            type Storage = HashStore<Self>;
        }
        let e = world.create().unwrap();
        assert_eq!(world.add_comp(e, Unknown).err(), Some(EcsError::UnregisteredComponent(type_name::<Unknown>())));
        assert!(!world.has_comps::<(Unknown,)>(e.index()));
        assert!(world.view::<(A, Unknown)>().is_err());
    }

    #[test]
    fn sixty_fifth_component_type_is_rejected() {
        macro_rules! declare_components {
            ($($name:ident)*) => {
                $(
                    struct $name;
                    impl Component for $name {
                        type Storage = HashStore<Self>;
                    }
                )*

                fn register_all(world: &mut World) -> Vec<Result<()>> {
                    vec![$(world.register_component::<$name>()),*]
                }
            };
        }

        declare_components! {
            K0 K1 K2 K3 K4 K5 K6 K7 K8 K9
            K10 K11 K12 K13 K14 K15 K16 K17 K18 K19
            K20 K21 K22 K23 K24 K25 K26 K27 K28 K29
            K30 K31 K32 K33 K34 K35 K36 K37 K38 K39
            K40 K41 K42 K43 K44 K45 K46 K47 K48 K49
            K50 K51 K52 K53 K54 K55 K56 K57 K58 K59
            K60 K61 K62 K63 K64
        }

        let mut world = World::new();
        let results = register_all(&mut world);
        assert_eq!(results.len(), MAX_COMPONENT_TYPES + 1);
        assert!(results[..MAX_COMPONENT_TYPES].iter().all(|result| result.is_ok()));
        assert_eq!(
            results[MAX_COMPONENT_TYPES],
            Err(EcsError::AllocationExhausted{resource: "component types", capacity: MAX_COMPONENT_TYPES})
        );
        assert!(!world.is_registered::<K64>());
        assert_eq!(world.component_table().len(), MAX_COMPONENT_TYPES);

        let e = world.create().unwrap();
        world.add_comp(e, K63).unwrap();
        world.add_comp(e, K0).unwrap();
        assert!(world.has_comps::<(K0, K63)>(e.index()));
        assert_eq!(world.view::<(K63,)>().unwrap().collect::<Vec<_>>(), vec![e]);
    }

    #[test]
    fn component_table_lists_registration_order() {
        let world = world();
        let table = world.component_table();
        assert_eq!(
            table,
            vec![
                (type_name::<A>(), StorageStrategy::DirectIndexing),
                (type_name::<B>(), StorageStrategy::Hashing),
                (type_name::<C>(), StorageStrategy::SparseSet),
            ]
        );
        assert_eq!(world.storage_strategy::<B>(), Some(StorageStrategy::Hashing));
    }

    #[test]
    fn has_comps_and_hasnt_comp() {
        let mut world = world();
        let e = world.create().unwrap();
        world.add_comp(e, A(1)).unwrap();
        world.add_comp(e, C).unwrap();
        assert!(world.has_comps::<(A, C)>(e.index()));
        assert!(!world.has_comps::<(A, B, C)>(e.index()));
        assert!(world.hasnt_comp::<B>(e.index()));
        assert!(!world.hasnt_comp::<A>(e.index()));
        assert!(!world.has_comps::<(A,)>(999));
    }

    #[test]
    fn overlapping_mutable_borrow_is_reported() {
        let mut world = world();
        let e = world.create().unwrap();
        world.add_comp(e, A(1)).unwrap();
        let guard = world.get_comp_mut::<A>(e).unwrap();
        assert_eq!(world.get_comp::<A>(e).err(), Some(EcsError::StoreBorrowed(type_name::<A>())));
        assert!(world.has_comp::<A>(e).unwrap());
        drop(guard);
        assert!(world.get_comp::<A>(e).is_ok());
    }

    #[test]
    fn optimize_keeps_contents() {
        let mut world = world();
        let handles: Vec<_> = (0..10).map(|_| world.create().unwrap()).collect();
        for (i, e) in handles.iter().enumerate() {
            world.add_comp(*e, C).unwrap();
            world.add_comp(*e, A(i as u32)).unwrap();
        }
        world.destroy(handles[2]).unwrap();
        world.optimize();
        assert_eq!(world.component_count::<C>(), 9);
        assert_eq!(*world.get_comp::<A>(handles[9]).unwrap(), A(9));
    }
}
