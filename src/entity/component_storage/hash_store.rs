use rustc_hash::FxHashMap;

use super::*;

/// Hash map from entity index to value. For very sparse, rarely iterated components.
pub struct HashStore<T> {
    values: FxHashMap<EntityIndex, T>,
}

impl<T: 'static> GenericComponentStore for HashStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn optimize(&mut self) {
        self.values.shrink_to_fit();
    }

    fn has(&self, index: EntityIndex) -> bool {
        self.values.contains_key(&index)
    }

    fn rem(&mut self, index: EntityIndex) -> bool {
        self.values.remove(&index).is_some()
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn indices(&self) -> Box<dyn Iterator<Item = EntityIndex> + '_> {
        Box::new(self.values.keys().copied())
    }
}

impl<T: 'static> ComponentStore<T> for HashStore<T> {
    const STRATEGY: StorageStrategy = StorageStrategy::Hashing;

    fn new() -> Self {
        Self{
            values: FxHashMap::default(),
        }
    }

    fn get(&self, index: EntityIndex) -> Option<&T> {
        self.values.get(&index)
    }

    fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        self.values.get_mut(&index)
    }

    fn add(&mut self, index: EntityIndex, value: T) -> bool {
        self.values.insert(index, value).is_some()
    }

    fn take(&mut self, index: EntityIndex) -> Option<T> {
        self.values.remove(&index)
    }

    fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.values.iter().map(|(index, value)| (*index, value))
    }

    fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.values.iter_mut().map(|(index, value)| (*index, value))
    }
}
