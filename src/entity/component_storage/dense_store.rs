use super::*;

const EMPTY: EntityIndex = !0;

/// Sparse set: values packed in `dense_values`, `sparse_indices` maps an entity index to its dense slot.
///
/// Removal swaps the last value into the hole, so iteration order is unspecified.
pub struct DenseStore<T> {
    sparse_indices: Vec<EntityIndex>,
    dense_indices: Vec<EntityIndex>,
    dense_values: Vec<T>,
}

impl<T: 'static> GenericComponentStore for DenseStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    /// Re-packs the dense arrays in entity index order.
    fn optimize(&mut self) {
        let mut order: Vec<usize> = (0..self.dense_indices.len()).collect();
        order.sort_unstable_by_key(|dense_index| self.dense_indices[*dense_index]);

        let mut values: Vec<Option<T>> = self.dense_values.drain(..).map(Some).collect();
        let mut new_dense_indices = Vec::with_capacity(order.len());
        let mut new_dense_values = Vec::with_capacity(order.len());
        for dense_index in order {
            let index = self.dense_indices[dense_index];
            if let Some(value) = values[dense_index].take() {
                self.sparse_indices[index as usize] = new_dense_indices.len() as EntityIndex;
                new_dense_indices.push(index);
                new_dense_values.push(value);
            }
        }

        let highest = new_dense_indices.last().map_or(0, |index| *index as usize + 1);
        self.sparse_indices.truncate(highest);
        self.sparse_indices.shrink_to_fit();
        self.dense_indices = new_dense_indices;
        self.dense_values = new_dense_values;
    }

    fn has(&self, index: EntityIndex) -> bool {
        self.dense_index(index).is_some()
    }

    fn rem(&mut self, index: EntityIndex) -> bool {
        self.take(index).is_some()
    }

    fn len(&self) -> usize {
        self.dense_values.len()
    }

    fn clear(&mut self) {
        self.sparse_indices.clear();
        self.dense_indices.clear();
        self.dense_values.clear();
    }

    fn indices(&self) -> Box<dyn Iterator<Item = EntityIndex> + '_> {
        Box::new(self.dense_indices.iter().copied())
    }
}

impl<T> DenseStore<T> {
    /// Packed values, in no particular entity order.
    pub fn values(&self) -> &[T] {
        &self.dense_values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.dense_values
    }

    fn dense_index(&self, index: EntityIndex) -> Option<usize> {
        match self.sparse_indices.get(index as usize) {
            Some(&dense_index) if dense_index != EMPTY => Some(dense_index as usize),
            _ => None,
        }
    }

    fn assure_index(&mut self, index: EntityIndex) {
        if index as usize >= self.sparse_indices.len() {
            self.sparse_indices.resize(index as usize + 1, EMPTY);
        }
    }
}

impl<T: 'static> ComponentStore<T> for DenseStore<T> {
    const STRATEGY: StorageStrategy = StorageStrategy::SparseSet;

    fn new() -> Self {
        Self{
            sparse_indices: Vec::new(),
            dense_indices: Vec::new(),
            dense_values: Vec::new(),
        }
    }

    fn get(&self, index: EntityIndex) -> Option<&T> {
        self.dense_index(index).map(|dense_index| &self.dense_values[dense_index])
    }

    fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        self.dense_index(index).map(move |dense_index| &mut self.dense_values[dense_index])
    }

    fn add(&mut self, index: EntityIndex, value: T) -> bool {
        if let Some(dense_index) = self.dense_index(index) {
            self.dense_values[dense_index] = value;
            return true;
        }
        self.assure_index(index);
        self.dense_values.push(value);
        self.dense_indices.push(index);
        self.sparse_indices[index as usize] = (self.dense_indices.len() - 1) as EntityIndex;
        false
    }

    fn take(&mut self, index: EntityIndex) -> Option<T> {
        let dense_index = self.dense_index(index)?;
        let value = self.dense_values.swap_remove(dense_index);
        self.dense_indices.swap_remove(dense_index);
        if let Some(&moved) = self.dense_indices.get(dense_index) {
            self.sparse_indices[moved as usize] = dense_index as EntityIndex;
        }
        self.sparse_indices[index as usize] = EMPTY;
        Some(value)
    }

    fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.dense_indices.iter().copied().zip(self.dense_values.iter())
    }

    fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.dense_indices.iter().copied().zip(self.dense_values.iter_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_keeps_moved_entry_reachable() {
        let mut store = DenseStore::<u32>::new();
        for index in 0..4 {
            store.add(index, index * 10);
        }
        assert!(store.rem(1));
        assert_eq!(store.get(3), Some(&30));
        assert_eq!(store.get(0), Some(&0));
        assert_eq!(store.values().len(), 3);

        for value in store.values_mut() {
            *value += 1;
        }
        assert_eq!(store.get(3), Some(&31));
        assert_eq!(store.get(2), Some(&21));
        assert_eq!(store.get(1), None);
    }

    #[test]
    fn optimize_packs_in_index_order() {
        let mut store = DenseStore::<u32>::new();
        store.add(9, 90);
        store.add(3, 30);
        store.add(5, 50);
        store.rem(9);
        store.optimize();
        let order: Vec<_> = store.iter_entity().map(|(index, value)| (index, *value)).collect();
        assert_eq!(order, vec![(3, 30), (5, 50)]);
        assert!(!store.has(9));
        assert_eq!(store.get(5), Some(&50));
    }
}
