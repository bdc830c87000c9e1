use super::*;

/// Lookup table: `(index, value)` pairs kept sorted by index and binary searched.
///
/// Inserting or removing shifts the tail, so this suits components that are rarely added or
/// removed but iterated often. Iterates in entity index order.
pub struct LookupStore<T> {
    entries: Vec<(EntityIndex, T)>,
}

impl<T> LookupStore<T> {
    fn search(&self, index: EntityIndex) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by_key(&index, |(entry_index, _)| *entry_index)
    }

    /// Entries whose index lies in `range`, in index order.
    pub fn range(&self, range: std::ops::Range<EntityIndex>) -> &[(EntityIndex, T)] {
        let start = self.entries.partition_point(|(index, _)| *index < range.start);
        let end = self.entries.partition_point(|(index, _)| *index < range.end);
        &self.entries[start..end.max(start)]
    }
}

impl<T: 'static> GenericComponentStore for LookupStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn optimize(&mut self) {
        self.entries.shrink_to_fit();
    }

    fn has(&self, index: EntityIndex) -> bool {
        self.search(index).is_ok()
    }

    fn rem(&mut self, index: EntityIndex) -> bool {
        self.take(index).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn indices(&self) -> Box<dyn Iterator<Item = EntityIndex> + '_> {
        Box::new(self.entries.iter().map(|(index, _)| *index))
    }
}

impl<T: 'static> ComponentStore<T> for LookupStore<T> {
    const STRATEGY: StorageStrategy = StorageStrategy::LookupTable;

    fn new() -> Self {
        Self{
            entries: Vec::new(),
        }
    }

    fn get(&self, index: EntityIndex) -> Option<&T> {
        let position = self.search(index).ok()?;
        Some(&self.entries[position].1)
    }

    fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        let position = self.search(index).ok()?;
        Some(&mut self.entries[position].1)
    }

    fn add(&mut self, index: EntityIndex, value: T) -> bool {
        match self.search(index) {
            Ok(position) => {
                self.entries[position].1 = value;
                true
            }
            Err(position) => {
                self.entries.insert(position, (index, value));
                false
            }
        }
    }

    fn take(&mut self, index: EntityIndex) -> Option<T> {
        let position = self.search(index).ok()?;
        Some(self.entries.remove(position).1)
    }

    fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.entries.iter().map(|(index, value)| (*index, value))
    }

    fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.entries.iter_mut().map(|(index, value)| (*index, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_sorted_under_random_inserts() {
        let mut store = LookupStore::<u32>::new();
        for index in [40, 2, 17, 9, 33] {
            store.add(index, index);
        }
        let indices: Vec<_> = store.indices().collect();
        assert_eq!(indices, vec![2, 9, 17, 33, 40]);
        assert_eq!(store.range(9..34).iter().map(|(index, _)| *index).collect::<Vec<_>>(), vec![9, 17, 33]);
        assert!(store.range(50..60).is_empty());
    }
}
