use super::*;

const fn get_page_index(index: EntityIndex, page_exponent: usize) -> usize {
    index as usize >> page_exponent
}

const fn get_page_offset(index: EntityIndex, page_mask: usize) -> usize {
    index as usize & page_mask
}

const fn get_page_mask(page_exponent: usize) -> usize {
    !(usize::MAX << page_exponent)
}

const PAGE_EXPONENT: usize = 7;
const PAGE_SIZE: usize = 1 << PAGE_EXPONENT;
const PAGE_MASK: usize = get_page_mask(PAGE_EXPONENT);

struct Page<T, const N: usize> {
    slots: Box<[Option<T>; N]>,
    len: usize,
}

impl<T, const N: usize> Page<T, N> {
    fn new() -> Self {
        Self{
            slots: Box::new(std::array::from_fn(|_| None)),
            len: 0,
        }
    }

    fn iter_entity(&self, page_index: usize) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.slots.iter()
            .enumerate()
            .filter_map(move |(offset, slot)| {
                slot.as_ref().map(|value| ((offset + (page_index << PAGE_EXPONENT)) as EntityIndex, value))
            })
    }

    fn iter_entity_mut(&mut self, page_index: usize) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.slots.iter_mut()
            .enumerate()
            .filter_map(move |(offset, slot)| {
                slot.as_mut().map(|value| ((offset + (page_index << PAGE_EXPONENT)) as EntityIndex, value))
            })
    }
}

/// Direct indexing: one optional slot per entity index, allocated in pages of `PAGE_SIZE`.
///
/// Iterates in entity index order.
pub struct LinearStore<T> {
    pages: Vec<Page<T, PAGE_SIZE>>,
    len: usize,
}

impl<T: 'static> GenericComponentStore for LinearStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    /// Drops trailing pages that hold nothing.
    fn optimize(&mut self) {
        while self.pages.last().map_or(false, |page| page.len == 0) {
            self.pages.pop();
        }
        self.pages.shrink_to_fit();
    }

    fn has(&self, index: EntityIndex) -> bool {
        self.slot(index).map_or(false, |slot| slot.is_some())
    }

    fn rem(&mut self, index: EntityIndex) -> bool {
        self.take(index).is_some()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.pages.clear();
        self.len = 0;
    }

    fn indices(&self) -> Box<dyn Iterator<Item = EntityIndex> + '_> {
        Box::new(self.iter_entity().map(|(index, _)| index))
    }
}

impl<T> LinearStore<T> {
    fn assure_page(&mut self, page_index: usize) {
        if self.pages.len() <= page_index {
            self.pages.resize_with(page_index + 1, Page::new);
        }
    }

    fn slot(&self, index: EntityIndex) -> Option<&Option<T>> {
        let page_index = get_page_index(index, PAGE_EXPONENT);
        let page_offset = get_page_offset(index, PAGE_MASK);
        self.pages.get(page_index).map(|page| &page.slots[page_offset])
    }

    fn slot_mut(&mut self, index: EntityIndex) -> Option<&mut Option<T>> {
        let page_index = get_page_index(index, PAGE_EXPONENT);
        let page_offset = get_page_offset(index, PAGE_MASK);
        self.pages.get_mut(page_index).map(|page| &mut page.slots[page_offset])
    }
}

impl<T: 'static> ComponentStore<T> for LinearStore<T> {
    const STRATEGY: StorageStrategy = StorageStrategy::DirectIndexing;

    fn new() -> Self {
        Self{
            pages: Vec::new(),
            len: 0,
        }
    }

    fn get(&self, index: EntityIndex) -> Option<&T> {
        self.slot(index)?.as_ref()
    }

    fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        self.slot_mut(index)?.as_mut()
    }

    fn add(&mut self, index: EntityIndex, value: T) -> bool {
        let page_index = get_page_index(index, PAGE_EXPONENT);
        let page_offset = get_page_offset(index, PAGE_MASK);
        self.assure_page(page_index);
        let page = &mut self.pages[page_index];
        let replaced = page.slots[page_offset].replace(value).is_some();
        if !replaced {
            page.len += 1;
            self.len += 1;
        }
        replaced
    }

    fn take(&mut self, index: EntityIndex) -> Option<T> {
        let page_index = get_page_index(index, PAGE_EXPONENT);
        let page_offset = get_page_offset(index, PAGE_MASK);
        let page = self.pages.get_mut(page_index)?;
        let value = page.slots[page_offset].take()?;
        page.len -= 1;
        self.len -= 1;
        Some(value)
    }

    fn iter_entity(&self) -> impl Iterator<Item = (EntityIndex, &T)> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.len > 0)
            .flat_map(|(page_index, page)| page.iter_entity(page_index))
    }

    fn iter_entity_mut(&mut self) -> impl Iterator<Item = (EntityIndex, &mut T)> {
        self.pages
            .iter_mut()
            .enumerate()
            .filter(|(_, page)| page.len > 0)
            .flat_map(|(page_index, page)| page.iter_entity_mut(page_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_index_order_across_pages() {
        let mut store = LinearStore::<&'static str>::new();
        store.add(PAGE_SIZE as EntityIndex + 1, "b");
        store.add(3, "a");
        store.add(4 * PAGE_SIZE as EntityIndex, "c");
        let order: Vec<_> = store.iter_entity().map(|(index, value)| (index, *value)).collect();
        assert_eq!(order, vec![(3, "a"), (PAGE_SIZE as EntityIndex + 1, "b"), (4 * PAGE_SIZE as EntityIndex, "c")]);
    }

    #[test]
    fn optimize_releases_trailing_pages() {
        let mut store = LinearStore::<u8>::new();
        store.add(1, 1);
        store.add(10 * PAGE_SIZE as EntityIndex, 2);
        assert_eq!(store.pages.len(), 11);
        store.rem(10 * PAGE_SIZE as EntityIndex);
        store.optimize();
        assert_eq!(store.pages.len(), 1);
        assert_eq!(store.get(1), Some(&1));
    }
}
