use std::ops::Range;

use cgmath::Vector2;
use rustc_hash::FxHashMap;

use crate::entity::EntityIndex;

/// Where and how deep two colliders overlap. `normal` points from `a` towards `b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub point: Vector2<f32>,
    pub normal: Vector2<f32>,
    pub depth: f32,
}

impl Contact {
    /// For feeds that only report which pairs touch.
    pub fn none() -> Self {
        Self{
            point: Vector2::new(0.0, 0.0),
            normal: Vector2::new(0.0, 0.0),
            depth: 0.0,
        }
    }
}

/// One collision as delivered by the physics pass, or one directed record of it inside a [`CollisionIndex`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionInfo {
    pub index_a: EntityIndex,
    pub index_b: EntityIndex,
    pub contact: Contact,
}

impl CollisionInfo {
    pub fn new(index_a: EntityIndex, index_b: EntityIndex) -> Self {
        Self{index_a, index_b, contact: Contact::none()}
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = contact;
        self
    }

    /// The same collision seen from `index_b`.
    pub fn reversed(&self) -> Self {
        Self{
            index_a: self.index_b,
            index_b: self.index_a,
            contact: Contact{
                normal: -self.contact.normal,
                ..self.contact
            },
        }
    }
}

/// Collision records of a single tick, grouped by the entity they touch.
///
/// Every pair is stored in both directions, so querying either entity finds the other in `index_b`.
/// There is no incremental update; build a new index each tick.
#[derive(Clone, Debug, Default)]
pub struct CollisionIndex {
    records: Vec<CollisionInfo>,
    groups: FxHashMap<EntityIndex, Range<usize>>,
    pair_count: usize,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one tick of collision pairs. A pair with `index_a == index_b` is skipped.
    pub fn build<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = CollisionInfo>,
    {
        let mut index = Self::new();
        index.rebuild(pairs);
        index
    }

    /// Replaces the contents, keeping the allocations of the previous tick.
    /// Self pairs are skipped as in [`CollisionIndex::build`].
    pub fn rebuild<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = CollisionInfo>,
    {
        profiling::scope!("CollisionIndex::build");
        self.records.clear();
        self.groups.clear();
        self.pair_count = 0;

        for pair in pairs {
            if pair.index_a == pair.index_b {
                log::trace!("dropping self collision of entity {}", pair.index_a);
                continue;
            }
            self.records.push(pair);
            self.records.push(pair.reversed());
            self.pair_count += 1;
        }

        // stable, so every group keeps feed order
        self.records.sort_by_key(|record| record.index_a);

        let mut start = 0;
        while start < self.records.len() {
            let index = self.records[start].index_a;
            let end = start + self.records[start..].iter().take_while(|record| record.index_a == index).count();
            self.groups.insert(index, start..end);
            start = end;
        }
    }

    /// Records whose `index_a` is `index`. Empty if the entity touched nothing this tick.
    pub fn collisions_view(&self, index: EntityIndex) -> &[CollisionInfo] {
        match self.groups.get(&index) {
            Some(range) => &self.records[range.clone()],
            None => &[],
        }
    }

    /// Indices of the entities `index` collided with.
    pub fn touching(&self, index: EntityIndex) -> impl Iterator<Item = EntityIndex> + '_ {
        self.collisions_view(index).iter().map(|record| record.index_b)
    }

    pub fn collides_with(&self, a: EntityIndex, b: EntityIndex) -> bool {
        self.touching(a).any(|other| other == b)
    }

    /// Pairs fed into the last build, self collisions excluded.
    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    /// Directed records, twice [`CollisionIndex::pair_count`].
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every entity with at least one collision, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = EntityIndex> + '_ {
        self.groups.keys().copied()
    }

    /// All directed records, grouped by `index_a` in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, CollisionInfo> {
        self.records.iter()
    }
}
