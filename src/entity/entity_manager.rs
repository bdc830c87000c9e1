use crate::config::WorldConfig;
use crate::entity::handle::*;
use crate::error::{EcsError, Result};

/// Handle table: maps entity handles to slots and tracks their lifecycle.
///
/// Slots are never reused while alive. Destroying bumps the slot version, so every handle
/// to the old occupant stays invalid after the index is handed out again. A slot whose
/// version would wrap is retired instead of recycled.
pub struct EntityManager {
    pub(crate) entity_slots: Vec<EntitySlot>,
    entity_free_list: FreeSlots,
    max_entities: EntityIndex,
    alive_count: usize,
    retired_count: usize,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::with_config(&WorldConfig::default())
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &WorldConfig) -> Self {
        Self{
            entity_slots: Vec::with_capacity(config.initial_capacity),
            entity_free_list: FreeSlots::default(),
            max_entities: config.max_entities,
            alive_count: 0,
            retired_count: 0,
        }
    }

    pub fn is_alive(&self, index: EntityIndex) -> bool {
        self.slot(index).map_or(false, |slot| slot.alive)
    }

    pub fn is_spawned(&self, index: EntityIndex) -> bool {
        self.slot(index).map_or(false, |slot| slot.alive && slot.spawned)
    }

    pub fn version_of(&self, index: EntityIndex) -> Option<EntityVersion> {
        self.slot(index).filter(|slot| slot.alive).map(|slot| slot.version)
    }

    /// Rebuilds the handle of the entity currently living at `index`.
    pub fn handle_at(&self, index: EntityIndex) -> Option<EntityHandle> {
        self.version_of(index).map(|version| EntityHandle{index, version})
    }

    pub fn is_valid(&self, entity: EntityHandle) -> bool {
        self.slot(entity.index).map_or(false, |slot| slot.alive && slot.version == entity.version)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.alive_count
    }

    pub fn is_empty(&self) -> bool {
        self.alive_count == 0
    }

    /// Number of slots ever allocated, live or not.
    pub fn slot_count(&self) -> usize {
        self.entity_slots.len()
    }

    /// Slots taken out of circulation because their version saturated.
    pub fn retired_count(&self) -> usize {
        self.retired_count
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.entity_slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| EntityHandle{index: index as EntityIndex, version: slot.version})
    }

    /// Allocates a slot, preferring the lowest previously destroyed index.
    /// The new entity is alive but not spawned.
    pub fn create(&mut self) -> Result<EntityHandle> {
        let index = match self.entity_free_list.pop() {
            Some(index) => index,
            None => {
                if self.entity_slots.len() >= self.max_entities as usize {
                    return Err(EcsError::AllocationExhausted{
                        resource: "entity slots",
                        capacity: self.max_entities as usize,
                    });
                }
                self.entity_slots.push(EntitySlot::new());
                (self.entity_slots.len() - 1) as EntityIndex
            }
        };
        let entity_slot = &mut self.entity_slots[index as usize];
        debug_assert!(!entity_slot.alive, "free list handed out a live slot");
        entity_slot.alive = true;
        entity_slot.spawned = false;
        self.alive_count += 1;
        Ok(EntityHandle{index, version: entity_slot.version})
    }

    /// Frees the slot. Components must already be stripped by the caller.
    pub fn destroy(&mut self, entity: EntityHandle) -> Result<()> {
        self.check(entity)?;
        let entity_slot = &mut self.entity_slots[entity.index as usize];
        entity_slot.alive = false;
        entity_slot.spawned = false;
        let retire = entity_slot.version == EntityVersion::MAX;
        if !retire {
            entity_slot.version += 1;
        }

        self.alive_count -= 1;
        if retire {
            self.retired_count += 1;
            log::debug!("entity slot {} retired after exhausting its versions", entity.index);
        } else {
            self.entity_free_list.push(entity.index);
        }
        Ok(())
    }

    pub fn spawn(&mut self, entity: EntityHandle) -> Result<()> {
        self.valid_slot_mut(entity)?.spawned = true;
        Ok(())
    }

    pub fn despawn(&mut self, entity: EntityHandle) -> Result<()> {
        self.valid_slot_mut(entity)?.spawned = false;
        Ok(())
    }

    pub(crate) fn check(&self, entity: EntityHandle) -> Result<()> {
        if self.is_valid(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleHandle(entity))
        }
    }

    fn slot(&self, index: EntityIndex) -> Option<&EntitySlot> {
        self.entity_slots.get(index as usize)
    }

    fn valid_slot_mut(&mut self, entity: EntityHandle) -> Result<&mut EntitySlot> {
        match self.entity_slots.get_mut(entity.index as usize) {
            Some(slot) if slot.alive && slot.version == entity.version => Ok(slot),
            _ => Err(EcsError::StaleHandle(entity)),
        }
    }
}

/// Destroyed slot indices as a bitset. Hands out the lowest index first.
#[derive(Default)]
struct FreeSlots {
    words: Vec<u64>,
    /// No set bit lives in a word below this one.
    first_word: usize,
    len: usize,
}

impl FreeSlots {
    fn push(&mut self, index: EntityIndex) {
        let word = index as usize / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let bit = 1u64 << (index % 64);
        debug_assert_eq!(self.words[word] & bit, 0, "slot {} freed twice", index);
        self.words[word] |= bit;
        self.first_word = self.first_word.min(word);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<EntityIndex> {
        if self.len == 0 {
            return None;
        }
        while self.words[self.first_word] == 0 {
            self.first_word += 1;
        }
        let word = &mut self.words[self.first_word];
        let offset = word.trailing_zeros();
        *word &= *word - 1;
        self.len -= 1;
        Some((self.first_word * 64) as EntityIndex + offset)
    }
}
