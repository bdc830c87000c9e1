pub type EntityIndex = u32;
pub type EntityVersion = u32;

/// Value handle to an entity. Equal iff both index and version match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pub(crate) index: EntityIndex,
    pub(crate) version: EntityVersion,
}

impl EntityHandle {
    pub const fn index(&self) -> EntityIndex {
        self.index
    }

    pub const fn version(&self) -> EntityVersion {
        self.version
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct EntitySlot {
    pub(crate) version: EntityVersion,
    pub(crate) alive: bool,
    pub(crate) spawned: bool,
}

impl EntitySlot {
    pub(crate) fn new() -> Self {
        Self{
            version: 0,
            alive: false,
            spawned: false,
        }
    }
}
