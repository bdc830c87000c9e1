use crate::entity::handle::{EntityHandle, EntityIndex};

/// Contract violations reported by the entity/component core.
///
/// None of these are retried; they all point at a caller logic error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The handle does not name a live slot (destroyed, reused or out of range).
    #[error("stale entity handle (index {}, version {})", .0.index(), .0.version())]
    StaleHandle(EntityHandle),

    /// `get` on an entity that does not carry the component.
    #[error("entity {index} has no {component} component")]
    MissingComponent {
        index: EntityIndex,
        component: &'static str,
    },

    /// A bounded table cannot grow any further.
    #[error("{resource} exhausted (capacity {capacity})")]
    AllocationExhausted {
        resource: &'static str,
        capacity: usize,
    },

    #[error("component {0} is not registered")]
    UnregisteredComponent(&'static str),

    #[error("component {0} is registered twice")]
    DuplicateComponent(&'static str),

    /// The store is already borrowed in a conflicting way (e.g. a running script holds it mutably).
    #[error("component store for {0} is already borrowed")]
    StoreBorrowed(&'static str),
}

pub type Result<T, E = EcsError> = std::result::Result<T, E>;
