pub mod handle;
pub mod entity_manager;
pub mod component_storage;
pub mod component_manager;
pub mod entity_view;
pub mod query;
pub mod commands;
pub mod iteration;
pub mod default_components;

pub use handle::{EntityHandle, EntityIndex, EntityVersion};
pub use entity_manager::EntityManager;
pub use component_storage::{
    Component, ComponentStore, DenseStore, GenericComponentStore, HashStore, LinearStore, LookupStore, StorageStrategy,
};
pub use component_manager::{ComponentMask, World, MAX_COMPONENT_TYPES};
pub use entity_view::EntityView;
pub use query::{ComponentQuery, StoreMut, StoreRef, View};
pub use commands::{Command, CommandBuffer};
