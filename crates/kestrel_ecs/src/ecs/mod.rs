//! # Entity Component System
//!
//! Entities are ids, components are plain data in per-kind dense pools, and
//! systems are a required signature plus the entities that satisfy it.
//!
//! ## Design Philosophy
//!
//! - One process-wide table maps each component type to a small kind id
//! - Component data lives in sparse-set pools, one per kind
//! - System membership changes are deferred to `Registry::update()`
//! - Tags and groups are plain string indices owned by the registry

mod entity;
mod index;
mod pool;
mod registry;
mod signature;
mod store;
mod system;

pub use entity::{Entity, EntityId, EntityMut};
pub use pool::{AnyPool, ComponentPool};
pub use registry::{Registry, UpdateReport};
pub use signature::{
    component_kind, component_kind_count, component_kind_name, try_component_kind, Component,
    ComponentKind, Signature, MAX_COMPONENTS,
};
pub use store::Components;
pub use system::{downcast_system, downcast_system_mut, AsAny, System, SystemState};
