//! # KESTREL ECS
//!
//! The data core of the KESTREL 2D engine: an entity-component-system
//! registry with deferred membership updates, tag and group indices, and a
//! typed event bus.
//!
//! ## Frame Contract
//!
//! 1. Gameplay code creates entities, attaches components, tags, groups and
//!    kills during the frame. Data changes are visible at once.
//! 2. The frame loop calls [`Registry::update`] exactly once.
//! 3. Systems run in the order the frame loop chooses, iterating their
//!    matched entity lists and talking through the [`EventBus`].
//!
//! ## Example
//!
//! ```rust
//! use kestrel_ecs::{Component, Registry, System, SystemState};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Position(f32, f32);
//! impl Component for Position {}
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Velocity(f32, f32);
//! impl Component for Velocity {}
//!
//! struct Movement {
//!     state: SystemState,
//! }
//!
//! impl System for Movement {
//!     fn state(&self) -> &SystemState {
//!         &self.state
//!     }
//!     fn state_mut(&mut self) -> &mut SystemState {
//!         &mut self.state
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.add_system(Movement {
//!     state: SystemState::new().require::<Position>().require::<Velocity>(),
//! });
//!
//! let ship = registry
//!     .create_entity_mut()
//!     .add_component(Position(0.0, 0.0))
//!     .add_component(Velocity(1.0, 0.0))
//!     .entity();
//! registry.update();
//!
//! registry
//!     .run_system::<Movement, _, _>(|movement, registry| {
//!         for &entity in movement.entities() {
//!             let velocity = *registry.get_component::<Velocity>(entity)?;
//!             let position = registry.get_component_mut::<Position>(entity)?;
//!             position.0 += velocity.0;
//!             position.1 += velocity.1;
//!         }
//!         Ok::<_, kestrel_ecs::EcsError>(())
//!     })
//!     .and_then(|moved| moved)
//!     .unwrap();
//!
//! assert_eq!(registry.get_component::<Position>(ship), Ok(&Position(1.0, 0.0)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod event;

pub use config::RegistryConfig;
pub use ecs::{
    component_kind, component_kind_count, component_kind_name, downcast_system,
    downcast_system_mut, try_component_kind, AnyPool, AsAny, Component, ComponentKind,
    ComponentPool, Components, Entity, EntityId, EntityMut, Registry, Signature, System,
    SystemState, UpdateReport, MAX_COMPONENTS,
};
pub use error::{EcsError, EcsResult};
pub use event::{Event, EventBus};
