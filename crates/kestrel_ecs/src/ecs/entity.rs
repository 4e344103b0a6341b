//! # Entity Handles
//!
//! An [`Entity`] is just an id. All component data, tags and groups live in
//! the [`Registry`]; two handles with the same id are the same entity.
//!
//! [`EntityMut`] pairs an entity with a mutable borrow of its registry, so
//! gameplay code can write `registry.entity_mut(e).add_component(..)`
//! instead of threading both values through every call.

use std::fmt;

use super::registry::Registry;
use super::signature::Component;
use crate::error::EcsResult;

/// Raw entity id. Ids are recycled after a kill is reconciled.
pub type EntityId = u32;

/// Lightweight entity identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(EntityId);

impl Entity {
    /// Creates a handle for the given id.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.0
    }

    /// Returns the id as a table index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// An entity together with the registry that owns it.
///
/// Every operation delegates to the matching [`Registry`] method.
pub struct EntityMut<'r> {
    entity: Entity,
    registry: &'r mut Registry,
}

impl<'r> EntityMut<'r> {
    pub(crate) fn new(entity: Entity, registry: &'r mut Registry) -> Self {
        Self { entity, registry }
    }

    /// The wrapped entity.
    #[inline]
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The wrapped entity's raw id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// The owning registry.
    #[must_use]
    pub fn registry(&mut self) -> &mut Registry {
        &mut *self.registry
    }

    /// Attaches (or overwrites) a component. Chainable.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut Self {
        self.registry.add_component(self.entity, component);
        self
    }

    /// Detaches a component. No-op if absent.
    pub fn remove_component<T: Component>(&mut self) -> &mut Self {
        self.registry.remove_component::<T>(self.entity);
        self
    }

    /// Returns `true` if the entity has a component of kind `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.entity)
    }

    /// Returns the entity's `T` component.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`](crate::EcsError::MissingComponent)
    /// if the entity has no `T`.
    pub fn get_component<T: Component>(&self) -> EcsResult<&T> {
        self.registry.get_component::<T>(self.entity)
    }

    /// Returns the entity's `T` component mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`](crate::EcsError::MissingComponent)
    /// if the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self) -> EcsResult<&mut T> {
        self.registry.get_component_mut::<T>(self.entity)
    }

    /// Tags the entity. Chainable.
    pub fn tag(&mut self, tag: &str) -> &mut Self {
        self.registry.tag(self.entity, tag);
        self
    }

    /// Returns `true` if the entity currently carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.registry.has_tag(self.entity, tag)
    }

    /// Moves the entity into `group`. Chainable.
    pub fn group(&mut self, group: &str) -> &mut Self {
        self.registry.group(self.entity, group);
        self
    }

    /// Returns `true` if the entity belongs to `group`.
    #[must_use]
    pub fn belongs_to_group(&self, group: &str) -> bool {
        self.registry.belongs_to_group(self.entity, group)
    }

    /// Queues the entity for destruction at the next `update()`.
    pub fn kill(&mut self) {
        self.registry.kill_entity(self.entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_equality_is_by_id() {
        assert_eq!(Entity::new(1), Entity::new(1));
        assert_ne!(Entity::new(1), Entity::new(2));
        assert!(Entity::new(1) < Entity::new(2));
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(format!("{}", Entity::new(123)), "Entity(123)");
        assert_eq!(Entity::new(5).index(), 5);
    }
}
