//! # Component Store
//!
//! Per-entity signatures plus one lazily-created [`ComponentPool`] per
//! component kind, indexed by [`ComponentKind`](super::ComponentKind).
//!
//! The signature bit and the pool entry for a kind are always changed
//! together, so `has` and `get` never disagree.

use std::any::type_name;

use super::entity::Entity;
use super::pool::{AnyPool, ComponentPool};
use super::signature::{component_kind, Component, Signature, MAX_COMPONENTS};
use crate::error::{EcsError, EcsResult};

/// Component data of every entity in a registry.
///
/// Systems receive a shared reference when the registry asks them to
/// insert an entity, so ordering keys can be read from the entity's data.
pub struct Components {
    /// Type-erased pools, indexed by component kind.
    pools: Vec<Option<Box<dyn AnyPool>>>,
    /// Signature per entity id.
    signatures: Vec<Signature>,
    /// Initial capacity of each new pool.
    pool_capacity: usize,
}

impl Components {
    pub(crate) fn new(expected_entities: usize) -> Self {
        let mut pools = Vec::with_capacity(MAX_COMPONENTS);
        pools.resize_with(MAX_COMPONENTS, || None);
        Self {
            pools,
            signatures: Vec::with_capacity(expected_entities),
            pool_capacity: expected_entities,
        }
    }

    /// Grows the signature table so `entity` has a slot.
    pub(crate) fn ensure_entity(&mut self, entity: Entity) {
        if entity.index() >= self.signatures.len() {
            self.signatures.resize(entity.index() + 1, Signature::EMPTY);
        }
    }

    pub(crate) fn insert<T: Component>(&mut self, entity: Entity, value: T) {
        let kind = component_kind::<T>();
        self.ensure_entity(entity);
        self.pool_mut_or_create::<T>().set(entity.id(), value);
        self.signatures[entity.index()].set(kind);
    }

    /// Returns `true` if the entity had a `T`.
    pub(crate) fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        let kind = component_kind::<T>();
        if !self.signature(entity).test(kind) {
            return false;
        }
        self.signatures[entity.index()].clear(kind);
        if let Some(pool) = self.pools[kind.index()].as_mut() {
            pool.remove_entity(entity.id());
        }
        true
    }

    /// Resets the entity's signature and drops its data from every pool.
    pub(crate) fn clear_entity(&mut self, entity: Entity) {
        for pool in self.pools.iter_mut().flatten() {
            pool.remove_entity(entity.id());
        }
        if let Some(signature) = self.signatures.get_mut(entity.index()) {
            signature.reset();
        }
    }

    fn pool_mut_or_create<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let capacity = self.pool_capacity;
        let slot = &mut self.pools[component_kind::<T>().index()];
        let pool = slot.get_or_insert_with(|| -> Box<dyn AnyPool> {
            tracing::debug!(component = type_name::<T>(), capacity, "created component pool");
            Box::new(ComponentPool::<T>::with_capacity(capacity))
        });
        match pool.as_any_mut().downcast_mut::<ComponentPool<T>>() {
            Some(pool) => pool,
            None => unreachable!("pool slot holds a different component type"),
        }
    }

    /// Signature of `entity`; empty for ids never seen.
    #[inline]
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        self.signatures
            .get(entity.index())
            .copied()
            .unwrap_or(Signature::EMPTY)
    }

    /// Returns `true` if `entity` has a `T`.
    #[inline]
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.signature(entity).test(component_kind::<T>())
    }

    /// The pool for `T`, if any entity ever had one.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        self.pools[component_kind::<T>().index()]
            .as_ref()?
            .as_any()
            .downcast_ref::<ComponentPool<T>>()
    }

    fn pool_mut<T: Component>(&mut self) -> Option<&mut ComponentPool<T>> {
        self.pools[component_kind::<T>().index()]
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
    }

    /// The entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        if !self.has::<T>(entity) {
            return Err(missing::<T>(entity));
        }
        self.pool::<T>()
            .and_then(|pool| pool.get(entity.id()))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// The entity's `T`, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        if !self.has::<T>(entity) {
            return Err(missing::<T>(entity));
        }
        self.pool_mut::<T>()
            .and_then(|pool| pool.get_mut(entity.id()))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Number of pools created so far.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.iter().flatten().count()
    }
}

fn missing<T: Component>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        component: type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Fuel(u16);
    impl Component for Fuel {}

    #[derive(Debug, PartialEq)]
    struct Armor(u16);
    impl Component for Armor {}

    #[test]
    fn test_insert_sets_bit_and_value() {
        let mut store = Components::new(4);
        let e = Entity::new(2);
        store.insert(e, Fuel(30));

        assert!(store.has::<Fuel>(e));
        assert!(!store.has::<Armor>(e));
        assert_eq!(store.get::<Fuel>(e), Ok(&Fuel(30)));
        assert_eq!(store.signature(e).len(), 1);
    }

    #[test]
    fn test_missing_component_is_error() {
        let mut store = Components::new(4);
        let e = Entity::new(0);
        store.insert(e, Fuel(1));

        let err = store.get::<Armor>(e).unwrap_err();
        assert!(matches!(err, EcsError::MissingComponent { entity, .. } if entity == e));
        assert!(store.get::<Fuel>(Entity::new(50)).is_err());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = Components::new(4);
        let e = Entity::new(1);
        store.insert(e, Armor(5));

        assert!(store.remove::<Armor>(e));
        assert!(!store.remove::<Armor>(e));
        assert!(!store.has::<Armor>(e));
        assert_eq!(store.pool::<Armor>().map(ComponentPool::size), Some(0));
    }

    #[test]
    fn test_clear_entity_drops_all_data() {
        let mut store = Components::new(4);
        let a = Entity::new(0);
        let b = Entity::new(1);
        store.insert(a, Fuel(1));
        store.insert(a, Armor(1));
        store.insert(b, Fuel(2));

        store.clear_entity(a);

        assert!(store.signature(a).is_empty());
        assert_eq!(store.pool::<Fuel>().map(ComponentPool::size), Some(1));
        assert_eq!(store.pool::<Armor>().map(ComponentPool::size), Some(0));
        assert_eq!(store.get::<Fuel>(b), Ok(&Fuel(2)));
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut store = Components::new(0);
        let e = Entity::new(3);
        store.insert(e, Fuel(10));
        if let Ok(fuel) = store.get_mut::<Fuel>(e) {
            fuel.0 -= 4;
        }
        assert_eq!(store.get::<Fuel>(e), Ok(&Fuel(6)));
    }
}
