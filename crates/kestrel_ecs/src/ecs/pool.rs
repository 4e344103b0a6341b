//! # Component Pools
//!
//! Dense, entity-keyed storage for one component kind (sparse-set layout).
//!
//! - `dense` holds the values with no gaps
//! - `slot_of` maps entity id to dense slot
//! - `entity_at` maps dense slot back to entity id
//!
//! The two maps are inverses over the populated slots. Removal swaps the last
//! value into the freed slot, so every operation is O(1) and iteration is a
//! walk over contiguous memory.
//!
//! Removal relocates values: a reference obtained from a pool is invalid
//! after any removal from that same pool. The borrow checker enforces this
//! for safe code.

use std::any::{type_name, Any};
use std::collections::HashMap;

use super::entity::EntityId;
use super::signature::Component;

/// Storage for all values of one component kind.
///
/// # Example
///
/// ```rust
/// use kestrel_ecs::{Component, ComponentPool};
///
/// #[derive(Debug, PartialEq)]
/// struct Health(i32);
/// impl Component for Health {}
///
/// let mut pool = ComponentPool::with_capacity(64);
/// pool.set(3, Health(100));
/// pool.set(9, Health(40));
/// pool.remove(3);
///
/// assert_eq!(pool.size(), 1);
/// assert_eq!(pool.get(9), Some(&Health(40)));
/// ```
pub struct ComponentPool<T: Component> {
    /// Values, densely packed.
    dense: Vec<T>,
    /// Entity id to dense slot.
    slot_of: HashMap<EntityId, usize>,
    /// Dense slot to entity id.
    entity_at: Vec<EntityId>,
}

impl<T: Component> ComponentPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool pre-sized for `capacity` entities.
    ///
    /// Size this to the expected entity count so steady-state frames never
    /// reallocate. Growth past the capacity doubles the backing storage.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            slot_of: HashMap::with_capacity(capacity),
            entity_at: Vec::with_capacity(capacity),
        }
    }

    /// Inserts or overwrites the value stored for `entity`.
    pub fn set(&mut self, entity: EntityId, value: T) {
        if let Some(&slot) = self.slot_of.get(&entity) {
            self.dense[slot] = value;
            return;
        }

        let slot = self.dense.len();
        self.dense.push(value);
        self.entity_at.push(entity);
        self.slot_of.insert(entity, slot);
    }

    /// Removes the value stored for `entity`, returning it.
    ///
    /// Returns `None` (and changes nothing) if there is no value.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slot_of.remove(&entity)?;
        let last = self.dense.len() - 1;

        let value = self.dense.swap_remove(slot);
        self.entity_at.swap_remove(slot);

        if slot != last {
            // The former last value now lives in `slot`.
            let moved = self.entity_at[slot];
            self.slot_of.insert(moved, slot);
        }

        Some(value)
    }

    /// Returns the value stored for `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot_of.get(&entity).map(|&slot| &self.dense[slot])
    }

    /// Returns the value stored for `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        let slot = *self.slot_of.get(&entity)?;
        Some(&mut self.dense[slot])
    }

    /// Returns `true` if a value is stored for `entity`.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot_of.contains_key(&entity)
    }

    /// Number of populated slots.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no slot is populated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Number of values the pool holds before it has to grow.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }

    /// Removes every value, keeping the allocation.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.entity_at.clear();
        self.slot_of.clear();
    }

    /// The values, densely packed.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    /// Iterates over `(entity, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entity_at.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity, value)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entity_at.iter().copied().zip(self.dense.iter_mut())
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased pool, so the registry can hold every kind in one table.
pub trait AnyPool: Any {
    /// Removes the value stored for `entity`, if any.
    ///
    /// Returns `true` if something was removed.
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Number of populated slots.
    fn size(&self) -> usize;

    /// Removes every value.
    fn clear(&mut self);

    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Converts to Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts to mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyPool for ComponentPool<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn size(&self) -> usize {
        self.size()
    }

    fn clear(&mut self) {
        self.clear();
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
