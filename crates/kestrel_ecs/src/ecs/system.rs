//! # Systems
//!
//! A system is a required [`Signature`] plus the live list of entities that
//! currently satisfy it. The registry owns one instance per system type and
//! keeps every list up to date during `Registry::update()`; the per-frame
//! logic is an ordinary inherent method on the concrete system, called by
//! the frame loop in whatever order gameplay needs.
//!
//! # Example
//!
//! ```rust
//! use kestrel_ecs::{Component, System, SystemState};
//!
//! struct Position(f32, f32);
//! impl Component for Position {}
//! struct Velocity(f32, f32);
//! impl Component for Velocity {}
//!
//! struct MovementSystem {
//!     state: SystemState,
//! }
//!
//! impl MovementSystem {
//!     fn new() -> Self {
//!         Self {
//!             state: SystemState::new()
//!                 .require::<Position>()
//!                 .require::<Velocity>(),
//!         }
//!     }
//! }
//!
//! impl System for MovementSystem {
//!     fn state(&self) -> &SystemState {
//!         &self.state
//!     }
//!
//!     fn state_mut(&mut self) -> &mut SystemState {
//!         &mut self.state
//!     }
//! }
//! ```

use std::any::{type_name, Any};
use std::collections::HashSet;

use super::entity::Entity;
use super::signature::{Component, Signature};
use super::store::Components;

/// Required signature and matched entities of one system.
#[derive(Debug, Default)]
pub struct SystemState {
    /// Component kinds an entity must have.
    required: Signature,
    /// Matched entities in iteration order.
    entities: Vec<Entity>,
    /// Same entities, for O(1) membership tests.
    members: HashSet<Entity>,
}

impl SystemState {
    /// Creates a state that requires nothing and holds no entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T` to the required signature.
    #[must_use]
    pub fn require<T: Component>(mut self) -> Self {
        self.required = self.required.with::<T>();
        self
    }

    /// Required signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.required
    }

    /// Matched entities in iteration order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns `true` if `entity` is currently matched.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    /// Number of matched entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if nothing is matched.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Appends `entity`. Returns `false` if it was already present.
    pub fn push_back(&mut self, entity: Entity) -> bool {
        if !self.members.insert(entity) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Inserts `entity` after every entity whose key is less than or equal
    /// to its own (upper bound), keeping a list sorted by `key_of` without
    /// re-sorting. Returns `false` if it was already present.
    pub fn insert_sorted_by<K, F>(&mut self, entity: Entity, mut key_of: F) -> bool
    where
        K: Ord,
        F: FnMut(Entity) -> K,
    {
        if !self.members.insert(entity) {
            return false;
        }
        let key = key_of(entity);
        let at = self.entities.partition_point(|&other| key_of(other) <= key);
        self.entities.insert(at, entity);
        true
    }

    /// Removes `entity`, preserving the order of the rest.
    ///
    /// Returns `false` if it was not present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.members.remove(&entity) {
            return false;
        }
        if let Some(position) = self.entities.iter().position(|&e| e == entity) {
            self.entities.remove(position);
        }
        true
    }

    /// Drops every matched entity.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.members.clear();
    }
}

/// Downcasting support for boxed systems.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Converts to Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Converts to mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Name of the concrete type, for logs and errors.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// Behavior unit with a required signature.
///
/// Only [`state`](System::state) and [`state_mut`](System::state_mut) are
/// mandatory. Override [`insert_entity`](System::insert_entity) to keep the
/// matched list in a custom order.
pub trait System: AsAny {
    /// The system's signature and matched entities.
    fn state(&self) -> &SystemState;

    /// The system's signature and matched entities, mutably.
    fn state_mut(&mut self) -> &mut SystemState;

    /// Called by the registry when `entity` starts matching.
    ///
    /// The default appends to the back of the list. `components` gives read
    /// access to the entity's data for sort keys.
    fn insert_entity(&mut self, entity: Entity, components: &Components) {
        let _ = components;
        self.state_mut().push_back(entity);
    }

    /// Called by the registry when `entity` stops matching or is killed.
    fn remove_entity(&mut self, entity: Entity) {
        self.state_mut().remove(entity);
    }

    /// Required signature.
    fn signature(&self) -> Signature {
        self.state().signature()
    }

    /// Matched entities in iteration order.
    fn entities(&self) -> &[Entity] {
        self.state().entities()
    }
}

/// Downcasts a type-erased system.
#[must_use]
pub fn downcast_system<'a, S: System>(system: &'a (dyn System + 'static)) -> Option<&'a S> {
    AsAny::as_any(system).downcast_ref::<S>()
}

/// Downcasts a type-erased system mutably.
pub fn downcast_system_mut<'a, S: System>(
    system: &'a mut (dyn System + 'static),
) -> Option<&'a mut S> {
    AsAny::as_any_mut(system).downcast_mut::<S>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rank;
    impl Component for Rank {}

    struct Plain {
        state: SystemState,
    }

    impl System for Plain {
        fn state(&self) -> &SystemState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut SystemState {
            &mut self.state
        }
    }

    #[test]
    fn test_require_builds_signature() {
        let state = SystemState::new().require::<Rank>();
        assert!(state.signature().contains(Signature::of::<Rank>()));
        assert_eq!(state.signature().len(), 1);
    }

    #[test]
    fn test_push_back_is_unique() {
        let mut state = SystemState::new();
        assert!(state.push_back(Entity::new(1)));
        assert!(!state.push_back(Entity::new(1)));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut state = SystemState::new();
        for id in 0..5 {
            state.push_back(Entity::new(id));
        }
        assert!(state.remove(Entity::new(2)));
        assert!(!state.remove(Entity::new(2)));

        let ids: Vec<u32> = state.entities().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_insert_sorted_is_upper_bound() {
        // Key is id / 10, so 11 and 12 share a key with 10.
        let key = |e: Entity| e.id() / 10;
        let mut state = SystemState::new();
        for id in [20, 10, 30, 11, 0, 12] {
            state.insert_sorted_by(Entity::new(id), key);
        }

        let ids: Vec<u32> = state.entities().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![0, 10, 11, 12, 20, 30]);
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let mut boxed: Box<dyn System> = Box::new(Plain {
            state: SystemState::new(),
        });

        assert!(downcast_system::<Plain>(&*boxed).is_some());
        assert!((*boxed).type_name().ends_with("Plain"));

        let plain = downcast_system_mut::<Plain>(&mut *boxed).unwrap();
        plain.state.push_back(Entity::new(9));
        assert_eq!(boxed.entities(), &[Entity::new(9)]);
    }
}
