//! # Registry
//!
//! The owning store for entities, component data, systems, tags and groups.
//!
//! ## Deferred reconciliation
//!
//! Component data, signatures, tags and groups change the instant they are
//! written. System membership does not: new entities and entities whose
//! signature changed are queued, and killed entities stay fully usable,
//! until [`Registry::update`] runs once per frame.
//!
//! ```text
//! create_entity / add_component ──> entities_to_add  ──┐
//!                                                      ├──> update()
//! kill_entity ─────────────────────> entities_to_kill ─┘
//! ```
//!
//! Within one `update()` every queued addition is matched against every
//! system first, then every queued kill is fully reconciled (systems, pools,
//! signature, tag, group, id recycling).

use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap, VecDeque};

use super::entity::{Entity, EntityId, EntityMut};
use super::index::{GroupIndex, TagIndex};
use super::signature::Component;
use super::store::Components;
use super::system::{downcast_system, downcast_system_mut, System};
use crate::config::RegistryConfig;
use crate::error::{EcsError, EcsResult};

/// What one [`Registry::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Queued entities matched against every system.
    pub reconciled: usize,
    /// Entities destroyed and released for reuse.
    pub killed: usize,
}

/// The ECS registry.
///
/// # Example
///
/// ```rust
/// use kestrel_ecs::{Component, Registry};
///
/// #[derive(Debug, PartialEq)]
/// struct Position(f32, f32);
/// impl Component for Position {}
///
/// let mut registry = Registry::new();
/// let ship = registry.create_entity();
/// registry.add_component(ship, Position(0.0, 0.0));
/// registry.tag(ship, "player");
/// registry.update();
///
/// assert_eq!(registry.get_component::<Position>(ship), Ok(&Position(0.0, 0.0)));
/// assert_eq!(registry.get_entity_by_tag("player"), Ok(ship));
/// ```
pub struct Registry {
    components: Components,
    /// Ids handed out so far (including recycled ones).
    num_entities: EntityId,
    /// Liveness per entity id.
    live: Vec<bool>,
    live_count: usize,
    entities_to_add: BTreeSet<Entity>,
    entities_to_kill: BTreeSet<Entity>,
    /// Released ids, reused oldest first.
    free_ids: VecDeque<EntityId>,
    systems: HashMap<TypeId, Box<dyn System>>,
    tags: TagIndex,
    groups: GroupIndex,
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Creates a registry pre-sized for `config.expected_entities`.
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            components: Components::new(config.expected_entities),
            num_entities: 0,
            live: Vec::with_capacity(config.expected_entities),
            live_count: 0,
            entities_to_add: BTreeSet::new(),
            entities_to_kill: BTreeSet::new(),
            free_ids: VecDeque::new(),
            systems: HashMap::new(),
            tags: TagIndex::default(),
            groups: GroupIndex::default(),
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity.
    ///
    /// The id comes from the free queue if one was released, else it is
    /// fresh. The entity is live immediately but joins no system until the
    /// next [`update`](Self::update).
    pub fn create_entity(&mut self) -> Entity {
        let id = self.free_ids.pop_front().unwrap_or_else(|| {
            let id = self.num_entities;
            self.num_entities += 1;
            id
        });
        let entity = Entity::new(id);

        self.components.ensure_entity(entity);
        if entity.index() >= self.live.len() {
            self.live.resize(entity.index() + 1, false);
        }
        self.live[entity.index()] = true;
        self.live_count += 1;
        self.entities_to_add.insert(entity);

        tracing::debug!(%entity, "entity created");
        entity
    }

    /// Creates an entity and returns a handle for building it.
    pub fn create_entity_mut(&mut self) -> EntityMut<'_> {
        let entity = self.create_entity();
        EntityMut::new(entity, self)
    }

    /// Returns a handle for operating on `entity`.
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        EntityMut::new(entity, self)
    }

    /// Queues `entity` for destruction at the next [`update`](Self::update).
    ///
    /// Returns `false` (and does nothing) if the entity is not live or is
    /// already queued.
    ///
    /// Handles compare by id only. Once a killed id is recycled, an old
    /// handle to it kills the new holder.
    pub fn kill_entity(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            tracing::debug!(%entity, "kill of non-live entity ignored");
            return false;
        }
        let queued = self.entities_to_kill.insert(entity);
        if queued {
            tracing::debug!(%entity, "entity kill queued");
        }
        queued
    }

    /// Returns `true` if `entity` was created and its kill not yet reconciled.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live.get(entity.index()).copied().unwrap_or(false)
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Number of distinct ids ever handed out.
    #[inline]
    #[must_use]
    pub fn num_entities(&self) -> EntityId {
        self.num_entities
    }

    /// Ids waiting to be reused, oldest first.
    #[must_use]
    pub fn free_id_count(&self) -> usize {
        self.free_ids.len()
    }

    /// Returns `true` if additions or kills are waiting for `update()`.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.entities_to_add.is_empty() || !self.entities_to_kill.is_empty()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `component` to `entity`, overwriting any previous `T`.
    ///
    /// Takes effect immediately for [`get_component`](Self::get_component);
    /// system membership follows at the next `update()`. Ignored (with a
    /// warning) if the entity is not live.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) {
        if !self.is_alive(entity) {
            tracing::warn!(%entity, component = type_name::<T>(), "add_component on non-live entity ignored");
            return;
        }
        self.components.insert(entity, component);
        self.entities_to_add.insert(entity);
    }

    /// Detaches the entity's `T`.
    ///
    /// Returns `false` if it had none; repeating the call is harmless.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) || !self.components.remove::<T>(entity) {
            return false;
        }
        self.entities_to_add.insert(entity);
        true
    }

    /// Returns `true` if the entity has a `T`.
    #[inline]
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// The entity's `T`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.components.get::<T>(entity)
    }

    /// The entity's `T`, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.components.get_mut::<T>(entity)
    }

    /// Read access to all component data.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &Components {
        &self.components
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers `system`, replacing any earlier instance of the same type.
    ///
    /// The system is seeded with every live entity that already went
    /// through `update()` and matches its signature, so the order in which
    /// systems are registered never changes their membership.
    pub fn add_system<S: System>(&mut self, mut system: S) {
        let required = system.signature();
        let mut seeded = 0_usize;
        for id in 0..self.num_entities {
            let entity = Entity::new(id);
            if self.is_alive(entity)
                && !self.entities_to_add.contains(&entity)
                && self.components.signature(entity).contains(required)
            {
                system.insert_entity(entity, &self.components);
                seeded += 1;
            }
        }

        let name = type_name::<S>();
        if self.systems.insert(TypeId::of::<S>(), Box::new(system)).is_some() {
            tracing::warn!(system = name, seeded, "system replaced");
        } else {
            tracing::info!(system = name, seeded, "system registered");
        }
    }

    /// Unregisters the system of type `S`. Returns `false` if there was none.
    pub fn remove_system<S: System>(&mut self) -> bool {
        self.systems.remove(&TypeId::of::<S>()).is_some()
    }

    /// Returns `true` if a system of type `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// The registered system of type `S`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if there is none.
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        self.systems
            .get(&TypeId::of::<S>())
            .and_then(|system| downcast_system::<S>(&**system))
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    /// The registered system of type `S`, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if there is none.
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.systems
            .get_mut(&TypeId::of::<S>())
            .and_then(|system| downcast_system_mut::<S>(&mut **system))
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))
    }

    /// Runs `f` with the system of type `S` and the registry, both mutable.
    ///
    /// This is how per-frame system logic reads its entity list while
    /// writing component data. The system is detached from the registry
    /// for the duration of the call, so `f` must not call
    /// [`update`](Self::update) or look up `S` itself; deferred operations
    /// (creating, killing, adding components) are fine.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotRegistered`] if there is no `S`.
    pub fn run_system<S, F, R>(&mut self, f: F) -> EcsResult<R>
    where
        S: System,
        F: FnOnce(&mut S, &mut Registry) -> R,
    {
        let key = TypeId::of::<S>();
        let mut boxed = self
            .systems
            .remove(&key)
            .ok_or(EcsError::SystemNotRegistered(type_name::<S>()))?;

        let result = match downcast_system_mut::<S>(&mut *boxed) {
            Some(system) => Ok(f(system, self)),
            None => Err(EcsError::SystemNotRegistered(type_name::<S>())),
        };

        // A replacement registered inside `f` wins.
        self.systems.entry(key).or_insert(boxed);
        result
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Applies queued additions and kills. Call once per frame, before any
    /// system runs.
    pub fn update(&mut self) -> UpdateReport {
        let to_add = std::mem::take(&mut self.entities_to_add);
        let to_kill = std::mem::take(&mut self.entities_to_kill);
        let mut report = UpdateReport::default();

        for &entity in &to_add {
            if !self.is_alive(entity) {
                continue;
            }
            let signature = self.components.signature(entity);
            for system in self.systems.values_mut() {
                let matches = signature.contains(system.signature());
                let present = system.state().contains(entity);
                if matches && !present {
                    system.insert_entity(entity, &self.components);
                } else if !matches && present {
                    system.remove_entity(entity);
                }
            }
            report.reconciled += 1;
        }

        for &entity in &to_kill {
            if !self.is_alive(entity) {
                continue;
            }
            for system in self.systems.values_mut() {
                system.remove_entity(entity);
            }
            self.components.clear_entity(entity);
            self.tags.remove(entity);
            self.groups.remove(entity);

            self.live[entity.index()] = false;
            self.live_count -= 1;
            self.free_ids.push_back(entity.id());
            report.killed += 1;
        }

        if report != UpdateReport::default() {
            tracing::debug!(
                reconciled = report.reconciled,
                killed = report.killed,
                live = self.live_count,
                "registry updated"
            );
        }
        report
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Tags `entity`, replacing its previous tag.
    ///
    /// If another entity held `tag` it loses it. Ignored (with a warning)
    /// if the entity is not live.
    pub fn tag(&mut self, entity: Entity, tag: &str) {
        if !self.is_alive(entity) {
            tracing::warn!(%entity, tag, "tag on non-live entity ignored");
            return;
        }
        self.tags.insert(entity, tag);
    }

    /// Returns `true` if `entity` currently carries `tag`.
    #[must_use]
    pub fn has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.tags.has(entity, tag)
    }

    /// The entity carrying `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::TagNotFound`] if no entity carries it.
    pub fn get_entity_by_tag(&self, tag: &str) -> EcsResult<Entity> {
        self.tags
            .entity(tag)
            .ok_or_else(|| EcsError::TagNotFound(tag.to_owned()))
    }

    /// The entity's tag, or `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity is not live.
    pub fn tag_of(&self, entity: Entity) -> EcsResult<Option<&str>> {
        if !self.is_alive(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        Ok(self.tags.tag_of(entity))
    }

    /// Drops the entity's tag. Returns `false` if it had none.
    pub fn remove_tag(&mut self, entity: Entity) -> bool {
        self.tags.remove(entity)
    }

    /// Number of tags in use.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Moves `entity` into `group`, leaving its previous group.
    ///
    /// Ignored (with a warning) if the entity is not live.
    pub fn group(&mut self, entity: Entity, group: &str) {
        if !self.is_alive(entity) {
            tracing::warn!(%entity, group, "group on non-live entity ignored");
            return;
        }
        self.groups.insert(entity, group);
    }

    /// Returns `true` if `entity` belongs to `group`.
    #[must_use]
    pub fn belongs_to_group(&self, entity: Entity, group: &str) -> bool {
        self.groups.contains(entity, group)
    }

    /// Members of `group` in id order. An unknown group has no members.
    #[must_use]
    pub fn get_entities_by_group(&self, group: &str) -> Vec<Entity> {
        self.groups.members(group)
    }

    /// The entity's group, or `None` if it has none.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity is not live.
    pub fn group_of(&self, entity: Entity) -> EcsResult<Option<&str>> {
        if !self.is_alive(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        Ok(self.groups.group_of(entity))
    }

    /// Takes the entity out of its group. No-op if it is in none.
    pub fn remove_entity_group(&mut self, entity: Entity) -> bool {
        self.groups.remove(entity)
    }

    /// Number of non-empty groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.group_count()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
