//! # Tag and Group Indices
//!
//! Tags are one-to-one: an entity has at most one tag and a tag names at
//! most one entity. Groups are one-to-many: an entity is in at most one
//! group, a group holds any number of entities.
//!
//! Both indices keep their forward and reverse maps consistent after every
//! call; neither ever leaves an empty group bucket or a dangling tag behind.

use std::collections::{BTreeSet, HashMap};

use super::entity::Entity;

/// One-to-one entity/tag index.
#[derive(Debug, Default)]
pub(crate) struct TagIndex {
    tag_per_entity: HashMap<Entity, String>,
    entity_per_tag: HashMap<String, Entity>,
}

impl TagIndex {
    /// Gives `entity` the tag `tag`.
    ///
    /// The entity's previous tag is released. If another entity held `tag`,
    /// that entity loses it (last write wins).
    pub(crate) fn insert(&mut self, entity: Entity, tag: &str) {
        if let Some(previous) = self.tag_per_entity.remove(&entity) {
            self.entity_per_tag.remove(&previous);
        }
        if let Some(owner) = self.entity_per_tag.insert(tag.to_owned(), entity) {
            if owner != entity {
                tracing::warn!(tag, %owner, %entity, "tag moved to another entity");
                self.tag_per_entity.remove(&owner);
            }
        }
        self.tag_per_entity.insert(entity, tag.to_owned());
    }

    pub(crate) fn has(&self, entity: Entity, tag: &str) -> bool {
        self.tag_per_entity
            .get(&entity)
            .is_some_and(|current| current == tag)
    }

    pub(crate) fn entity(&self, tag: &str) -> Option<Entity> {
        self.entity_per_tag.get(tag).copied()
    }

    pub(crate) fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.tag_per_entity.get(&entity).map(String::as_str)
    }

    /// Drops the entity's tag. Returns `false` if it had none.
    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        match self.tag_per_entity.remove(&entity) {
            Some(tag) => {
                self.entity_per_tag.remove(&tag);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entity_per_tag.len()
    }
}

/// One-to-many entity/group index.
#[derive(Debug, Default)]
pub(crate) struct GroupIndex {
    group_per_entity: HashMap<Entity, String>,
    entities_per_group: HashMap<String, BTreeSet<Entity>>,
}

impl GroupIndex {
    /// Moves `entity` into `group`, leaving any previous group.
    pub(crate) fn insert(&mut self, entity: Entity, group: &str) {
        self.remove(entity);
        self.entities_per_group
            .entry(group.to_owned())
            .or_default()
            .insert(entity);
        self.group_per_entity.insert(entity, group.to_owned());
    }

    pub(crate) fn contains(&self, entity: Entity, group: &str) -> bool {
        self.entities_per_group
            .get(group)
            .is_some_and(|members| members.contains(&entity))
    }

    /// Members of `group` in id order; empty for an unknown group.
    pub(crate) fn members(&self, group: &str) -> Vec<Entity> {
        self.entities_per_group
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn group_of(&self, entity: Entity) -> Option<&str> {
        self.group_per_entity.get(&entity).map(String::as_str)
    }

    /// Takes the entity out of its group. No-op if it is in none.
    ///
    /// Returns `true` if it was in a group.
    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        let Some(group) = self.group_per_entity.remove(&entity) else {
            return false;
        };
        if let Some(members) = self.entities_per_group.get_mut(&group) {
            members.remove(&entity);
            if members.is_empty() {
                self.entities_per_group.remove(&group);
            }
        }
        true
    }

    pub(crate) fn group_count(&self) -> usize {
        self.entities_per_group.len()
    }
}
