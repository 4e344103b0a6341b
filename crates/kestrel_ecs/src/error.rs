//! # Registry Error Types
//!
//! All errors that can occur in the registry, the component kind table and
//! config loading.
//!
//! Errors here are caller bugs (a system asked for a component its
//! signature never required, a system was never registered) or startup
//! configuration failures. Benign repeats such as removing an absent
//! component or killing an entity twice are not errors at all.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity does not carry the requested component kind.
    #[error("{entity} has no component of kind {component}")]
    MissingComponent {
        /// Entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// No system of the requested kind is registered.
    #[error("system not registered: {0}")]
    SystemNotRegistered(&'static str),

    /// The entity is not live (never created, or already reconciled as killed).
    #[error("{0} does not exist")]
    EntityNotFound(Entity),

    /// No entity carries the requested tag.
    #[error("no entity tagged {0:?}")]
    TagNotFound(String),

    /// More distinct component kinds were requested than a signature can hold.
    #[error("component kind capacity exceeded: at most {capacity} kinds")]
    ComponentCapacityExceeded {
        /// Fixed signature width.
        capacity: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_component_message_names_kind() {
        let err = EcsError::MissingComponent {
            entity: Entity::new(7),
            component: "Velocity",
        };
        assert_eq!(err.to_string(), "Entity(7) has no component of kind Velocity");
    }

    #[test]
    fn test_capacity_message() {
        let err = EcsError::ComponentCapacityExceeded { capacity: 32 };
        assert!(err.to_string().contains("32"));
    }
}
