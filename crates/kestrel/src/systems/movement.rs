//! Applies velocity to position.

use kestrel_ecs::{Registry, System, SystemState};

use crate::components::{RigidBody, Transform};
use crate::config::GameResult;

/// Integrates `RigidBody::velocity` into `Transform::position`.
#[derive(Debug)]
pub struct MovementSystem {
    state: SystemState,
}

impl MovementSystem {
    /// Requires `Transform` and `RigidBody`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<Transform>().require::<RigidBody>(),
        }
    }

    /// Moves every matched entity by `velocity * dt_secs`.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &mut Registry, dt_secs: f32) -> GameResult<()> {
        for &entity in self.entities() {
            let velocity = registry.get_component::<RigidBody>(entity)?.velocity;
            registry.get_component_mut::<Transform>(entity)?.position += velocity * dt_secs;
        }
        Ok(())
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(MovementSystem);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;

    #[test]
    fn test_moves_by_velocity() {
        let mut registry = Registry::new();
        registry.add_system(MovementSystem::new());
        let ship = registry
            .create_entity_mut()
            .add_component(Transform::at(Vec2::new(10.0, 10.0)))
            .add_component(RigidBody {
                velocity: Vec2::new(100.0, -50.0),
            })
            .entity();
        registry.update();

        registry
            .run_system::<MovementSystem, _, _>(|system, registry| system.update(registry, 0.5))
            .unwrap()
            .unwrap();

        assert_eq!(
            registry.get_component::<Transform>(ship).unwrap().position,
            Vec2::new(60.0, -15.0)
        );
    }
}
