//! Projectile emission and expiry.

use std::rc::Rc;

use kestrel_ecs::{Entity, EventBus, Registry, System, SystemState};

use crate::components::{
    BoxCollider, Projectile, ProjectileEmitter, RigidBody, Sprite, Transform, Vec2,
};
use crate::config::GameResult;
use crate::events::{InputInbox, Key, MouseButton};

/// Group every emitted projectile joins.
pub const PROJECTILE_GROUP: &str = "projectiles";

/// Side length of a projectile's sprite and collider.
const PROJECTILE_SIZE: f32 = 4.0;

/// Draw order of projectiles.
const PROJECTILE_Z: i32 = 4;

/// Fires projectiles from every emitter.
///
/// Timed emitters fire straight along `ProjectileEmitter::velocity` every
/// `interval_ms`. `Space` or a left click makes every emitter fire along
/// the direction its own `RigidBody` is moving.
#[derive(Debug)]
pub struct ProjectileEmitSystem {
    state: SystemState,
    inbox: Rc<InputInbox>,
}

impl ProjectileEmitSystem {
    /// Requires `ProjectileEmitter` and `Transform`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new()
                .require::<ProjectileEmitter>()
                .require::<Transform>(),
            inbox: Rc::default(),
        }
    }

    /// Starts listening for the fire key and the fire button.
    pub fn subscribe_events(&self, bus: &EventBus) {
        bus.subscribe(&self.inbox, InputInbox::on_key_pressed);
        bus.subscribe(&self.inbox, InputInbox::on_mouse_clicked);
    }

    /// Fires every emitter that is due, or all of them if `Space` or the
    /// left button was pressed since the last call.
    ///
    /// Returns the number of projectiles created.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &mut Registry, now_ms: u64) -> GameResult<usize> {
        let key_fire = self.inbox.drain_keys().contains(&Key::Space);
        let click_fire = self.inbox.drain_clicks().contains(&MouseButton::Left);
        let fire_pressed = key_fire || click_fire;
        let mut fired = 0;

        for &entity in self.entities() {
            let emitter = *registry.get_component::<ProjectileEmitter>(entity)?;
            let due = emitter.interval_ms != 0
                && now_ms.saturating_sub(emitter.last_emission_ms) > emitter.interval_ms;

            if fire_pressed {
                emit_from(registry, entity, now_ms, true)?;
                fired += 1;
            } else if due {
                emit_from(registry, entity, now_ms, false)?;
                fired += 1;
            }
        }
        Ok(fired)
    }
}

/// Spawns one projectile at the center of `entity`.
fn emit_from(
    registry: &mut Registry,
    entity: Entity,
    now_ms: u64,
    aimed: bool,
) -> GameResult<Entity> {
    let emitter = *registry.get_component::<ProjectileEmitter>(entity)?;
    let transform = *registry.get_component::<Transform>(entity)?;

    let mut position = transform.position;
    if let Ok(sprite) = registry.get_component::<Sprite>(entity) {
        position += Vec2::new(sprite.width / 2.0, sprite.height / 2.0);
    }

    let velocity = if aimed {
        let heading = registry
            .get_component::<RigidBody>(entity)
            .map_or(Vec2::ZERO, |body| body.velocity.signum_or_zero());
        emitter.velocity.scaled_by(heading)
    } else {
        emitter.velocity
    };

    let projectile = registry
        .create_entity_mut()
        .group(PROJECTILE_GROUP)
        .add_component(Transform {
            position,
            ..transform
        })
        .add_component(RigidBody { velocity })
        .add_component(Sprite::new("bullet", PROJECTILE_SIZE, PROJECTILE_SIZE, PROJECTILE_Z))
        .add_component(BoxCollider::new(PROJECTILE_SIZE, PROJECTILE_SIZE))
        .add_component(Projectile {
            duration_ms: emitter.duration_ms,
            friendly: emitter.friendly,
            damage: emitter.damage,
            start_ms: now_ms,
        })
        .entity();

    registry.get_component_mut::<ProjectileEmitter>(entity)?.last_emission_ms = now_ms;
    tracing::debug!(%entity, %projectile, aimed, "projectile emitted");
    Ok(projectile)
}

impl Default for ProjectileEmitSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(ProjectileEmitSystem);

/// Kills projectiles that outlived their duration or left the map.
#[derive(Debug)]
pub struct ProjectileLifecycleSystem {
    state: SystemState,
}

impl ProjectileLifecycleSystem {
    /// Requires `Projectile` and `Transform`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<Projectile>().require::<Transform>(),
        }
    }

    /// Queues expired and out-of-map projectiles for destruction.
    ///
    /// Returns the number of kills queued.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(
        &self,
        registry: &mut Registry,
        now_ms: u64,
        map_width: f32,
        map_height: f32,
    ) -> GameResult<usize> {
        let mut killed = 0;
        for &entity in self.entities() {
            let projectile = registry.get_component::<Projectile>(entity)?;
            let expired = now_ms > projectile.start_ms + projectile.duration_ms;
            let position = registry.get_component::<Transform>(entity)?.position;
            let outside = position.x < 0.0
                || position.x > map_width
                || position.y < 0.0
                || position.y > map_height;

            if (expired || outside) && registry.kill_entity(entity) {
                killed += 1;
            }
        }
        Ok(killed)
    }
}

impl Default for ProjectileLifecycleSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(ProjectileLifecycleSystem);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyPressedEvent, MouseClickedEvent};

    fn turret(registry: &mut Registry, interval_ms: u64) -> Entity {
        registry
            .create_entity_mut()
            .add_component(Transform::at(Vec2::new(100.0, 100.0)))
            .add_component(Sprite::new("tank", 32.0, 32.0, 1))
            .add_component(ProjectileEmitter {
                velocity: Vec2::new(0.0, 120.0),
                interval_ms,
                duration_ms: 2_000,
                friendly: false,
                damage: 10,
                last_emission_ms: 0,
            })
            .entity()
    }

    fn emit(registry: &mut Registry, now_ms: u64) -> usize {
        registry
            .run_system::<ProjectileEmitSystem, _, _>(|system, registry| {
                system.update(registry, now_ms)
            })
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_timed_emission() {
        let mut registry = Registry::new();
        registry.add_system(ProjectileEmitSystem::new());
        let tank = turret(&mut registry, 1_000);
        registry.update();

        assert_eq!(emit(&mut registry, 500), 0);
        assert_eq!(emit(&mut registry, 1_001), 1);
        assert_eq!(emit(&mut registry, 1_500), 0);

        let shots = registry.get_entities_by_group(PROJECTILE_GROUP);
        assert_eq!(shots.len(), 1);
        let shot = shots[0];
        assert_eq!(
            registry.get_component::<Transform>(shot).unwrap().position,
            Vec2::new(116.0, 116.0)
        );
        assert_eq!(
            registry.get_component::<RigidBody>(shot).unwrap().velocity,
            Vec2::new(0.0, 120.0)
        );
        assert_eq!(
            registry.get_component::<ProjectileEmitter>(tank).unwrap().last_emission_ms,
            1_001
        );
    }

    #[test]
    fn test_fire_key_aims_along_heading() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let system = ProjectileEmitSystem::new();
        system.subscribe_events(&bus);
        registry.add_system(system);

        let chopper = turret(&mut registry, 0);
        registry.add_component(
            chopper,
            RigidBody {
                velocity: Vec2::new(-30.0, 0.0),
            },
        );
        registry
            .get_component_mut::<ProjectileEmitter>(chopper)
            .unwrap()
            .velocity = Vec2::new(200.0, 200.0);
        registry.update();

        assert_eq!(emit(&mut registry, 100), 0);
        let _ = bus.emit(KeyPressedEvent { key: Key::Space });
        assert_eq!(emit(&mut registry, 200), 1);

        let shot = registry.get_entities_by_group(PROJECTILE_GROUP)[0];
        assert_eq!(
            registry.get_component::<RigidBody>(shot).unwrap().velocity,
            Vec2::new(-200.0, 0.0)
        );
    }

    #[test]
    fn test_left_click_fires_like_space() {
        let bus = EventBus::new();
        let mut registry = Registry::new();
        let system = ProjectileEmitSystem::new();
        system.subscribe_events(&bus);
        registry.add_system(system);

        let chopper = turret(&mut registry, 0);
        registry.add_component(
            chopper,
            RigidBody {
                velocity: Vec2::new(0.0, 25.0),
            },
        );
        registry.update();

        let _ = bus.emit(MouseClickedEvent {
            button: MouseButton::Right,
        });
        assert_eq!(emit(&mut registry, 100), 0);

        let _ = bus.emit(MouseClickedEvent {
            button: MouseButton::Left,
        });
        let _ = bus.emit(MouseClickedEvent {
            button: MouseButton::Left,
        });
        assert_eq!(emit(&mut registry, 200), 1);
        assert_eq!(emit(&mut registry, 300), 0);

        let shot = registry.get_entities_by_group(PROJECTILE_GROUP)[0];
        assert_eq!(
            registry.get_component::<RigidBody>(shot).unwrap().velocity,
            Vec2::new(0.0, 120.0)
        );
    }

    #[test]
    fn test_lifecycle_kills_expired_and_escaped() {
        let mut registry = Registry::new();
        registry.add_system(ProjectileLifecycleSystem::new());
        let spawn = |registry: &mut Registry, x: f32, start_ms: u64| {
            registry
                .create_entity_mut()
                .add_component(Transform::at(Vec2::new(x, 10.0)))
                .add_component(Projectile {
                    duration_ms: 100,
                    friendly: true,
                    damage: 1,
                    start_ms,
                })
                .entity()
        };
        let fresh = spawn(&mut registry, 10.0, 950);
        let old = spawn(&mut registry, 10.0, 0);
        let escaped = spawn(&mut registry, 500.0, 950);
        registry.update();

        let killed = registry
            .run_system::<ProjectileLifecycleSystem, _, _>(|system, registry| {
                system.update(registry, 1_000, 400.0, 300.0)
            })
            .unwrap()
            .unwrap();
        registry.update();

        assert_eq!(killed, 2);
        assert!(registry.is_alive(fresh));
        assert!(!registry.is_alive(old));
        assert!(!registry.is_alive(escaped));
    }
}
