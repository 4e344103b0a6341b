//! Projectile hits.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use kestrel_ecs::{Entity, EventBus, Registry, SystemState};

use crate::components::{BoxCollider, Health, Projectile};
use crate::config::GameResult;
use crate::events::CollisionEvent;
use crate::scene::PLAYER_TAG;

/// Collisions received since the last update.
#[derive(Debug, Default)]
struct CollisionInbox {
    pairs: RefCell<Vec<(Entity, Entity)>>,
}

impl CollisionInbox {
    fn on_collision(&self, event: &mut CollisionEvent) {
        self.pairs.borrow_mut().push((event.a, event.b));
    }
}

/// Turns collisions into damage.
///
/// A friendly projectile damages anything but the player; a hostile one
/// damages only the player. A projectile is spent on its first hit, and a
/// target whose health drops to zero is killed.
#[derive(Debug)]
pub struct DamageSystem {
    state: SystemState,
    inbox: Rc<CollisionInbox>,
}

impl DamageSystem {
    /// Requires `BoxCollider`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<BoxCollider>(),
            inbox: Rc::default(),
        }
    }

    /// Starts listening for collisions.
    pub fn subscribe_events(&self, bus: &EventBus) {
        bus.subscribe(&self.inbox, CollisionInbox::on_collision);
    }

    /// Resolves every collision received since the last call.
    ///
    /// Returns the number of hits applied.
    ///
    /// # Errors
    ///
    /// Fails if a component checked with `has_component` cannot be read.
    pub fn update(&self, registry: &mut Registry) -> GameResult<usize> {
        let pairs = self.inbox.pairs.take();
        let mut spent = HashSet::new();
        let mut hits = 0;

        for (a, b) in pairs {
            let (projectile, target) = if is_projectile(registry, a) && has_health(registry, b) {
                (a, b)
            } else if is_projectile(registry, b) && has_health(registry, a) {
                (b, a)
            } else {
                continue;
            };
            if spent.contains(&projectile) {
                continue;
            }

            let shot = *registry.get_component::<Projectile>(projectile)?;
            if shot.friendly == registry.has_tag(target, PLAYER_TAG) {
                continue;
            }

            spent.insert(projectile);
            registry.kill_entity(projectile);
            hits += 1;

            let health = registry.get_component_mut::<Health>(target)?;
            health.percent -= shot.damage;
            let remaining = health.percent;
            tracing::debug!(%target, damage = shot.damage, remaining, "hit");
            if remaining <= 0 {
                registry.kill_entity(target);
            }
        }
        Ok(hits)
    }
}

fn is_projectile(registry: &Registry, entity: Entity) -> bool {
    registry.is_alive(entity) && registry.has_component::<Projectile>(entity)
}

fn has_health(registry: &Registry, entity: Entity) -> bool {
    registry.is_alive(entity) && registry.has_component::<Health>(entity)
}

impl Default for DamageSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(DamageSystem);
