//! Box-collider overlap detection.

use kestrel_ecs::{Entity, EventBus, Registry, System, SystemState};

use crate::components::{BoxCollider, Rect, Transform};
use crate::config::GameResult;
use crate::events::CollisionEvent;

/// Emits one [`CollisionEvent`] per overlapping pair, every frame the
/// pair overlaps.
#[derive(Debug)]
pub struct CollisionSystem {
    state: SystemState,
}

impl CollisionSystem {
    /// Requires `Transform` and `BoxCollider`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<Transform>().require::<BoxCollider>(),
        }
    }

    /// Tests all pairs and emits a collision for each overlap.
    ///
    /// Returns the number of collisions emitted.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &Registry, bus: &EventBus) -> GameResult<usize> {
        let boxes = self
            .entities()
            .iter()
            .map(|&entity| -> GameResult<(Entity, Rect)> {
                let transform = registry.get_component::<Transform>(entity)?;
                let collider = registry.get_component::<BoxCollider>(entity)?;
                Ok((entity, collider.world_rect(transform)))
            })
            .collect::<GameResult<Vec<_>>>()?;

        let mut collisions = 0;
        for (i, (a, rect_a)) in boxes.iter().enumerate() {
            for (b, rect_b) in &boxes[i + 1..] {
                if rect_a.intersects(rect_b) {
                    let _ = bus.emit(CollisionEvent { a: *a, b: *b });
                    collisions += 1;
                }
            }
        }
        if collisions > 0 {
            tracing::debug!(collisions, "collisions emitted");
        }
        Ok(collisions)
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(CollisionSystem);
