//! Sprite-sheet animation.

use kestrel_ecs::{Registry, System, SystemState};

use crate::components::{Animation, Sprite};
use crate::config::GameResult;

/// Picks the current frame from the game clock and moves the sprite's
/// source rectangle onto it.
#[derive(Debug)]
pub struct AnimationSystem {
    state: SystemState,
}

impl AnimationSystem {
    /// Requires `Sprite` and `Animation`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<Sprite>().require::<Animation>(),
        }
    }

    /// Advances every matched animation to `now_ms`.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &mut Registry, now_ms: u64) -> GameResult<()> {
        for &entity in self.entities() {
            let animation = registry.get_component_mut::<Animation>(entity)?;
            let frame = frame_at(animation, now_ms);
            animation.current_frame = frame;

            let sprite = registry.get_component_mut::<Sprite>(entity)?;
            sprite.src.x = frame as f32 * sprite.width;
        }
        Ok(())
    }
}

fn frame_at(animation: &Animation, now_ms: u64) -> u32 {
    if animation.num_frames == 0 {
        return 0;
    }
    let elapsed = now_ms.saturating_sub(animation.start_ms);
    let frames = elapsed * u64::from(animation.frame_rate) / 1000;
    let last = u64::from(animation.num_frames - 1);
    let frame = if animation.looping {
        frames % u64::from(animation.num_frames)
    } else {
        frames.min(last)
    };
    u32::try_from(frame).unwrap_or(0)
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(AnimationSystem);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wraps_when_looping() {
        let animation = Animation::looping(2, 10, 1_000);
        assert_eq!(frame_at(&animation, 1_000), 0);
        assert_eq!(frame_at(&animation, 1_150), 1);
        assert_eq!(frame_at(&animation, 1_200), 0);
    }

    #[test]
    fn test_frame_holds_when_not_looping() {
        let mut animation = Animation::looping(3, 10, 0);
        animation.looping = false;
        assert_eq!(frame_at(&animation, 10_000), 2);
    }

    #[test]
    fn test_updates_source_rect() {
        let mut registry = Registry::new();
        registry.add_system(AnimationSystem::new());
        let radar = registry
            .create_entity_mut()
            .add_component(Sprite::new("radar", 64.0, 64.0, 2))
            .add_component(Animation::looping(8, 5, 0))
            .entity();
        registry.update();

        registry
            .run_system::<AnimationSystem, _, _>(|system, registry| system.update(registry, 1_000))
            .unwrap()
            .unwrap();

        assert_eq!(registry.get_component::<Animation>(radar).unwrap().current_frame, 5);
        assert_eq!(registry.get_component::<Sprite>(radar).unwrap().src.x, 320.0);
    }
}
