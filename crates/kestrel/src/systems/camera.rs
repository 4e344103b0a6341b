//! Camera follow.

use kestrel_ecs::{Registry, System, SystemState};

use crate::components::{CameraFollow, Rect, Transform};
use crate::config::GameResult;

/// The visible part of the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Visible rectangle in world space.
    pub view: Rect,
    /// World width the view is clamped to.
    pub map_width: f32,
    /// World height the view is clamped to.
    pub map_height: f32,
}

impl Camera {
    /// Camera at the world origin.
    #[must_use]
    pub fn new(view_width: f32, view_height: f32, map_width: f32, map_height: f32) -> Self {
        Self {
            view: Rect::new(0.0, 0.0, view_width, view_height),
            map_width,
            map_height,
        }
    }

    /// Centers the view on `x`, `y`, keeping it inside the map.
    pub fn center_on(&mut self, x: f32, y: f32) {
        let max_x = (self.map_width - self.view.w).max(0.0);
        let max_y = (self.map_height - self.view.h).max(0.0);
        self.view.x = (x - self.view.w / 2.0).clamp(0.0, max_x);
        self.view.y = (y - self.view.h / 2.0).clamp(0.0, max_y);
    }
}

/// Keeps the camera on the entity carrying `CameraFollow`.
///
/// With several followed entities the last one in the list wins.
#[derive(Debug)]
pub struct CameraMovementSystem {
    state: SystemState,
}

impl CameraMovementSystem {
    /// Requires `CameraFollow` and `Transform`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<CameraFollow>().require::<Transform>(),
        }
    }

    /// Moves `camera` onto the followed entity.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &Registry, camera: &mut Camera) -> GameResult<()> {
        for &entity in self.entities() {
            let position = registry.get_component::<Transform>(entity)?.position;
            camera.center_on(position.x, position.y);
        }
        Ok(())
    }
}

impl Default for CameraMovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(CameraMovementSystem);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_is_clamped_to_map() {
        let mut camera = Camera::new(100.0, 50.0, 400.0, 200.0);

        camera.center_on(10.0, 10.0);
        assert_eq!((camera.view.x, camera.view.y), (0.0, 0.0));

        camera.center_on(200.0, 100.0);
        assert_eq!((camera.view.x, camera.view.y), (150.0, 75.0));

        camera.center_on(1_000.0, 1_000.0);
        assert_eq!((camera.view.x, camera.view.y), (300.0, 150.0));
    }

    #[test]
    fn test_view_larger_than_map_stays_at_origin() {
        let mut camera = Camera::new(500.0, 500.0, 100.0, 100.0);
        camera.center_on(50.0, 50.0);
        assert_eq!((camera.view.x, camera.view.y), (0.0, 0.0));
    }
}
