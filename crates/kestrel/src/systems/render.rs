//! # Render System
//!
//! Produces the frame's draw list. Nothing here touches a GPU: the list is
//! a flat array of `#[repr(C)]` commands a backend can upload as-is with
//! [`RenderSystem::as_bytes`].
//!
//! Entities are kept sorted by `Sprite::z_index` as they join, ties in
//! arrival order, so building the list never sorts.

use bytemuck::{Pod, Zeroable};
use kestrel_ecs::{Components, Entity, Registry, System, SystemState};

use super::camera::Camera;
use crate::components::{Rect, Sprite, Transform};
use crate::config::GameResult;

/// One textured quad.
///
/// Total size: 40 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawCommand {
    /// Entity the quad belongs to; the backend resolves its texture.
    pub entity: u32,
    /// Draw order.
    pub z_index: i32,
    /// Source rectangle inside the texture.
    pub src: Rect,
    /// Destination rectangle in screen space.
    pub dst: Rect,
}

impl DrawCommand {
    /// Size of one command in bytes.
    pub const SIZE: usize = 40;
}

/// Builds the z-ordered draw list.
#[derive(Debug)]
pub struct RenderSystem {
    state: SystemState,
    commands: Vec<DrawCommand>,
}

impl RenderSystem {
    /// Requires `Transform` and `Sprite`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new().require::<Transform>().require::<Sprite>(),
            commands: Vec::new(),
        }
    }

    /// Rebuilds the draw list for `camera`, skipping sprites outside it.
    ///
    /// Returns the number of commands.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&mut self, registry: &Registry, camera: &Camera) -> GameResult<usize> {
        self.commands.clear();
        for &entity in self.state.entities() {
            let transform = registry.get_component::<Transform>(entity)?;
            let sprite = registry.get_component::<Sprite>(entity)?;

            let (offset_x, offset_y) = if sprite.fixed {
                (0.0, 0.0)
            } else {
                (camera.view.x, camera.view.y)
            };
            let dst = Rect::new(
                transform.position.x - offset_x,
                transform.position.y - offset_y,
                sprite.width * transform.scale.x,
                sprite.height * transform.scale.y,
            );
            let screen = Rect::new(0.0, 0.0, camera.view.w, camera.view.h);
            if !sprite.fixed && !dst.intersects(&screen) {
                continue;
            }

            self.commands.push(DrawCommand {
                entity: entity.id(),
                z_index: sprite.z_index,
                src: sprite.src,
                dst,
            });
        }
        Ok(self.commands.len())
    }

    /// The last draw list, back to front.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// The last draw list as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.commands)
    }
}

impl Default for RenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RenderSystem {
    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn insert_entity(&mut self, entity: Entity, components: &Components) {
        self.state.insert_sorted_by(entity, |e| {
            components
                .get::<Sprite>(e)
                .map_or(i32::MIN, |sprite| sprite.z_index)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;

    fn sprite_at(registry: &mut Registry, x: f32, z_index: i32) -> Entity {
        registry
            .create_entity_mut()
            .add_component(Transform::at(Vec2::new(x, 0.0)))
            .add_component(Sprite::new("tile", 32.0, 32.0, z_index))
            .entity()
    }

    #[test]
    fn test_draw_list_is_z_sorted() {
        let mut registry = Registry::new();
        registry.add_system(RenderSystem::new());
        let top = sprite_at(&mut registry, 0.0, 5);
        let bottom = sprite_at(&mut registry, 10.0, 0);
        let middle = sprite_at(&mut registry, 20.0, 2);
        registry.update();

        let camera = Camera::new(100.0, 100.0, 1_000.0, 1_000.0);
        let count = registry
            .run_system::<RenderSystem, _, _>(|system, registry| system.update(registry, &camera))
            .unwrap()
            .unwrap();
        assert_eq!(count, 3);

        let render = registry.get_system::<RenderSystem>().unwrap();
        let order: Vec<u32> = render.commands().iter().map(|c| c.entity).collect();
        assert_eq!(order, vec![bottom.id(), middle.id(), top.id()]);
        assert_eq!(render.as_bytes().len(), 3 * DrawCommand::SIZE);
    }

    #[test]
    fn test_offscreen_sprites_are_culled() {
        let mut registry = Registry::new();
        registry.add_system(RenderSystem::new());
        let visible = sprite_at(&mut registry, 50.0, 0);
        let _hidden = sprite_at(&mut registry, 500.0, 0);
        let hud = sprite_at(&mut registry, 900.0, 9);
        if let Ok(sprite) = registry.get_component_mut::<Sprite>(hud) {
            sprite.fixed = true;
        }
        registry.update();

        let mut camera = Camera::new(100.0, 100.0, 1_000.0, 1_000.0);
        camera.center_on(60.0, 50.0);

        let render = registry
            .run_system::<RenderSystem, _, _>(|system, registry| {
                system.update(registry, &camera).map(|_| system.commands().to_vec())
            })
            .unwrap()
            .unwrap();

        let ids: Vec<u32> = render.iter().map(|c| c.entity).collect();
        assert_eq!(ids, vec![visible.id(), hud.id()]);
        assert_eq!(render[0].dst.x, 40.0);
    }
}
