//! # Gameplay Systems
//!
//! Each system declares its required components in `new()` and exposes an
//! `update` method taking whatever it needs. The frame loop calls them in
//! a fixed order:
//!
//! ```text
//! keyboard → movement → animation → collision → damage → camera
//!          → projectile emit → projectile lifecycle → render
//! ```

/// Implements `System` for a struct with a `state: SystemState` field.
macro_rules! impl_system {
    ($name:ty) => {
        impl kestrel_ecs::System for $name {
            fn state(&self) -> &kestrel_ecs::SystemState {
                &self.state
            }

            fn state_mut(&mut self) -> &mut kestrel_ecs::SystemState {
                &mut self.state
            }
        }
    };
}
pub(crate) use impl_system;

mod animation;
mod camera;
mod collision;
mod damage;
mod keyboard;
mod movement;
mod projectile;
mod render;

pub use animation::AnimationSystem;
pub use camera::{Camera, CameraMovementSystem};
pub use collision::CollisionSystem;
pub use damage::DamageSystem;
pub use keyboard::KeyboardControlSystem;
pub use movement::MovementSystem;
pub use projectile::{ProjectileEmitSystem, ProjectileLifecycleSystem, PROJECTILE_GROUP};
pub use render::{DrawCommand, RenderSystem};
