//! # Gameplay Components
//!
//! Plain data attached to entities. No component has behavior; systems do
//! all the work.
//!
//! Times are milliseconds on the game clock (see `GameLoop::clock_ms`),
//! distances are pixels, velocities are pixels per second.

use std::ops::{Add, AddAssign, Mul};

use bytemuck::{Pod, Zeroable};
use kestrel_ecs::Component;

// =============================================================================
// MATH
// =============================================================================

/// 2D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vec2 {
    /// X (right is positive).
    pub x: f32,
    /// Y (down is positive).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Per-axis sign: -1, 0 or 1.
    #[must_use]
    pub fn signum_or_zero(self) -> Self {
        let axis = |v: f32| {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        };
        Self::new(axis(self.x), axis(self.y))
    }

    /// Per-axis product.
    #[must_use]
    pub fn scaled_by(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns `true` if the two rectangles overlap (touching edges do not).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

// =============================================================================
// COMPONENTS
// =============================================================================

/// Position, scale and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Top-left corner in world space.
    pub position: Vec2,
    /// Per-axis scale applied to sprite and collider sizes.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Transform {
    /// Unscaled, unrotated transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Transform {}

/// Linear velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBody {
    /// Pixels per second.
    pub velocity: Vec2,
}

impl Component for RigidBody {}

/// A textured rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Texture id, resolved by whatever draws the frame.
    pub asset_id: String,
    /// Unscaled width.
    pub width: f32,
    /// Unscaled height.
    pub height: f32,
    /// Draw order; higher is drawn later.
    pub z_index: i32,
    /// Screen-space sprites ignore the camera.
    pub fixed: bool,
    /// Source rectangle inside the texture.
    pub src: Rect,
}

impl Sprite {
    /// World-space sprite showing the texture's top-left `width` x `height`.
    #[must_use]
    pub fn new(asset_id: impl Into<String>, width: f32, height: f32, z_index: i32) -> Self {
        Self {
            asset_id: asset_id.into(),
            width,
            height,
            z_index,
            fixed: false,
            src: Rect::new(0.0, 0.0, width, height),
        }
    }
}

impl Component for Sprite {}

/// Collision box relative to the transform position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxCollider {
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Offset from the transform position.
    pub offset: Vec2,
}

impl BoxCollider {
    /// Box with no offset.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// The box in world space.
    #[must_use]
    pub fn world_rect(&self, transform: &Transform) -> Rect {
        Rect::new(
            transform.position.x + self.offset.x,
            transform.position.y + self.offset.y,
            self.width * transform.scale.x,
            self.height * transform.scale.y,
        )
    }
}

impl Component for BoxCollider {}

/// Hit points as a percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    /// 0 means dead.
    pub percent: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self { percent: 100 }
    }
}

impl Component for Health {}

/// A projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Lifetime.
    pub duration_ms: u64,
    /// Fired by the player side.
    pub friendly: bool,
    /// Health percent removed on hit.
    pub damage: i32,
    /// Game clock at launch.
    pub start_ms: u64,
}

impl Component for Projectile {}

/// Fires projectiles on a timer and on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileEmitter {
    /// Launch speed per axis.
    pub velocity: Vec2,
    /// Timer period; 0 disables timed emission.
    pub interval_ms: u64,
    /// Lifetime of each projectile.
    pub duration_ms: u64,
    /// Whether the projectiles are friendly.
    pub friendly: bool,
    /// Damage per hit.
    pub damage: i32,
    /// Game clock at the last emission.
    pub last_emission_ms: u64,
}

impl Component for ProjectileEmitter {}

/// Velocities applied when the matching direction key is pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyboardControl {
    /// Velocity for `W`.
    pub up: Vec2,
    /// Velocity for `D`.
    pub right: Vec2,
    /// Velocity for `S`.
    pub down: Vec2,
    /// Velocity for `A`.
    pub left: Vec2,
}

impl KeyboardControl {
    /// The same speed in all four directions.
    #[must_use]
    pub const fn uniform(speed: f32) -> Self {
        Self {
            up: Vec2::new(0.0, -speed),
            right: Vec2::new(speed, 0.0),
            down: Vec2::new(0.0, speed),
            left: Vec2::new(-speed, 0.0),
        }
    }
}

impl Component for KeyboardControl {}

/// The camera centers on this entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraFollow;

impl Component for CameraFollow {}

/// Horizontal sprite-sheet animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    /// Frames in the strip.
    pub num_frames: u32,
    /// Frames per second.
    pub frame_rate: u32,
    /// Frame shown now.
    pub current_frame: u32,
    /// Wrap to the first frame after the last.
    pub looping: bool,
    /// Game clock when the animation started.
    pub start_ms: u64,
}

impl Animation {
    /// Looping animation starting at `start_ms`.
    #[must_use]
    pub const fn looping(num_frames: u32, frame_rate: u32, start_ms: u64) -> Self {
        Self {
            num_frames,
            frame_rate,
            current_frame: 0,
            looping: true,
            start_ms,
        }
    }
}

impl Component for Animation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_collider_uses_scale_and_offset() {
        let mut transform = Transform::at(Vec2::new(100.0, 50.0));
        transform.scale = Vec2::new(2.0, 1.0);
        let collider = BoxCollider {
            width: 8.0,
            height: 4.0,
            offset: Vec2::new(1.0, 2.0),
        };
        assert_eq!(
            collider.world_rect(&transform),
            Rect::new(101.0, 52.0, 16.0, 4.0)
        );
    }

    #[test]
    fn test_signum() {
        assert_eq!(Vec2::new(-3.0, 0.0).signum_or_zero(), Vec2::new(-1.0, 0.0));
        assert_eq!(Vec2::new(0.5, 7.0).signum_or_zero(), Vec2::new(1.0, 1.0));
    }
}
