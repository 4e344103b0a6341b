//! # Gameplay Events
//!
//! Events flow through the shared `EventBus`:
//!
//! ```text
//! frame input ── KeyPressedEvent   ──> keyboard control, projectile emitter
//! frame input ── MouseClickedEvent ──> projectile emitter
//! collision   ── CollisionEvent    ──> damage
//! ```

use std::cell::RefCell;

use kestrel_ecs::{Entity, Event};

/// Keys the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move up.
    W,
    /// Move left.
    A,
    /// Move down.
    S,
    /// Move right.
    D,
    /// Fire.
    Space,
    /// Toggle debug mode.
    Slash,
    /// Quit.
    Escape,
}

/// A key went down this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPressedEvent {
    /// The key.
    pub key: Key,
}

impl Event for KeyPressedEvent {}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Fire.
    Left,
    /// Unused by the demo.
    Middle,
    /// Unused by the demo.
    Right,
}

/// A mouse button went down this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseClickedEvent {
    /// The button.
    pub button: MouseButton,
}

impl Event for MouseClickedEvent {}

/// Two colliders overlap.
///
/// `a` comes before `b` in the collision system's entity list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First entity.
    pub a: Entity,
    /// Second entity.
    pub b: Entity,
}

impl Event for CollisionEvent {}

/// Collects input between system updates.
///
/// Systems that react to input own one behind an `Rc`, subscribe it to the
/// bus, and drain it in their per-frame update.
#[derive(Debug, Default)]
pub struct InputInbox {
    keys: RefCell<Vec<Key>>,
    clicks: RefCell<Vec<MouseButton>>,
}

impl InputInbox {
    /// Key handler.
    pub fn on_key_pressed(&self, event: &mut KeyPressedEvent) {
        self.keys.borrow_mut().push(event.key);
    }

    /// Click handler.
    pub fn on_mouse_clicked(&self, event: &mut MouseClickedEvent) {
        self.clicks.borrow_mut().push(event.button);
    }

    /// Takes every key received so far, oldest first.
    pub fn drain_keys(&self) -> Vec<Key> {
        self.keys.take()
    }

    /// Takes every click received so far, oldest first.
    pub fn drain_clicks(&self) -> Vec<MouseButton> {
        self.clicks.take()
    }
}
