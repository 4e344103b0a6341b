//! Direction keys steer the player.

use std::rc::Rc;

use kestrel_ecs::{EventBus, Registry, System, SystemState};

use crate::components::{KeyboardControl, RigidBody, Sprite};
use crate::config::GameResult;
use crate::events::{InputInbox, Key};

/// Sets velocity and sprite-sheet row from `W`/`A`/`S`/`D`.
///
/// Sprite rows are ordered up, right, down, left.
#[derive(Debug)]
pub struct KeyboardControlSystem {
    state: SystemState,
    inbox: Rc<InputInbox>,
}

impl KeyboardControlSystem {
    /// Requires `KeyboardControl`, `RigidBody` and `Sprite`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SystemState::new()
                .require::<KeyboardControl>()
                .require::<RigidBody>()
                .require::<Sprite>(),
            inbox: Rc::default(),
        }
    }

    /// Starts listening for key presses.
    pub fn subscribe_events(&self, bus: &EventBus) {
        bus.subscribe(&self.inbox, InputInbox::on_key_pressed);
    }

    /// Applies every key received since the last call.
    ///
    /// # Errors
    ///
    /// Fails if a matched entity lost a required component mid-frame.
    pub fn update(&self, registry: &mut Registry) -> GameResult<()> {
        let keys = self.inbox.drain_keys();
        for key in keys {
            let row = match key {
                Key::W => 0.0,
                Key::D => 1.0,
                Key::S => 2.0,
                Key::A => 3.0,
                _ => continue,
            };
            for &entity in self.entities() {
                let control = *registry.get_component::<KeyboardControl>(entity)?;
                registry.get_component_mut::<RigidBody>(entity)?.velocity = match key {
                    Key::W => control.up,
                    Key::D => control.right,
                    Key::S => control.down,
                    _ => control.left,
                };
                let sprite = registry.get_component_mut::<Sprite>(entity)?;
                sprite.src.y = sprite.height * row;
            }
        }
        Ok(())
    }
}

impl Default for KeyboardControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

super::impl_system!(KeyboardControlSystem);
