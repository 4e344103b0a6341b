//! # KESTREL
//!
//! Headless gameplay built on [`kestrel_ecs`]: plain-data components, the
//! systems that act on them, and the loop that runs a frame.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              GameLoop                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   keys ──> EventBus ──KeyPressedEvent──> keyboard, projectile emit      │
//! │                │                                                        │
//! │                └────CollisionEvent─────> damage                         │
//! │                                                                         │
//! │   Registry ── update() ──> systems in fixed order ──> draw list         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `components`: Data attached to entities
//! - `events`: Key and collision events
//! - `systems`: Per-frame gameplay logic
//! - `scene`: The demo world
//! - `game_loop`: Frame orchestration and timing

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod config;
pub mod events;
pub mod game_loop;
pub mod scene;
pub mod systems;

pub use config::{GameConfig, GameError, GameResult};
pub use events::{CollisionEvent, Key, KeyPressedEvent, MouseButton, MouseClickedEvent};
pub use game_loop::{FrameStats, FrameStatsAccumulator, GameLoop};
pub use scene::{spawn_demo, DemoScene};
pub use systems::{Camera, DrawCommand};
