//! # Demo Scene
//!
//! A tiled map, a keyboard-driven chopper tagged `player`, a screen-space
//! radar tagged `radar`, and a few armed vehicles grouped as `enemies`.

use kestrel_ecs::{Entity, Registry};

use crate::components::{
    Animation, BoxCollider, CameraFollow, Health, KeyboardControl, ProjectileEmitter, RigidBody,
    Sprite, Transform, Vec2,
};
use crate::config::GameConfig;

/// Tag of the player entity.
pub const PLAYER_TAG: &str = "player";

/// Tag of the radar overlay.
pub const RADAR_TAG: &str = "radar";

/// Group of every hostile vehicle.
pub const ENEMY_GROUP: &str = "enemies";

/// Group of every map tile.
pub const TILE_GROUP: &str = "tiles";

/// Tile edge length in pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Handles to what the demo scene created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoScene {
    /// The chopper.
    pub player: Entity,
    /// The radar overlay.
    pub radar: Entity,
    /// Hostile vehicles.
    pub enemies: Vec<Entity>,
    /// Number of map tiles.
    pub tiles: usize,
}

/// Populates `registry` with the demo scene. Entities join systems at the
/// next `update()`.
pub fn spawn_demo(registry: &mut Registry, config: &GameConfig, now_ms: u64) -> DemoScene {
    let tiles = spawn_tiles(registry, config);

    let player = registry
        .create_entity_mut()
        .tag(PLAYER_TAG)
        .add_component(Transform::at(Vec2::new(240.0, 110.0)))
        .add_component(RigidBody::default())
        .add_component(Sprite::new("chopper", 32.0, 32.0, 2))
        .add_component(Animation::looping(2, 10, now_ms))
        .add_component(BoxCollider::new(32.0, 32.0))
        .add_component(KeyboardControl::uniform(80.0))
        .add_component(CameraFollow)
        .add_component(Health::default())
        .add_component(ProjectileEmitter {
            velocity: Vec2::new(150.0, 150.0),
            interval_ms: 0,
            duration_ms: 10_000,
            friendly: true,
            damage: 10,
            last_emission_ms: now_ms,
        })
        .entity();

    let mut radar_sprite = Sprite::new("radar", 64.0, 64.0, 10);
    radar_sprite.fixed = true;
    let radar = registry
        .create_entity_mut()
        .tag(RADAR_TAG)
        .add_component(Transform::at(Vec2::new(config.view_width - 74.0, 10.0)))
        .add_component(radar_sprite)
        .add_component(Animation::looping(8, 5, now_ms))
        .entity();

    let enemies = [
        (Vec2::new(500.0, 500.0), Vec2::new(0.0, -50.0)),
        (Vec2::new(115.0, 465.0), Vec2::new(0.0, -50.0)),
        (Vec2::new(617.0, 113.0), Vec2::new(-50.0, 0.0)),
    ]
    .into_iter()
    .map(|(position, heading)| {
        registry
            .create_entity_mut()
            .group(ENEMY_GROUP)
            .add_component(Transform::at(position))
            .add_component(RigidBody { velocity: Vec2::ZERO })
            .add_component(Sprite::new("tank", 32.0, 32.0, 1))
            .add_component(BoxCollider::new(25.0, 20.0))
            .add_component(Health::default())
            .add_component(ProjectileEmitter {
                velocity: heading * 2.0,
                interval_ms: 3_000,
                duration_ms: 5_000,
                friendly: false,
                damage: 10,
                last_emission_ms: now_ms,
            })
            .entity()
    })
    .collect();

    tracing::info!(%player, %radar, tiles, "demo scene spawned");
    DemoScene {
        player,
        radar,
        enemies,
        tiles,
    }
}

fn spawn_tiles(registry: &mut Registry, config: &GameConfig) -> usize {
    let mut count = 0;
    let mut y = 0.0;
    while y < config.map_height {
        let mut x = 0.0;
        while x < config.map_width {
            let mut sprite = Sprite::new("jungle", TILE_SIZE, TILE_SIZE, 0);
            // Alternate two tiles of the sheet so the map is not uniform.
            if count % 3 == 0 {
                sprite.src.x = TILE_SIZE;
            }
            registry
                .create_entity_mut()
                .group(TILE_GROUP)
                .add_component(Transform::at(Vec2::new(x, y)))
                .add_component(sprite);
            count += 1;
            x += TILE_SIZE;
        }
        y += TILE_SIZE;
    }
    count
}
