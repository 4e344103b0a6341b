//! # Headless Demo Binary
//!
//! Runs the demo scene without a window and prints frame statistics.
//!
//! ```text
//! headless [config.toml]
//! ```

use kestrel::{GameConfig, GameLoop, Key};

/// Frames simulated per run.
const FRAMES: u64 = 600;

/// Scripted input: (frame, key).
const SCRIPT: &[(u64, Key)] = &[
    (1, Key::D),
    (30, Key::Space),
    (60, Key::S),
    (90, Key::Space),
    (120, Key::A),
    (150, Key::Space),
    (180, Key::W),
    (240, Key::Slash),
    (242, Key::Slash),
    (300, Key::D),
    (330, Key::Space),
    (FRAMES - 1, Key::Escape),
];

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                std::process::exit(2);
            }
        },
        None => GameConfig::default(),
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                    KESTREL HEADLESS DEMO                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!(
        "  map {}x{}  view {}x{}  {} fps",
        config.map_width, config.map_height, config.view_width, config.view_height, config.target_fps
    );
    println!();

    let mut game = match GameLoop::new(config) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    let scene = game.spawn_demo();
    println!(
        "  spawned player {}, {} enemies, {} tiles",
        scene.player,
        scene.enemies.len(),
        scene.tiles
    );

    let frame_ms = game.config().frame_ms();
    let mut frame = 0;
    while game.is_running() && frame < FRAMES {
        let keys: Vec<Key> = SCRIPT
            .iter()
            .filter(|(at, _)| *at == frame)
            .map(|&(_, key)| key)
            .collect();
        if let Err(err) = game.tick(&keys, frame_ms) {
            eprintln!("frame {frame} failed: {err}");
            std::process::exit(1);
        }
        frame += 1;
    }

    println!(
        "  stopped after {} frames at t={} ms, {} live entities, {} draw bytes",
        game.frame_count(),
        game.clock_ms(),
        game.registry().live_count(),
        game.draw_list_bytes().map_or(0, <[u8]>::len)
    );
    println!();
    game.stats().print_summary();
}
