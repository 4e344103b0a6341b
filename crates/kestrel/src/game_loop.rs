//! # KESTREL Game Loop
//!
//! One call to [`GameLoop::tick`] is one frame:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. INPUT                                                            │
//! │    ├─ Clamp dt, advance the game clock                              │
//! │    └─ Emit KeyPressedEvent per key (Escape quits, Slash debugs)     │
//! │                                                                     │
//! │ 2. RECONCILE                                                        │
//! │    └─ registry.update(): pending adds join systems, kills vanish    │
//! │                                                                     │
//! │ 3. LOGIC                                                            │
//! │    ├─ keyboard → movement → animation                               │
//! │    ├─ collision (emits CollisionEvent) → damage                     │
//! │    └─ camera → projectile emit → projectile lifecycle               │
//! │                                                                     │
//! │ 4. RENDER                                                           │
//! │    └─ z-sorted draw list relative to the camera                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities created or killed during LOGIC are invisible to systems until
//! the next frame's RECONCILE.

use std::rc::Rc;
use std::time::{Duration, Instant};

use kestrel_ecs::{EventBus, Registry};

use crate::config::{GameConfig, GameResult};
use crate::events::{Key, KeyPressedEvent};
use crate::scene::{self, DemoScene};
use crate::systems::{
    AnimationSystem, Camera, CameraMovementSystem, CollisionSystem, DamageSystem, DrawCommand,
    KeyboardControlSystem, MovementSystem, ProjectileEmitSystem, ProjectileLifecycleSystem,
    RenderSystem,
};

/// Per-frame counters and timings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Simulated step after clamping.
    pub dt_ms: u64,
    /// Wall time of the whole tick in microseconds.
    pub total_us: u64,
    /// Wall time of reconciliation plus logic systems.
    pub logic_us: u64,
    /// Wall time of the render pass.
    pub render_us: u64,
    /// Entities reconciled into systems.
    pub reconciled: usize,
    /// Entities destroyed by reconciliation.
    pub killed: usize,
    /// Overlapping collider pairs.
    pub collisions: usize,
    /// Projectile hits applied.
    pub hits: usize,
    /// Projectiles created.
    pub projectiles_fired: usize,
    /// Projectiles queued for expiry.
    pub projectiles_expired: usize,
    /// Entries in the draw list.
    pub draw_commands: usize,
}

/// Owns the world and runs frames.
pub struct GameLoop {
    registry: Registry,
    bus: Rc<EventBus>,
    camera: Camera,
    config: GameConfig,
    clock_ms: u64,
    frame_count: u64,
    running: bool,
    debug: bool,
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Validates `config` and registers every gameplay system.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`](crate::GameError::InvalidConfig)
    /// if the config fails validation.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;

        let mut registry = Registry::with_config(&config.registry);
        let bus = Rc::new(EventBus::new());

        let keyboard = KeyboardControlSystem::new();
        keyboard.subscribe_events(&bus);
        let damage = DamageSystem::new();
        damage.subscribe_events(&bus);
        let emitter = ProjectileEmitSystem::new();
        emitter.subscribe_events(&bus);

        registry.add_system(keyboard);
        registry.add_system(MovementSystem::new());
        registry.add_system(AnimationSystem::new());
        registry.add_system(CollisionSystem::new());
        registry.add_system(damage);
        registry.add_system(CameraMovementSystem::new());
        registry.add_system(emitter);
        registry.add_system(ProjectileLifecycleSystem::new());
        registry.add_system(RenderSystem::new());

        let camera = Camera::new(
            config.view_width,
            config.view_height,
            config.map_width,
            config.map_height,
        );
        let budget = Duration::from_millis(config.frame_ms());

        tracing::info!(
            systems = registry.system_count(),
            budget_ms = config.frame_ms(),
            "game loop ready"
        );

        Ok(Self {
            registry,
            bus,
            camera,
            debug: config.debug,
            config,
            clock_ms: 0,
            frame_count: 0,
            running: true,
            stats_accumulator: FrameStatsAccumulator::new(budget),
        })
    }

    /// Populates the world with the demo scene at the current clock.
    pub fn spawn_demo(&mut self) -> DemoScene {
        scene::spawn_demo(&mut self.registry, &self.config, self.clock_ms)
    }

    /// Runs one frame with the keys pressed since the previous one.
    ///
    /// `dt_ms` is clamped to `max_frame_delta_ms` before it reaches the
    /// game clock.
    ///
    /// # Errors
    ///
    /// Propagates the first system failure; the frame is abandoned at that
    /// point.
    pub fn tick(&mut self, keys: &[Key], dt_ms: u64) -> GameResult<FrameStats> {
        let started = Instant::now();
        let dt_ms = dt_ms.min(self.config.max_frame_delta_ms);
        self.clock_ms += dt_ms;
        let now_ms = self.clock_ms;
        let dt_secs = Duration::from_millis(dt_ms).as_secs_f32();

        for &key in keys {
            match key {
                Key::Escape => self.running = false,
                Key::Slash => {
                    self.debug = !self.debug;
                    tracing::info!(debug = self.debug, "debug mode toggled");
                }
                _ => {}
            }
            self.bus.emit(KeyPressedEvent { key });
        }

        let report = self.registry.update();

        let registry = &mut self.registry;
        registry.run_system::<KeyboardControlSystem, _, _>(|s, r| s.update(r))??;
        registry.run_system::<MovementSystem, _, _>(|s, r| s.update(r, dt_secs))??;
        registry.run_system::<AnimationSystem, _, _>(|s, r| s.update(r, now_ms))??;
        let collisions = registry
            .get_system::<CollisionSystem>()?
            .update(registry, &self.bus)?;
        let hits = registry.run_system::<DamageSystem, _, _>(|s, r| s.update(r))??;
        registry
            .get_system::<CameraMovementSystem>()?
            .update(registry, &mut self.camera)?;
        let projectiles_fired =
            registry.run_system::<ProjectileEmitSystem, _, _>(|s, r| s.update(r, now_ms))??;
        let (map_width, map_height) = (self.config.map_width, self.config.map_height);
        let projectiles_expired = registry
            .run_system::<ProjectileLifecycleSystem, _, _>(|s, r| {
                s.update(r, now_ms, map_width, map_height)
            })??;
        let logic_done = Instant::now();

        let camera = self.camera;
        let draw_commands =
            registry.run_system::<RenderSystem, _, _>(|s, r| s.update(r, &camera))??;
        let finished = Instant::now();

        let stats = FrameStats {
            frame: self.frame_count,
            dt_ms,
            total_us: micros(finished - started),
            logic_us: micros(logic_done - started),
            render_us: micros(finished - logic_done),
            reconciled: report.reconciled,
            killed: report.killed,
            collisions,
            hits,
            projectiles_fired,
            projectiles_expired,
            draw_commands,
        };
        self.end_frame(stats);
        Ok(stats)
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator.record(stats);

        if stats.total_us > micros(self.stats_accumulator.budget) {
            tracing::warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                budget_us = micros(self.stats_accumulator.budget),
                "frame exceeded budget"
            );
        }
        if self.debug {
            tracing::info!(?stats, live = self.registry.live_count(), "frame");
        }
    }

    /// The world.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The world, mutably.
    #[inline]
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The event bus every system subscribed to.
    #[must_use]
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// The camera after the last frame.
    #[inline]
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Game clock in milliseconds.
    #[inline]
    #[must_use]
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// `false` once `Escape` was pressed.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether debug mode is on.
    #[inline]
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// The last frame's draw list, back to front.
    ///
    /// # Errors
    ///
    /// Fails only if the render system was removed from the registry.
    pub fn draw_list(&self) -> GameResult<&[DrawCommand]> {
        Ok(self.registry.get_system::<RenderSystem>()?.commands())
    }

    /// The last frame's draw list as raw bytes.
    ///
    /// # Errors
    ///
    /// Fails only if the render system was removed from the registry.
    pub fn draw_list_bytes(&self) -> GameResult<&[u8]> {
        Ok(self.registry.get_system::<RenderSystem>()?.as_bytes())
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Wall-time budget per frame.
    pub budget: Duration,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded the budget.
    pub frames_over_budget: u64,
    /// Projectiles created across all frames.
    pub projectiles_fired: u64,
    /// Projectile hits across all frames.
    pub hits: u64,
    /// Entities destroyed across all frames.
    pub killed: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator with the given per-frame budget.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            frames_recorded: 0,
            total_us_sum: 0,
            logic_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            projectiles_fired: 0,
            hits: 0,
            killed: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.logic_us_sum += stats.logic_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.projectiles_fired += stats.projectiles_fired as u64;
        self.hits += stats.hits as u64;
        self.killed += stats.killed as u64;

        if stats.total_us > micros(self.budget) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!(
            "│ Average Frame:      {:.3} ms ({:.1} FPS)",
            self.avg_frame_ms(),
            self.avg_fps()
        );
        println!("│ Min Frame:          {min_ms:.3} ms");
        println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ─────────────────────────────────────────────────────────┐");
        println!("│ Target:             {:.3} ms", self.budget.as_secs_f64() * 1000.0);
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ GAMEPLAY ───────────────────────────────────────────────────────┐");
        println!("│ Projectiles Fired:  {}", self.projectiles_fired);
        println!("│ Hits:               {}", self.hits);
        println!("│ Entities Destroyed: {}", self.killed);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}
