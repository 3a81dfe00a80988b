/// The per-run simulation context.
///
/// `Game` owns the configuration, both RNG streams, the grid index, the
/// current level's world, and the turn conductor. A host drives it with two
/// lifecycle calls:
///   - `on_level_load` (via `new`, `advance_level`, `restart`)
///   - `on_tick` once per frame
///
/// Level changes are never performed by the core on its own. Reaching the
/// exit or asking for a restart only sends a `SceneRequest`; the host answers
/// by calling `advance_level` or `restart`.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::LevelConfig;
use crate::domain::grid::{Bounds, GridIndex};
use crate::error::SimError;
use super::event::GameEvent;
use super::level;
use super::services::{InputService, SceneRequest, Services, SoundCue};
use super::turn::{TurnConductor, TurnContext, TurnState};
use super::world::WorldState;

/// Stream id of the cosmetic RNG; gameplay uses the default stream 0.
const COSMETIC_STREAM: u64 = 1;

pub struct Game {
    config: LevelConfig,
    services: Services,
    seed: u64,
    rng: ChaCha8Rng,
    cosmetic: ChaCha8Rng,
    grid: GridIndex,
    world: WorldState,
    conductor: TurnConductor,
    /// Events raised outside `on_tick` (level loads), delivered on the next tick.
    pending: Vec<GameEvent>,
    /// A `Restart` request is in flight; cleared by `restart`.
    restart_requested: bool,
}

// ══════════════════════════════════════════════════════════════
// Construction / level lifecycle
// ══════════════════════════════════════════════════════════════

impl Game {
    /// New game seeded from OS entropy.
    pub fn new(config: LevelConfig, services: Services) -> Result<Self, SimError> {
        Game::seeded(config, rand::random(), services)
    }

    /// New game with a fixed seed. The same seed and the same inputs replay
    /// the same run. A config that fails `LevelConfig::validate` is
    /// returned as [`SimError::Config`].
    pub fn seeded(config: LevelConfig, seed: u64, services: Services) -> Result<Self, SimError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cosmetic = ChaCha8Rng::seed_from_u64(seed);
        cosmetic.set_stream(COSMETIC_STREAM);

        let bounds = Bounds::new(config.columns, config.rows);
        let world = WorldState::new(config.initial_level, bounds, config.start_food, config.player_move_time);

        let mut game = Game {
            config,
            services,
            seed,
            rng,
            cosmetic,
            grid: GridIndex::new(),
            world,
            conductor: TurnConductor::new(),
            pending: vec![],
            restart_requested: false,
        };
        log::info!("new game, seed {seed}");
        game.on_level_load(game.config.initial_level, game.config.start_food)?;
        Ok(game)
    }

    /// Generate `level` and enter its setup phase with `food` carried in.
    ///
    /// Generation works on a fresh grid index, so on error the previous
    /// world and its grid index are left untouched.
    pub fn on_level_load(&mut self, level: u32, food: i32) -> Result<(), SimError> {
        let mut grid = GridIndex::new();
        let layout = level::generate(level, &self.config, &mut grid, &mut self.rng, &mut self.cosmetic)?;
        self.grid = grid;
        self.world = WorldState::from_layout(layout, food, self.config.player_move_time);
        self.conductor.begin_level(self.config.timing.level_start_delay);
        self.pending.push(GameEvent::LevelStarted { level });
        Ok(())
    }

    /// Answer a `NextLevel` request: next day, same food.
    pub fn advance_level(&mut self) -> Result<(), SimError> {
        if self.conductor.state() == TurnState::GameOver {
            log::warn!("next level requested after game over; ignored");
            return Ok(());
        }
        let food = self.world.player.food;
        self.on_level_load(self.world.level + 1, food)
    }

    /// Ask the host for a restart. Only honoured once the game is over, and
    /// only once until the host answers with `restart`.
    pub fn request_restart(&mut self) -> bool {
        if self.conductor.state() != TurnState::GameOver || self.restart_requested {
            return false;
        }
        self.restart_requested = true;
        self.services.scene.request(SceneRequest::Restart);
        true
    }

    /// Reset food and day to their configured values and regenerate.
    pub fn restart(&mut self) -> Result<(), SimError> {
        log::info!("restarting at day {}", self.config.initial_level);
        self.restart_requested = false;
        self.on_level_load(self.config.initial_level, self.config.start_food)
    }
}

// ══════════════════════════════════════════════════════════════
// Frame tick
// ══════════════════════════════════════════════════════════════

impl Game {
    /// Advance by `dt`. Returns every event of this tick (and any raised by
    /// a level load since the previous tick), after fanning them out to the
    /// animation and audio services.
    pub fn on_tick(&mut self, dt: Duration, input: &mut dyn InputService) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let mut ctx = TurnContext {
            world: &mut self.world,
            config: &self.config,
            rng: &mut self.rng,
            events: &mut events,
        };
        if let Some(request) = self.conductor.tick(&mut ctx, dt, input) {
            self.services.scene.request(request);
        }

        for event in &events {
            self.services.animation.notify(event);
            if let Some(cue) = SoundCue::for_event(event) {
                self.services.audio.play(cue);
            }
        }
        events
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.conductor.set_paused(paused);
    }
}

// ══════════════════════════════════════════════════════════════
// Read access
// ══════════════════════════════════════════════════════════════

impl Game {
    pub fn state(&self) -> TurnState {
        self.conductor.state()
    }

    pub fn is_paused(&self) -> bool {
        self.conductor.is_paused()
    }

    pub fn level(&self) -> u32 {
        self.world.level
    }

    pub fn food(&self) -> i32 {
        self.world.player.food
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Free interior cells left after the current level's generation pass.
    pub fn free_cells(&self) -> usize {
        self.grid.remaining()
    }
}
