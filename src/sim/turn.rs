/// Turn conductor: the cooperative scheduler that serializes every action.
///
/// ## States
///
///   LevelSetup ──(title card)──▶ PlayerTurn ⇄ EnemyPhase
///                                     └──────┴──▶ GameOver
///
/// `GameOver` is terminal; only a fresh `begin_level` leaves it.
///
/// ## Suspension points
///
/// Delays are waits measured in host time and drained from each tick's `dt`:
///   - level setup: `level_start_delay`
///   - enemy phase opening: `turn_delay`
///   - empty roster padding: one more `turn_delay`
///   - after each enemy's action (or skip): that enemy's move time
///
/// One tick may pass several expired waits, so a large `dt` runs the whole
/// enemy phase at once. Player input is only polled once the player is idle,
/// which keeps an actor from being asked to move again mid-interpolation.
///
/// ## Per-tick order
///   1. Exit countdown (may request the next level)
///   2. Motion interpolation; player arrival triggers pickups and the exit
///   3. State machine

use std::time::Duration;

use rand_chacha::ChaCha8Rng;

use crate::config::LevelConfig;
use crate::domain::ai;
use crate::domain::entity::{EnemyId, PickupKind, WallId};
use crate::domain::grid::Cell;
use crate::domain::movement::{self, MoveOutcome, Mover, Obstacle};
use super::event::GameEvent;
use super::services::{InputService, SceneRequest};
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnState {
    LevelSetup,
    PlayerTurn,
    EnemyPhase,
    GameOver,
}

/// Position inside the enemy phase.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum EnemyCursor {
    Opening,
    Padding,
    /// Next roster index to consider.
    Next(usize),
}

#[derive(Clone, Copy, Debug, Default)]
struct Wait {
    remaining: Duration,
}

impl Wait {
    fn new(remaining: Duration) -> Self {
        Wait { remaining }
    }

    /// Spend from `budget`. True once the wait has fully elapsed.
    fn consume(&mut self, budget: &mut Duration) -> bool {
        if *budget >= self.remaining {
            *budget -= self.remaining;
            self.remaining = Duration::ZERO;
            true
        } else {
            self.remaining -= *budget;
            *budget = Duration::ZERO;
            false
        }
    }
}

/// Borrowed simulation state for one tick.
pub struct TurnContext<'a> {
    pub world: &'a mut WorldState,
    pub config: &'a LevelConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Clone, Debug)]
pub struct TurnConductor {
    state: TurnState,
    wait: Wait,
    cursor: EnemyCursor,
    paused: bool,
    exit_countdown: Option<Duration>,
}

impl Default for TurnConductor {
    fn default() -> Self {
        TurnConductor::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl TurnConductor {
    pub fn new() -> Self {
        TurnConductor {
            state: TurnState::LevelSetup,
            wait: Wait::default(),
            cursor: EnemyCursor::Opening,
            paused: false,
            exit_countdown: None,
        }
    }

    /// Enter `LevelSetup` for a freshly generated level.
    pub fn begin_level(&mut self, title_delay: Duration) {
        self.state = TurnState::LevelSetup;
        self.wait = Wait::new(title_delay);
        self.cursor = EnemyCursor::Opening;
        self.exit_countdown = None;
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Time left before the next level is requested, if the exit was reached.
    pub fn exit_countdown(&self) -> Option<Duration> {
        self.exit_countdown
    }

    /// Advance by `dt` of host time.
    pub fn tick(
        &mut self,
        ctx: &mut TurnContext,
        dt: Duration,
        input: &mut dyn InputService,
    ) -> Option<SceneRequest> {
        if self.paused { return None; }

        let request = self.advance_exit_countdown(dt);
        self.advance_motion(ctx, dt);

        let mut budget = dt;
        loop {
            match self.state {
                TurnState::LevelSetup => {
                    if !self.wait.consume(&mut budget) { break; }
                    log::debug!("day {}: setup finished", ctx.world.level);
                    ctx.events.push(GameEvent::SetupFinished { level: ctx.world.level });
                    self.state = TurnState::PlayerTurn;
                }
                TurnState::PlayerTurn => {
                    if ctx.world.exit_reached || ctx.world.player.body.is_moving() { break; }
                    let Some((dx, dy)) = input.direction() else { break };
                    self.player_action(ctx, dx, dy);
                    break;
                }
                TurnState::EnemyPhase => {
                    if !self.wait.consume(&mut budget) { break; }
                    self.enemy_step(ctx);
                }
                TurnState::GameOver => break,
            }
        }

        request
    }
}

// ══════════════════════════════════════════════════════════════
// Transitions
// ══════════════════════════════════════════════════════════════

impl TurnConductor {
    fn enter_player_turn(&mut self) {
        log::debug!("player turn");
        self.state = TurnState::PlayerTurn;
    }

    fn enter_enemy_phase(&mut self, config: &LevelConfig) {
        log::debug!("enemy phase");
        self.state = TurnState::EnemyPhase;
        self.cursor = EnemyCursor::Opening;
        self.wait = Wait::new(config.timing.turn_delay);
    }

    fn enter_game_over(&mut self, ctx: &mut TurnContext) {
        let days = ctx.world.level;
        log::info!("after {days} days, the player starved");
        self.state = TurnState::GameOver;
        self.exit_countdown = None;
        ctx.events.push(GameEvent::GameOver { days });
    }

    fn advance_exit_countdown(&mut self, dt: Duration) -> Option<SceneRequest> {
        let left = self.exit_countdown?;
        if dt >= left {
            self.exit_countdown = None;
            log::debug!("requesting next level");
            Some(SceneRequest::NextLevel)
        } else {
            self.exit_countdown = Some(left - dt);
            None
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Motion and arrival triggers
// ══════════════════════════════════════════════════════════════

impl TurnConductor {
    fn advance_motion(&mut self, ctx: &mut TurnContext, dt: Duration) {
        if ctx.world.player.body.advance(dt) {
            let cell = ctx.world.player.body.cell;
            ctx.events.push(GameEvent::PlayerArrived { cell });
            self.player_arrived(ctx, cell);
        }
        for enemy in ctx.world.enemies.iter_mut().filter(|e| e.alive) {
            if enemy.body.advance(dt) {
                ctx.events.push(GameEvent::EnemyArrived { id: enemy.id, cell: enemy.body.cell });
            }
        }
    }

    fn player_arrived(&mut self, ctx: &mut TurnContext, cell: Cell) {
        if let Some(kind) = ctx.world.take_pickup(cell) {
            let points = match kind {
                PickupKind::Food => ctx.config.points_per_food,
                PickupKind::Soda => ctx.config.points_per_soda,
            };
            ctx.world.player.food += points;
            ctx.events.push(GameEvent::FoodPicked { cell, kind, points, food: ctx.world.player.food });
        }

        if cell == ctx.world.exit && !ctx.world.exit_reached && self.state != TurnState::GameOver {
            log::info!("day {}: exit reached", ctx.world.level);
            ctx.world.exit_reached = true;
            ctx.events.push(GameEvent::ExitReached { cell });
            self.exit_countdown = Some(ctx.config.timing.restart_level_delay);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player turn
// ══════════════════════════════════════════════════════════════

impl TurnConductor {
    fn player_action(&mut self, ctx: &mut TurnContext, dx: i32, dy: i32) {
        if (dx, dy) == (0, 0) { return; }

        let outcome = match ctx.world.attempt_step(Mover::Player, dx, dy) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("ignoring player intent: {e}");
                return;
            }
        };

        ctx.world.player.food = ctx.world.player.food.saturating_sub(1);
        let from = ctx.world.player.body.cell;

        match outcome {
            MoveOutcome::Moved(to) => {
                ctx.world.player.body.begin(to);
                ctx.events.push(GameEvent::PlayerMoved { from, to });
            }
            MoveOutcome::Blocked(Some(Obstacle::Wall(id))) => chop_wall(ctx, id),
            MoveOutcome::Blocked(Some(Obstacle::Enemy(id))) => attack_enemy(ctx, id),
            MoveOutcome::Blocked(_) => {}
        }

        if ctx.world.player.is_starved() {
            self.enter_game_over(ctx);
        } else {
            self.enter_enemy_phase(ctx.config);
        }
    }
}

fn chop_wall(ctx: &mut TurnContext, id: WallId) {
    let Some(cell) = ctx.world.walls.get(id.0).map(|w| w.cell) else { return };
    match ctx.world.resolve_hit(Obstacle::Wall(id), ctx.config.wall_damage) {
        Ok(out) => {
            ctx.events.push(GameEvent::WallChopped { id, cell, remaining: out.remaining });
            if out.destroyed {
                ctx.events.push(GameEvent::WallDestroyed { id, cell });
            }
        }
        Err(e) => log::debug!("chop skipped: {e}"),
    }
}

/// Player strikes an enemy; the enemy hits back in the same resolution.
fn attack_enemy(ctx: &mut TurnContext, id: EnemyId) {
    let Some((cell, counter)) = ctx.world.enemies.get(id.0).map(|e| (e.body.cell, e.damage)) else {
        return;
    };
    let damage = ctx.config.enemy_damage;
    match ctx.world.resolve_hit(Obstacle::Enemy(id), damage) {
        Ok(out) => {
            ctx.events.push(GameEvent::EnemyStruck { id, damage, remaining: out.remaining });
            if out.destroyed {
                log::debug!("enemy #{} destroyed at {cell}", id.0);
                ctx.events.push(GameEvent::EnemyDestroyed { id, cell });
            }
            strike_player(ctx, Obstacle::Enemy(id), counter);
        }
        Err(e) => log::debug!("attack skipped: {e}"),
    }
}

fn strike_player(ctx: &mut TurnContext, by: Obstacle, damage: u32) {
    match ctx.world.resolve_hit(Obstacle::Player, damage) {
        Ok(out) => ctx.events.push(GameEvent::PlayerHit { by, damage, food: out.remaining }),
        Err(e) => log::debug!("hit skipped: {e}"),
    }
}

// ══════════════════════════════════════════════════════════════
// Enemy phase
// ══════════════════════════════════════════════════════════════

impl TurnConductor {
    fn enemy_step(&mut self, ctx: &mut TurnContext) {
        match self.cursor {
            EnemyCursor::Opening => {
                if ctx.world.live_enemies().next().is_none() {
                    self.cursor = EnemyCursor::Padding;
                    self.wait = Wait::new(ctx.config.timing.turn_delay);
                } else {
                    self.cursor = EnemyCursor::Next(0);
                    self.wait = Wait::default();
                }
            }
            EnemyCursor::Padding => self.enter_player_turn(),
            EnemyCursor::Next(from) => {
                let next = ctx.world.enemies[from.min(ctx.world.enemies.len())..]
                    .iter()
                    .position(|e| e.alive)
                    .map(|offset| from + offset);
                let Some(idx) = next else {
                    self.enter_player_turn();
                    return;
                };

                let move_time = ctx.world.enemies[idx].body.move_time();
                enemy_action(ctx, idx);
                if ctx.world.player.is_starved() {
                    self.enter_game_over(ctx);
                    return;
                }
                self.cursor = EnemyCursor::Next(idx + 1);
                self.wait = Wait::new(move_time);
            }
        }
    }
}

/// One enemy's turn: skip if flagged, otherwise one step toward the player.
fn enemy_action(ctx: &mut TurnContext, idx: usize) {
    let enemy = &mut ctx.world.enemies[idx];
    if enemy.skip_move {
        enemy.skip_move = false;
        log::debug!("enemy #{} skips", enemy.id.0);
        return;
    }
    enemy.skip_move = true;

    let (id, from, damage) = (enemy.id, enemy.body.cell, enemy.damage);
    let target = ctx.world.player.body.cell;
    let dir = ai::choose_direction(from, target, &mut *ctx.rng);

    let outcome = movement::probe(&ctx.world.blockers(), Mover::Enemy(id), from, dir);
    match outcome {
        MoveOutcome::Moved(to) => {
            ctx.world.enemies[idx].body.begin(to);
            ctx.events.push(GameEvent::EnemyMoved { id, from, to });
        }
        MoveOutcome::Blocked(Some(Obstacle::Player)) => strike_player(ctx, Obstacle::Enemy(id), damage),
        MoveOutcome::Blocked(_) => {}
    }
}
