//! Scripted full-game flows on a 3x3 board, observed through recording
//! services.
//!
//! A 3x3 board has a single interior cell, (1, 1), so every layout is known
//! in advance: day 1 is empty, day 2 puts its one enemy on (1, 1). The player
//! starts on (0, 0) and the exit is (2, 2).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use scavenger::config::{CountRange, EnemyKind, LevelConfig, TimingConfig};
use scavenger::domain::grid::Cell;
use scavenger::sim::services::{AnimationService, AudioService};
use scavenger::{Game, GameEvent, SceneRequest, Services, SoundCue, TurnState};

const RIGHT: (i32, i32) = (1, 0);
const UP: (i32, i32) = (0, 1);

#[derive(Clone, Default)]
struct Tape(Rc<RefCell<Vec<GameEvent>>>);

impl AnimationService for Tape {
    fn notify(&mut self, event: &GameEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

#[derive(Clone, Default)]
struct Cues(Rc<RefCell<Vec<SoundCue>>>);

impl AudioService for Cues {
    fn play(&mut self, cue: SoundCue) {
        self.0.borrow_mut().push(cue);
    }
}

struct Run {
    game: Game,
    scenes: Receiver<SceneRequest>,
    tape: Tape,
    cues: Cues,
}

fn tiny_board(start_food: i32) -> LevelConfig {
    LevelConfig {
        columns: 3,
        rows: 3,
        wall_count: CountRange { min: 0, max: 0 },
        food_count: CountRange { min: 0, max: 0 },
        start_food,
        player_move_time: Duration::from_millis(50),
        enemy_move_time: Duration::from_millis(50),
        enemy_kinds: vec![EnemyKind { damage: 10, health: 3 }],
        timing: TimingConfig {
            level_start_delay: Duration::from_millis(100),
            turn_delay: Duration::from_millis(10),
            restart_level_delay: Duration::from_millis(50),
        },
        ..LevelConfig::default()
    }
}

impl Run {
    fn new(config: LevelConfig) -> Self {
        let (tx, scenes) = mpsc::channel::<SceneRequest>();
        let tape = Tape::default();
        let cues = Cues::default();
        let services = Services::new(Box::new(tape.clone()), Box::new(cues.clone()), Box::new(tx));
        let game = Game::seeded(config, 17, services).unwrap();
        Run { game, scenes, tape, cues }
    }

    fn tick(&mut self, dt: Duration, intent: Option<(i32, i32)>) -> Vec<GameEvent> {
        let mut intent = intent;
        self.game.on_tick(dt, &mut intent)
    }

    /// Let the title card (or a whole enemy phase) run out.
    fn settle(&mut self) -> Vec<GameEvent> {
        self.tick(Duration::from_secs(1), None)
    }

    /// One full turn: act, then let the move land and the enemies answer.
    fn turn(&mut self, dir: (i32, i32)) -> Vec<GameEvent> {
        let mut events = self.tick(Duration::from_millis(1), Some(dir));
        events.extend(self.settle());
        events
    }

    fn take_cues(&self) -> Vec<SoundCue> {
        std::mem::take(&mut *self.cues.0.borrow_mut())
    }
}

#[test]
fn walking_to_the_exit_requests_the_next_day() {
    let mut run = Run::new(tiny_board(100));
    run.settle();
    assert_eq!(run.game.state(), TurnState::PlayerTurn);

    for dir in [RIGHT, RIGHT, UP] {
        run.turn(dir);
    }
    let events = run.turn(UP);
    assert!(events.contains(&GameEvent::ExitReached { cell: Cell::new(2, 2) }));
    assert_eq!(run.game.food(), 96);
    assert!(run.scenes.try_recv().is_err());

    // Further input is ignored while the countdown runs.
    run.tick(Duration::from_millis(20), Some(RIGHT));
    assert_eq!(run.game.food(), 96);

    run.tick(Duration::from_millis(40), None);
    assert_eq!(run.scenes.try_recv(), Ok(SceneRequest::NextLevel));

    run.game.advance_level().unwrap();
    assert_eq!(run.game.level(), 2);
    assert_eq!(run.game.food(), 96);
    assert_eq!(run.game.world().enemies.len(), 1);
    assert_eq!(run.game.world().enemies[0].body.cell, Cell::new(1, 1));

    let events = run.settle();
    assert_eq!(
        &events[..2],
        &[GameEvent::LevelStarted { level: 2 }, GameEvent::SetupFinished { level: 2 }]
    );
}

#[test]
fn services_hear_every_event() {
    let mut run = Run::new(tiny_board(100));
    let returned = run.settle();
    let mut all = returned.clone();
    all.extend(run.turn(RIGHT));

    assert_eq!(*run.tape.0.borrow(), all);
    assert_eq!(run.take_cues(), vec![SoundCue::Footstep]);
}

#[test]
fn enemy_contact_and_trading_blows() {
    let mut run = Run::new(tiny_board(100));
    run.game.advance_level().unwrap();
    run.settle();
    run.take_cues();

    // Step under the enemy; it steps down into the player and hits.
    let events = run.turn(RIGHT);
    assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerHit { damage: 10, food: 89, .. })));
    assert_eq!(run.take_cues(), vec![SoundCue::Footstep, SoundCue::EnemyAttack]);

    // Strike upward: enemy loses one, hits back for ten, then skips its move.
    let events = run.turn(UP);
    assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyStruck { damage: 1, remaining: 2, .. })));
    assert_eq!(run.game.food(), 78);
    assert_eq!(run.take_cues(), vec![SoundCue::EnemyHit, SoundCue::EnemyAttack]);
    assert_eq!(run.game.world().enemies[0].body.cell, Cell::new(1, 1));
}

#[test]
fn starving_ends_the_run_until_restart() {
    let mut run = Run::new(tiny_board(3));
    run.settle();
    assert!(!run.game.request_restart());

    run.turn(RIGHT);
    run.turn(RIGHT);
    let events = run.turn(UP);
    assert_eq!(run.game.food(), 0);
    assert_eq!(run.game.state(), TurnState::GameOver);
    assert!(events.contains(&GameEvent::GameOver { days: 1 }));
    assert_eq!(run.take_cues().last(), Some(&SoundCue::GameOver));

    // Nothing moves any more.
    run.turn(UP);
    assert_eq!(run.game.food(), 0);
    assert_eq!(run.game.state(), TurnState::GameOver);

    // A pending next-day request cannot revive a finished run.
    run.game.advance_level().unwrap();
    assert_eq!(run.game.level(), 1);

    assert!(run.game.request_restart());
    assert_eq!(run.scenes.try_recv(), Ok(SceneRequest::Restart));
    run.game.restart().unwrap();
    assert_eq!(run.game.level(), 1);
    assert_eq!(run.game.food(), 3);
    assert_eq!(run.game.state(), TurnState::LevelSetup);
    assert_eq!(run.game.world().player.body.cell, Cell::new(0, 0));
}

#[test]
fn pause_holds_the_game() {
    let mut run = Run::new(tiny_board(100));
    run.game.set_paused(true);
    run.settle();
    assert_eq!(run.game.state(), TurnState::LevelSetup);

    run.game.set_paused(false);
    run.settle();
    assert_eq!(run.game.state(), TurnState::PlayerTurn);
}
