/// Short-lived visual feedback driven by game events.
///
/// `Effects` is the host's `AnimationService`. The game holds one handle
/// (boxed inside `Services`), the renderer reads through a clone. Both share
/// the same state, so the renderer sees every notification the game sends.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scavenger::domain::entity::PickupKind;
use scavenger::domain::grid::Cell;
use scavenger::domain::movement::Obstacle;
use scavenger::sim::event::GameEvent;
use scavenger::sim::services::AnimationService;

const MESSAGE_TIME: Duration = Duration::from_millis(900);
const FLASH_TIME: Duration = Duration::from_millis(180);

/// A tinted board cell (chop or strike), fading out.
#[derive(Clone, Copy, Debug)]
pub struct Flash {
    pub cell: Cell,
    pub left: Duration,
}

#[derive(Debug, Default)]
pub struct EffectState {
    /// Food delta text shown next to the HUD ("+10", "-20").
    pub message: String,
    message_left: Duration,
    /// Player sprite is tinted while this runs.
    pub player_hurt: Duration,
    pub flashes: Vec<Flash>,
}

impl EffectState {
    pub fn message(&self) -> Option<&str> {
        (!self.message_left.is_zero()).then_some(self.message.as_str())
    }

    fn say(&mut self, text: String) {
        self.message = text;
        self.message_left = MESSAGE_TIME;
    }

    fn flash(&mut self, cell: Cell) {
        self.flashes.retain(|f| f.cell != cell);
        self.flashes.push(Flash { cell, left: FLASH_TIME });
    }

    pub fn is_flashing(&self, cell: Cell) -> bool {
        self.flashes.iter().any(|f| f.cell == cell)
    }

    fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::LevelStarted { .. } => {
                *self = EffectState::default();
            }
            GameEvent::WallChopped { cell, .. } | GameEvent::WallDestroyed { cell, .. } => {
                self.flash(cell);
            }
            GameEvent::EnemyDestroyed { cell, .. } => self.flash(cell),
            GameEvent::PlayerHit { by, damage, .. } => {
                if matches!(by, Obstacle::Enemy(_)) {
                    self.player_hurt = FLASH_TIME;
                }
                self.say(format!("-{damage}"));
            }
            GameEvent::FoodPicked { kind, points, .. } => {
                let what = match kind {
                    PickupKind::Food => "food",
                    PickupKind::Soda => "soda",
                };
                self.say(format!("+{points} {what}"));
            }
            _ => {}
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.message_left = self.message_left.saturating_sub(dt);
        self.player_hurt = self.player_hurt.saturating_sub(dt);
        for f in &mut self.flashes {
            f.left = f.left.saturating_sub(dt);
        }
        self.flashes.retain(|f| !f.left.is_zero());
    }
}

/// Shared handle over `EffectState`.
#[derive(Clone, Default)]
pub struct Effects(Rc<RefCell<EffectState>>);

impl Effects {
    pub fn new() -> Self {
        Effects::default()
    }

    /// Fade everything by one frame. Call once per frame while not paused.
    pub fn advance(&self, dt: Duration) {
        self.0.borrow_mut().advance(dt);
    }

    pub fn state(&self) -> std::cell::Ref<'_, EffectState> {
        self.0.borrow()
    }
}

impl AnimationService for Effects {
    fn notify(&mut self, event: &GameEvent) {
        self.0.borrow_mut().apply(event);
    }
}
