/// Collaborator seams between the simulation and its host.
///
/// The core never reaches for globals: input, animation, audio, and scene
/// loading are handed in at construction (or per tick, for input) and the
/// core only calls through these traits. Notifications are fire-and-forget;
/// nothing they return is consulted.

use std::sync::mpsc::Sender;

use super::event::GameEvent;
use crate::domain::entity::PickupKind;
use crate::domain::movement::Obstacle;

/// Scene-level requests the core cannot perform itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SceneRequest {
    /// The player reached the exit; load the next day.
    NextLevel,
    /// Start over from the configured initial day.
    Restart,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SoundCue {
    Footstep,
    Chop,
    Eat,
    Drink,
    EnemyAttack,
    EnemyHit,
    EnemyDeath,
    GameOver,
}

impl SoundCue {
    /// The cue an event makes, if any.
    pub fn for_event(event: &GameEvent) -> Option<SoundCue> {
        match event {
            GameEvent::PlayerMoved { .. } => Some(SoundCue::Footstep),
            GameEvent::WallChopped { .. } => Some(SoundCue::Chop),
            GameEvent::FoodPicked { kind: PickupKind::Food, .. } => Some(SoundCue::Eat),
            GameEvent::FoodPicked { kind: PickupKind::Soda, .. } => Some(SoundCue::Drink),
            GameEvent::PlayerHit { by: Obstacle::Enemy(_), .. } => Some(SoundCue::EnemyAttack),
            GameEvent::EnemyStruck { .. } => Some(SoundCue::EnemyHit),
            GameEvent::EnemyDestroyed { .. } => Some(SoundCue::EnemyDeath),
            GameEvent::GameOver { .. } => Some(SoundCue::GameOver),
            _ => None,
        }
    }
}

/// Source of the player's directional intent.
pub trait InputService {
    /// One raw step vector, or `None` when the player has not decided yet.
    /// Polled only while the game is waiting for the player.
    fn direction(&mut self) -> Option<(i32, i32)>;
}

pub trait AnimationService {
    fn notify(&mut self, event: &GameEvent);
}

pub trait AudioService {
    fn play(&mut self, cue: SoundCue);
}

pub trait SceneLoader {
    fn request(&mut self, request: SceneRequest);
}

/// A single pending intent, taken on the first poll.
impl InputService for Option<(i32, i32)> {
    fn direction(&mut self) -> Option<(i32, i32)> {
        self.take()
    }
}

impl SceneLoader for Sender<SceneRequest> {
    fn request(&mut self, request: SceneRequest) {
        if self.send(request).is_err() {
            log::warn!("scene request {request:?} dropped: receiver gone");
        }
    }
}

/// Does nothing. Headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AnimationService for Silent {
    fn notify(&mut self, _event: &GameEvent) {}
}

impl AudioService for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

impl SceneLoader for Silent {
    fn request(&mut self, _request: SceneRequest) {}
}

/// The injected collaborators a game talks to.
pub struct Services {
    pub animation: Box<dyn AnimationService>,
    pub audio: Box<dyn AudioService>,
    pub scene: Box<dyn SceneLoader>,
}

impl Services {
    pub fn new(
        animation: Box<dyn AnimationService>,
        audio: Box<dyn AudioService>,
        scene: Box<dyn SceneLoader>,
    ) -> Self {
        Services { animation, audio, scene }
    }

    pub fn silent() -> Self {
        Services::new(Box::new(Silent), Box::new(Silent), Box::new(Silent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{EnemyId, WallId};
    use crate::domain::grid::Cell;
    use std::sync::mpsc;

    #[test]
    fn pending_intent_is_taken_once() {
        let mut intent = Some((1, 0));
        assert_eq!(intent.direction(), Some((1, 0)));
        assert_eq!(intent.direction(), None);
    }

    #[test]
    fn sender_forwards_requests() {
        let (mut tx, rx) = mpsc::channel();
        tx.request(SceneRequest::NextLevel);
        assert_eq!(rx.try_recv(), Ok(SceneRequest::NextLevel));
        drop(rx);
        // A closed channel is logged, not fatal.
        tx.request(SceneRequest::Restart);
    }

    #[test]
    fn cue_mapping() {
        let c = Cell::new(1, 1);
        assert_eq!(
            SoundCue::for_event(&GameEvent::PlayerMoved { from: c, to: c }),
            Some(SoundCue::Footstep)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::WallChopped { id: WallId(0), cell: c, remaining: 3 }),
            Some(SoundCue::Chop)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::FoodPicked {
                cell: c, kind: PickupKind::Soda, points: 20, food: 50,
            }),
            Some(SoundCue::Drink)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::PlayerHit {
                by: Obstacle::Enemy(EnemyId(0)), damage: 10, food: 5,
            }),
            Some(SoundCue::EnemyAttack)
        );
        assert_eq!(SoundCue::for_event(&GameEvent::WallDestroyed { id: WallId(0), cell: c }), None);
        assert_eq!(SoundCue::for_event(&GameEvent::GameOver { days: 3 }), Some(SoundCue::GameOver));
    }
}
