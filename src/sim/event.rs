/// Events emitted during a simulation tick.
/// The presentation layer consumes these for animation/sound.

use crate::domain::entity::{EnemyId, PickupKind, WallId};
use crate::domain::grid::Cell;
use crate::domain::movement::Obstacle;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Board generated; the title card is up.
    LevelStarted { level: u32 },
    /// Title card done; the player may act.
    SetupFinished { level: u32 },
    PlayerMoved { from: Cell, to: Cell },
    PlayerArrived { cell: Cell },
    EnemyMoved { id: EnemyId, from: Cell, to: Cell },
    EnemyArrived { id: EnemyId, cell: Cell },
    WallChopped { id: WallId, cell: Cell, remaining: i32 },
    WallDestroyed { id: WallId, cell: Cell },
    EnemyStruck { id: EnemyId, damage: u32, remaining: i32 },
    EnemyDestroyed { id: EnemyId, cell: Cell },
    PlayerHit { by: Obstacle, damage: u32, food: i32 },
    FoodPicked { cell: Cell, kind: PickupKind, points: i32, food: i32 },
    ExitReached { cell: Cell },
    GameOver { days: u32 },
}
