/// Entities: Player, Enemy, Wall (destructible obstacle), Pickup.
///
/// Walls and enemies are never removed from their vectors during a level.
/// Destruction flips them out of play and every query skips them, so ids
/// (vector indices) stay valid for the whole level.

use std::time::Duration;

use super::grid::Cell;
use super::movement::Body;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WallId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EnemyId(pub usize);

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub food: i32,
}

impl Player {
    pub fn new(cell: Cell, food: i32, move_time: Duration) -> Self {
        Player { body: Body::new(cell, move_time), food }
    }

    pub fn is_starved(&self) -> bool {
        self.food <= 0
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    /// Index into the configured enemy kinds (sprite + stats).
    pub kind: usize,
    pub body: Body,
    pub health: i32,
    /// Contact damage dealt to the player.
    pub damage: u32,
    /// Set after every own action; the next action is skipped and clears it.
    pub skip_move: bool,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: usize, cell: Cell, health: i32, damage: u32, move_time: Duration) -> Self {
        Enemy {
            id,
            kind,
            body: Body::new(cell, move_time),
            health,
            damage,
            skip_move: false,
            alive: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Wall {
    pub id: WallId,
    pub cell: Cell,
    pub hp: i32,
    /// Sprite variant.
    pub variant: u8,
    /// Hit at least once (renderers swap to the damaged sprite).
    pub damaged: bool,
}

impl Wall {
    pub fn new(id: WallId, cell: Cell, hp: i32, variant: u8) -> Self {
        Wall { id, cell, hp, variant, damaged: false }
    }

    pub fn is_standing(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickupKind {
    Food,
    Soda,
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub cell: Cell,
    pub kind: PickupKind,
    pub taken: bool,
}

impl Pickup {
    pub fn new(cell: Cell, kind: PickupKind) -> Self {
        Pickup { cell, kind, taken: false }
    }
}
