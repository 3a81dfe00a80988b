/// WorldState: the per-level snapshot of a running game.
///
/// ## Ownership
///
/// The world owns every actor of the current level:
///   - `walls`, `enemies`: indexed by `WallId` / `EnemyId`. Entries are never
///     removed mid-level; destruction takes them out of play in place.
///   - `enemies` doubles as the roster: spawn order = action order.
///   - `pickups`: consumed in place (`taken`).
///
/// All blocking queries go through [`WorldState::blockers`] and all damage
/// through [`WorldState::resolve_hit`], so the "destroyed actors are out of
/// play" rule lives in exactly one place each.

use std::time::Duration;

use crate::domain::combat::{self, Combatants, DamageOutcome};
use crate::domain::entity::{Enemy, EnemyId, Pickup, PickupKind, Player, Wall, WallId};
use crate::domain::grid::{Bounds, Cell};
use crate::domain::movement::{self, Blockers, MoveOutcome, Mover, Obstacle};
use crate::domain::tile::TileField;
use crate::error::SimError;
use super::level::{exit_cell, LevelLayout};

/// Where the player starts every level.
pub const PLAYER_START: Cell = Cell::new(0, 0);

#[derive(Clone, Debug)]
pub struct WorldState {
    // ── Board ──
    pub level: u32,
    pub bounds: Bounds,
    pub tiles: TileField,
    pub exit: Cell,

    // ── Actors ──
    pub player: Player,
    pub walls: Vec<Wall>,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<Pickup>,

    /// Set once the player finishes a move on the exit; the player takes no
    /// further input on this level.
    pub exit_reached: bool,
}

// ── Construction ──

impl WorldState {
    /// An empty board with only the player on it.
    pub fn new(level: u32, bounds: Bounds, food: i32, player_move_time: Duration) -> Self {
        WorldState {
            level,
            bounds,
            tiles: TileField::plain(bounds),
            exit: exit_cell(bounds),
            player: Player::new(PLAYER_START, food, player_move_time),
            walls: vec![],
            enemies: vec![],
            pickups: vec![],
            exit_reached: false,
        }
    }

    /// Populate from a generated layout. `food` carries over between levels.
    pub fn from_layout(layout: LevelLayout, food: i32, player_move_time: Duration) -> Self {
        WorldState {
            level: layout.level,
            bounds: layout.bounds,
            tiles: layout.tiles,
            exit: layout.exit,
            player: Player::new(PLAYER_START, food, player_move_time),
            walls: layout.walls,
            enemies: layout.enemies,
            pickups: layout.pickups,
            exit_reached: false,
        }
    }

    pub fn add_wall(&mut self, cell: Cell, hp: i32) -> WallId {
        let id = WallId(self.walls.len());
        self.walls.push(Wall::new(id, cell, hp, 0));
        id
    }

    pub fn add_enemy(&mut self, cell: Cell, health: i32, damage: u32, move_time: Duration) -> EnemyId {
        let id = EnemyId(self.enemies.len());
        self.enemies.push(Enemy::new(id, 0, cell, health, damage, move_time));
        id
    }

    pub fn add_pickup(&mut self, cell: Cell, kind: PickupKind) {
        self.pickups.push(Pickup::new(cell, kind));
    }
}

// ── Queries ──

impl WorldState {
    pub fn blockers(&self) -> Blockers<'_> {
        Blockers {
            bounds: self.bounds,
            walls: &self.walls,
            enemies: &self.enemies,
            player: self.player.body.cell,
        }
    }

    /// Current logical cell of a mover.
    pub fn cell_of(&self, mover: Mover) -> Option<Cell> {
        match mover {
            Mover::Player => Some(self.player.body.cell),
            Mover::Enemy(id) => self.enemies.get(id.0).filter(|e| e.alive).map(|e| e.body.cell),
        }
    }

    /// Probe a raw step for `mover` from its current cell.
    pub fn attempt_step(&self, mover: Mover, dx: i32, dy: i32) -> Result<MoveOutcome, SimError> {
        let from = match mover {
            Mover::Player => self.player.body.cell,
            Mover::Enemy(id) => self
                .cell_of(mover)
                .ok_or(SimError::ActorAlreadyDestroyed(Obstacle::Enemy(id)))?,
        };
        movement::attempt_step(&self.blockers(), mover, from, dx, dy)
    }

    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn standing_walls(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter().filter(|w| w.is_standing())
    }

    pub fn pickup_at(&self, cell: Cell) -> Option<&Pickup> {
        self.pickups.iter().find(|p| !p.taken && p.cell == cell)
    }

    /// Does anything still need per-frame interpolation?
    pub fn in_motion(&self) -> bool {
        self.player.body.is_moving() || self.live_enemies().any(|e| e.body.is_moving())
    }
}

// ── Mutation ──

impl WorldState {
    /// Apply damage to a target through the combat resolver.
    pub fn resolve_hit(&mut self, target: Obstacle, amount: u32) -> Result<DamageOutcome, SimError> {
        let mut c = Combatants {
            walls: &mut self.walls,
            enemies: &mut self.enemies,
            player: &mut self.player,
        };
        combat::resolve(&mut c, target, amount)
    }

    /// Consume an untaken pickup on `cell`. Returns its kind.
    pub fn take_pickup(&mut self, cell: Cell) -> Option<PickupKind> {
        let pickup = self.pickups.iter_mut().find(|p| !p.taken && p.cell == cell)?;
        pickup.taken = true;
        Some(pickup.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVE: Duration = Duration::from_millis(100);

    fn world() -> WorldState {
        WorldState::new(1, Bounds::new(8, 8), 100, MOVE)
    }

    #[test]
    fn empty_world_layout() {
        let w = world();
        assert_eq!(w.player.body.cell, PLAYER_START);
        assert_eq!(w.exit, Cell::new(7, 7));
        assert_eq!(w.live_enemies().count(), 0);
        assert!(!w.in_motion());
    }

    #[test]
    fn destroyed_wall_stops_blocking() {
        let mut w = world();
        let id = w.add_wall(Cell::new(1, 0), 1);
        assert_eq!(
            w.attempt_step(Mover::Player, 1, 0),
            Ok(MoveOutcome::Blocked(Some(Obstacle::Wall(id))))
        );
        assert!(w.resolve_hit(Obstacle::Wall(id), 1).unwrap().destroyed);
        assert_eq!(w.standing_walls().count(), 0);
        assert_eq!(w.attempt_step(Mover::Player, 1, 0), Ok(MoveOutcome::Moved(Cell::new(1, 0))));
    }

    #[test]
    fn dead_enemy_cannot_step() {
        let mut w = world();
        let id = w.add_enemy(Cell::new(3, 3), 1, 10, MOVE);
        w.resolve_hit(Obstacle::Enemy(id), 5).unwrap();
        assert_eq!(
            w.attempt_step(Mover::Enemy(id), 0, 1),
            Err(SimError::ActorAlreadyDestroyed(Obstacle::Enemy(id)))
        );
    }

    #[test]
    fn pickups_are_taken_once() {
        let mut w = world();
        w.add_pickup(Cell::new(2, 0), PickupKind::Soda);
        assert!(w.pickup_at(Cell::new(2, 0)).is_some());
        assert_eq!(w.take_pickup(Cell::new(2, 0)), Some(PickupKind::Soda));
        assert_eq!(w.take_pickup(Cell::new(2, 0)), None);
        assert!(w.pickup_at(Cell::new(2, 0)).is_none());
    }
}
