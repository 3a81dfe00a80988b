/// The movement primitive shared by the player and every enemy.
///
/// Two halves:
///   1. **Probe**: is a one-cell step blocked, and if so by what?
///      One query answers both, so movers and fighters share it.
///   2. **Motion**: per-frame interpolation of the visual position toward
///      the destination once a step has been accepted.
///
/// Coordinates are y-up: `Up` is (0, +1).

use std::time::Duration;

use super::entity::{Enemy, EnemyId, Wall, WallId};
use super::grid::{Bounds, Cell};
use crate::error::SimError;

/// Squared distance under which an interpolating body counts as arrived.
pub const ARRIVAL_EPSILON: f32 = f32::EPSILON;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Parse a raw step vector. `(0, 0)` is "no step", anything that is not a
    /// single cardinal unit step is rejected.
    pub fn from_delta(dx: i32, dy: i32) -> Result<Option<Direction>, SimError> {
        match (dx, dy) {
            (0, 0) => Ok(None),
            (0, 1) => Ok(Some(Direction::Up)),
            (0, -1) => Ok(Some(Direction::Down)),
            (-1, 0) => Ok(Some(Direction::Left)),
            (1, 0) => Ok(Some(Direction::Right)),
            _ => Err(SimError::InvalidDirection { dx, dy }),
        }
    }
}

/// Continuous position used for smooth movement.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn sqr_distance(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Step toward `target` by at most `max_delta`, never overshooting.
    pub fn move_towards(self, target: Position, max_delta: f32) -> Position {
        let dist = self.sqr_distance(target).sqrt();
        if dist <= max_delta || dist == 0.0 {
            return target;
        }
        let t = max_delta / dist;
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Nearest cell (renderers).
    pub fn round(self) -> Cell {
        Cell::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<Cell> for Position {
    fn from(c: Cell) -> Self {
        Position { x: c.x as f32, y: c.y as f32 }
    }
}

/// In-flight interpolation toward a destination cell.
#[derive(Clone, Copy, Debug)]
struct Motion {
    to: Position,
}

/// Position state shared by every mobile actor.
///
/// `cell` is the logical cell used for occupancy. It commits to the
/// destination as soon as a step is accepted, so two actors can never claim
/// the same cell while one of them is still sliding. `pos` is the visual
/// position and snaps to `cell` when the interpolation finishes.
#[derive(Clone, Debug)]
pub struct Body {
    pub cell: Cell,
    pub pos: Position,
    motion: Option<Motion>,
    move_time: Duration,
}

impl Body {
    pub fn new(cell: Cell, move_time: Duration) -> Self {
        Body { cell, pos: Position::from(cell), motion: None, move_time }
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub fn move_time(&self) -> Duration {
        self.move_time
    }

    /// Accept a step: commit the logical cell and start interpolating.
    pub fn begin(&mut self, to: Cell) {
        self.cell = to;
        self.motion = Some(Motion { to: Position::from(to) });
    }

    /// Advance the interpolation by one frame. Returns `true` on the frame the
    /// body arrives; the motion is dropped at that instant.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(motion) = self.motion else { return false };

        let secs = self.move_time.as_secs_f32();
        let next = if secs <= 0.0 {
            motion.to
        } else {
            self.pos.move_towards(motion.to, dt.as_secs_f32() / secs)
        };
        self.pos = next;

        if self.pos.sqr_distance(motion.to) <= ARRIVAL_EPSILON {
            self.pos = motion.to;
            self.motion = None;
            return true;
        }
        false
    }

    /// Drop any motion and put the body on `cell` (level load / reset).
    pub fn place(&mut self, cell: Cell) {
        self.cell = cell;
        self.pos = Position::from(cell);
        self.motion = None;
    }
}

/// What a blocked step ran into. Closed set: combat switches on this tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Obstacle {
    Wall(WallId),
    Enemy(EnemyId),
    Player,
}

impl std::fmt::Display for Obstacle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Obstacle::Wall(id) => write!(f, "wall #{}", id.0),
            Obstacle::Enemy(id) => write!(f, "enemy #{}", id.0),
            Obstacle::Player => f.write_str("player"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved(Cell),
    /// `None` = terrain (the outer wall ring).
    Blocked(Option<Obstacle>),
}

/// Who is moving; their own collider is excluded from the query.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mover {
    Player,
    Enemy(EnemyId),
}

/// Everything that can block a step. Destroyed walls and enemies are
/// skipped here, which is how removal from play takes effect.
pub struct Blockers<'a> {
    pub bounds: Bounds,
    pub walls: &'a [Wall],
    pub enemies: &'a [Enemy],
    pub player: Cell,
}

impl<'a> Blockers<'a> {
    /// The blocking entity at `cell`, ignoring the mover itself.
    pub fn occupant(&self, cell: Cell, mover: Mover) -> Option<Obstacle> {
        if mover != Mover::Player && self.player == cell {
            return Some(Obstacle::Player);
        }
        if let Some(w) = self.walls.iter().find(|w| w.is_standing() && w.cell == cell) {
            return Some(Obstacle::Wall(w.id));
        }
        self.enemies
            .iter()
            .find(|e| e.alive && e.body.cell == cell && mover != Mover::Enemy(e.id))
            .map(|e| Obstacle::Enemy(e.id))
    }
}

/// Resolve a one-cell step from `from`.
pub fn probe(blockers: &Blockers, mover: Mover, from: Cell, dir: Direction) -> MoveOutcome {
    let (dx, dy) = dir.delta();
    let dest = from.offset(dx, dy);

    if !blockers.bounds.contains(dest) {
        return MoveOutcome::Blocked(None);
    }
    match blockers.occupant(dest, mover) {
        Some(hit) => MoveOutcome::Blocked(Some(hit)),
        None => MoveOutcome::Moved(dest),
    }
}

/// Raw-vector form of [`probe`]. `(0, 0)` trivially "moves" onto `from`.
pub fn attempt_step(
    blockers: &Blockers,
    mover: Mover,
    from: Cell,
    dx: i32,
    dy: i32,
) -> Result<MoveOutcome, SimError> {
    match Direction::from_delta(dx, dy)? {
        Some(dir) => Ok(probe(blockers, mover, from, dir)),
        None => Ok(MoveOutcome::Moved(from)),
    }
}
