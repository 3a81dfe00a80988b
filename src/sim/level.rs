/// Procedural level generation.
///
/// ## Pass order
///   1. Tile field (border ring + floor), cosmetic variants only
///   2. Reset the grid index over the interior
///   3. Walls: `[wall_count.min, wall_count.max]`, full hit points
///   4. Pickups: `[food_count.min, food_count.max]`, Food or Soda
///   5. Enemies: `floor(log2(level))`, each of a random configured kind
///   6. Exit: always `(columns-1, rows-1)`, not drawn from the grid index
///
/// Steps 3-5 claim cells from the grid index, so their placements are
/// pairwise distinct. The exit sits on the walkable ring outside the
/// interior and is never checked against them.
///
/// Two RNG streams: `rng` decides gameplay (counts, cells, kinds) and
/// `cosmetic` decides sprite variants, so changing the art never changes a
/// seeded layout.

use rand::Rng;

use crate::config::LevelConfig;
use crate::domain::entity::{Enemy, EnemyId, Pickup, PickupKind, Wall, WallId};
use crate::domain::grid::{Bounds, Cell, GridIndex};
use crate::domain::tile::{TileField, WALL_VARIANTS};
use crate::error::SimError;

/// Everything one generation pass produced.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    pub level: u32,
    pub bounds: Bounds,
    pub tiles: TileField,
    pub walls: Vec<Wall>,
    pub pickups: Vec<Pickup>,
    /// Spawn order; this is the roster order for the enemy phase.
    pub enemies: Vec<Enemy>,
    pub exit: Cell,
}

impl LevelLayout {
    /// Cells claimed from the grid index (walls, pickups, enemies).
    pub fn claimed_cells(&self) -> Vec<Cell> {
        self.walls.iter().map(|w| w.cell)
            .chain(self.pickups.iter().map(|p| p.cell))
            .chain(self.enemies.iter().map(|e| e.body.cell))
            .collect()
    }
}

/// Enemies spawned on `level`: `floor(log2(level))`, 0 below level 2.
pub fn enemy_count(level: u32) -> u32 {
    level.checked_ilog2().unwrap_or(0)
}

/// Exit cell for a board.
pub fn exit_cell(bounds: Bounds) -> Cell {
    Cell::new(bounds.columns - 1, bounds.rows - 1)
}

/// Inverted ranges are rejected by `LevelConfig::validate`; here they draw `min`.
fn draw_count<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    rng.gen_range(min..=max.max(min))
}

/// Build the layout for `level`.
///
/// Fails with [`SimError::ExhaustedGrid`] when the counts drawn exceed the
/// free interior; nothing is placed on top of anything else in that case.
pub fn generate<R: Rng + ?Sized, C: Rng + ?Sized>(
    level: u32,
    config: &LevelConfig,
    grid: &mut GridIndex,
    rng: &mut R,
    cosmetic: &mut C,
) -> Result<LevelLayout, SimError> {
    let bounds = Bounds::new(config.columns, config.rows);
    let tiles = TileField::lay(bounds, cosmetic);
    grid.initialize(bounds);

    let wall_n = draw_count(rng, config.wall_count.min, config.wall_count.max);
    let mut walls = Vec::with_capacity(wall_n as usize);
    for i in 0..wall_n as usize {
        let cell = grid.take_random_free_cell(rng)?;
        let variant = cosmetic.gen_range(0..WALL_VARIANTS);
        walls.push(Wall::new(WallId(i), cell, config.wall_hp, variant));
    }

    let food_n = draw_count(rng, config.food_count.min, config.food_count.max);
    let mut pickups = Vec::with_capacity(food_n as usize);
    for _ in 0..food_n {
        let cell = grid.take_random_free_cell(rng)?;
        let kind = if rng.gen_bool(0.5) { PickupKind::Food } else { PickupKind::Soda };
        pickups.push(Pickup::new(cell, kind));
    }

    let enemy_n = enemy_count(level);
    let mut enemies = Vec::with_capacity(enemy_n as usize);
    for i in 0..enemy_n as usize {
        let cell = grid.take_random_free_cell(rng)?;
        let kind = rng.gen_range(0..config.enemy_kinds.len().max(1));
        let stats = config.enemy_kinds.get(kind).copied().unwrap_or_default();
        enemies.push(Enemy::new(
            EnemyId(i),
            kind,
            cell,
            stats.health,
            stats.damage,
            config.enemy_move_time,
        ));
    }

    let exit = exit_cell(bounds);

    log::info!(
        "day {level}: {}x{} board, {} walls, {} pickups, {} enemies, {} free cells left",
        bounds.columns, bounds.rows, walls.len(), pickups.len(), enemies.len(), grid.remaining()
    );

    Ok(LevelLayout { level, bounds, tiles, walls, pickups, enemies, exit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountRange;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn rngs(seed: u64) -> (ChaCha8Rng, ChaCha8Rng) {
        (ChaCha8Rng::seed_from_u64(seed), ChaCha8Rng::seed_from_u64(seed ^ 0xA5A5))
    }

    #[test]
    fn enemy_count_is_log2() {
        assert_eq!(enemy_count(0), 0);
        assert_eq!(enemy_count(1), 0);
        assert_eq!(enemy_count(2), 1);
        assert_eq!(enemy_count(3), 1);
        assert_eq!(enemy_count(4), 2);
        assert_eq!(enemy_count(7), 2);
        assert_eq!(enemy_count(8), 3);
        assert_eq!(enemy_count(1024), 10);
    }

    #[test]
    fn level_four_on_default_board() {
        let config = LevelConfig::default();
        let mut grid = GridIndex::new();
        let (mut rng, mut cosmetic) = rngs(4);
        let layout = generate(4, &config, &mut grid, &mut rng, &mut cosmetic).unwrap();

        assert_eq!(layout.enemies.len(), 2);
        assert!((5..=9).contains(&layout.walls.len()));
        assert!((1..=5).contains(&layout.pickups.len()));
        assert_eq!(grid.remaining(), 36 - layout.claimed_cells().len());
        assert!(grid.remaining() >= 36 - (9 + 5 + 2));
        assert_eq!(layout.exit, Cell::new(7, 7));
        assert!(layout.walls.iter().all(|w| w.hp == 4 && !w.damaged));
    }

    #[test]
    fn placements_are_distinct_and_interior() {
        let config = LevelConfig::default();
        let mut grid = GridIndex::new();
        for seed in 0..50 {
            let (mut rng, mut cosmetic) = rngs(seed);
            let layout = generate(16, &config, &mut grid, &mut rng, &mut cosmetic).unwrap();
            let cells = layout.claimed_cells();
            let unique: HashSet<_> = cells.iter().copied().collect();
            assert_eq!(unique.len(), cells.len(), "seed {seed}");
            for c in cells {
                assert!(c.x >= 1 && c.x < 7 && c.y >= 1 && c.y < 7, "{c} outside interior");
            }
        }
    }

    #[test]
    fn overdraw_is_an_error() {
        let config = LevelConfig {
            columns: 4,
            rows: 4,
            wall_count: CountRange { min: 3, max: 3 },
            food_count: CountRange { min: 2, max: 2 },
            ..LevelConfig::default()
        };
        let mut grid = GridIndex::new();
        let (mut rng, mut cosmetic) = rngs(1);
        assert_eq!(
            generate(1, &config, &mut grid, &mut rng, &mut cosmetic).unwrap_err(),
            SimError::ExhaustedGrid { claimed: 4 }
        );
    }

    #[test]
    fn cosmetic_stream_does_not_change_layout() {
        let config = LevelConfig::default();
        let mut grid = GridIndex::new();
        let mut rng_a = ChaCha8Rng::seed_from_u64(77);
        let mut rng_b = ChaCha8Rng::seed_from_u64(77);
        let a = generate(8, &config, &mut grid, &mut rng_a, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = generate(8, &config, &mut grid, &mut rng_b, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        assert_eq!(a.claimed_cells(), b.claimed_cells());
    }
}
