//! Property-based tests for level generation, combat, and food accounting.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use scavenger::config::{CountRange, LevelConfig, TimingConfig};
use scavenger::domain::combat::apply_damage;
use scavenger::domain::grid::{Bounds, GridIndex};
use scavenger::sim::level::{enemy_count, generate};
use scavenger::{Game, Services, TurnState};

fn log2_by_halving(mut n: u32) -> u32 {
    let mut steps = 0;
    while n >= 2 {
        n /= 2;
        steps += 1;
    }
    steps
}

/// Empty board, no enemies on day 1, short delays.
fn open_field(start_food: i32) -> LevelConfig {
    LevelConfig {
        wall_count: CountRange { min: 0, max: 0 },
        food_count: CountRange { min: 0, max: 0 },
        start_food,
        player_move_time: Duration::from_millis(20),
        timing: TimingConfig {
            level_start_delay: Duration::from_millis(50),
            turn_delay: Duration::from_millis(5),
            restart_level_delay: Duration::from_millis(50),
        },
        ..LevelConfig::default()
    }
}

fn cardinal() -> impl Strategy<Value = (i32, i32)> {
    prop_oneof![Just((1, 0)), Just((-1, 0)), Just((0, 1)), Just((0, -1))]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_enemy_count_is_floor_log2(level in 1u32..5_000_000) {
        prop_assert_eq!(enemy_count(level), log2_by_halving(level));
    }

    /// Walls, pickups, and enemies never share a cell and always land inside
    /// the interior; the grid index accounts for every claim.
    #[test]
    fn prop_generated_cells_are_distinct(
        seed in any::<u64>(),
        level in 1u32..200,
        columns in 7i32..12,
        rows in 7i32..12,
    ) {
        let config = LevelConfig {
            columns,
            rows,
            wall_count: CountRange { min: 1, max: 4 },
            food_count: CountRange { min: 0, max: 3 },
            ..LevelConfig::default()
        };
        let bounds = Bounds::new(columns, rows);
        let mut grid = GridIndex::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cosmetic = ChaCha8Rng::seed_from_u64(seed ^ 0xA5A5);

        let layout = generate(level, &config, &mut grid, &mut rng, &mut cosmetic).unwrap();
        let cells = layout.claimed_cells();
        let unique: HashSet<_> = cells.iter().copied().collect();

        prop_assert_eq!(unique.len(), cells.len());
        prop_assert!(cells.iter().all(|c| bounds.interior().any(|i| i == *c)));
        prop_assert_eq!(grid.claimed(), cells.len());
        prop_assert_eq!(grid.remaining() + grid.claimed(), bounds.interior_len());
        prop_assert_eq!(layout.enemies.len() as u32, enemy_count(level));
    }

    #[test]
    fn prop_damage_is_subtraction(health in -50i32..500, amount in 0u32..500) {
        let mut h = health;
        let out = apply_damage(&mut h, amount);
        prop_assert_eq!(out.remaining, health - amount as i32);
        prop_assert_eq!(h, out.remaining);
        prop_assert_eq!(out.destroyed, out.remaining <= 0);
    }

    /// Every attempt costs exactly one food, whether it moves or bumps the
    /// border. Twelve steps cannot reach the far exit on an 8x8 board.
    #[test]
    fn prop_each_attempt_costs_one_food(
        seed in any::<u64>(),
        moves in proptest::collection::vec(cardinal(), 1..12),
    ) {
        let mut game = Game::seeded(open_field(100), seed, Services::silent()).unwrap();
        let mut none: Option<(i32, i32)> = None;
        game.on_tick(Duration::from_secs(1), &mut none);
        prop_assert_eq!(game.state(), TurnState::PlayerTurn);

        for (i, dir) in moves.iter().enumerate() {
            let mut intent = Some(*dir);
            game.on_tick(Duration::from_millis(1), &mut intent);
            prop_assert_eq!(game.food(), 100 - (i as i32 + 1));
            game.on_tick(Duration::from_secs(1), &mut none);
            prop_assert_eq!(game.state(), TurnState::PlayerTurn);
        }
    }
}
