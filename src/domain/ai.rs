/// Enemy AI: straight-line chase toward the player.
///
/// Two cases:
///   1. **Aligned**: same column means step vertically, same row means
///      step horizontally, always toward the player.
///   2. **Diagonal**: a fair coin picks the vertical or the horizontal step.
///
/// Only the diagonal case draws from the RNG, so aligned decisions are fully
/// deterministic. There is no pathfinding; a wall in the way simply blocks.

use rand::Rng;

use super::grid::Cell;
use super::movement::Direction;

fn vertical(enemy: Cell, target: Cell) -> Direction {
    if target.y > enemy.y { Direction::Up } else { Direction::Down }
}

fn horizontal(enemy: Cell, target: Cell) -> Direction {
    if target.x > enemy.x { Direction::Right } else { Direction::Left }
}

/// Direction for an enemy at `enemy` chasing `target`.
///
/// Logical cells are integers, so "same column" is exact equality.
/// An enemy already on the target cell steps down (unreachable in play,
/// since the player blocks its own cell).
pub fn choose_direction<R: Rng + ?Sized>(enemy: Cell, target: Cell, rng: &mut R) -> Direction {
    if enemy.x == target.x {
        vertical(enemy, target)
    } else if enemy.y == target.y {
        horizontal(enemy, target)
    } else if rng.gen_bool(0.5) {
        vertical(enemy, target)
    } else {
        horizontal(enemy, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn same_row_player_to_the_right() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..20 {
            let d = choose_direction(Cell::new(2, 4), Cell::new(6, 4), &mut rng);
            assert_eq!(d.delta(), (1, 0));
        }
    }

    #[test]
    fn same_column_moves_vertically() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(choose_direction(Cell::new(3, 1), Cell::new(3, 5), &mut rng), Direction::Up);
        assert_eq!(choose_direction(Cell::new(3, 5), Cell::new(3, 1), &mut rng), Direction::Down);
        assert_eq!(choose_direction(Cell::new(5, 2), Cell::new(1, 2), &mut rng), Direction::Left);
    }

    #[test]
    fn aligned_cases_do_not_consume_randomness() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let b = a.clone();
        choose_direction(Cell::new(0, 0), Cell::new(0, 3), &mut a);
        choose_direction(Cell::new(0, 0), Cell::new(3, 0), &mut a);
        assert_eq!(a, b);
    }

    #[test]
    fn diagonal_picks_both_axes_toward_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seen_v = false;
        let mut seen_h = false;
        for _ in 0..200 {
            match choose_direction(Cell::new(1, 1), Cell::new(4, 5), &mut rng) {
                Direction::Up => seen_v = true,
                Direction::Right => seen_h = true,
                other => panic!("moved away from target: {other:?}"),
            }
        }
        assert!(seen_v && seen_h);
    }
}
