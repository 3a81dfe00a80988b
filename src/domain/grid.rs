/// Grid coordinates and the free-cell index used during level generation.
///
/// The walkable board spans `[0, columns) x [0, rows)`. Outer walls sit on
/// the ring just outside it (x = -1, x = columns, y = -1, y = rows). Random
/// placements are drawn from the interior `[1, columns-1) x [1, rows-1)`,
/// which leaves the first walkable ring clear so the board always has a path
/// around its edge.

use rand::Rng;

use crate::error::SimError;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Cell {
        Cell { x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Board dimensions. Copy-cheap, passed by value into every query.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub columns: i32,
    pub rows: i32,
}

impl Bounds {
    pub const fn new(columns: i32, rows: i32) -> Self {
        Bounds { columns, rows }
    }

    /// Is the cell on the walkable board?
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.columns && cell.y >= 0 && cell.y < self.rows
    }

    /// Is the cell on the outer-wall ring?
    #[inline]
    pub fn is_border(&self, cell: Cell) -> bool {
        let in_ring_x = cell.x >= -1 && cell.x <= self.columns;
        let in_ring_y = cell.y >= -1 && cell.y <= self.rows;
        in_ring_x
            && in_ring_y
            && (cell.x == -1 || cell.x == self.columns || cell.y == -1 || cell.y == self.rows)
    }

    /// Interior spawnable cells, column-major like the free list is built.
    pub fn interior(&self) -> impl Iterator<Item = Cell> {
        let (columns, rows) = (self.columns, self.rows);
        (1..columns - 1).flat_map(move |x| (1..rows - 1).map(move |y| Cell::new(x, y)))
    }

    pub fn interior_len(&self) -> usize {
        let w = (self.columns - 2).max(0) as usize;
        let h = (self.rows - 2).max(0) as usize;
        w * h
    }
}

/// Free interior cells for one generation pass.
///
/// Claims are permanent for the level: there is no way to hand a cell back,
/// which is what guarantees no two generated entities start on one cell.
#[derive(Clone, Debug, Default)]
pub struct GridIndex {
    free: Vec<Cell>,
    claimed: usize,
}

impl GridIndex {
    pub fn new() -> Self {
        GridIndex::default()
    }

    /// Mark every interior cell free, discarding earlier claims.
    pub fn initialize(&mut self, bounds: Bounds) {
        self.free.clear();
        self.free.extend(bounds.interior());
        self.claimed = 0;
    }

    /// Claim a uniformly random free cell.
    pub fn take_random_free_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Cell, SimError> {
        if self.free.is_empty() {
            return Err(SimError::ExhaustedGrid { claimed: self.claimed });
        }
        let idx = rng.gen_range(0..self.free.len());
        self.claimed += 1;
        Ok(self.free.swap_remove(idx))
    }

    pub fn remaining(&self) -> usize {
        self.free.len()
    }

    pub fn claimed(&self) -> usize {
        self.claimed
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        self.free.contains(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn default_board_has_36_interior_cells() {
        let mut grid = GridIndex::new();
        grid.initialize(Bounds::new(8, 8));
        assert_eq!(grid.remaining(), 36);
        assert_eq!(Bounds::new(8, 8).interior_len(), 36);
        assert!(grid.is_free(Cell::new(1, 1)));
        assert!(grid.is_free(Cell::new(6, 6)));
        assert!(!grid.is_free(Cell::new(0, 3)));
        assert!(!grid.is_free(Cell::new(7, 7)));
    }

    #[test]
    fn claims_are_unique_until_exhausted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = GridIndex::new();
        grid.initialize(Bounds::new(5, 4)); // 3x2 interior
        let mut seen = HashSet::new();
        for _ in 0..6 {
            let cell = grid.take_random_free_cell(&mut rng).unwrap();
            assert!(seen.insert(cell), "cell {cell} claimed twice");
            assert!(!grid.is_free(cell));
        }
        assert_eq!(grid.remaining(), 0);
        assert_eq!(
            grid.take_random_free_cell(&mut rng),
            Err(SimError::ExhaustedGrid { claimed: 6 })
        );
    }

    #[test]
    fn reinitialize_restores_every_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = GridIndex::new();
        grid.initialize(Bounds::new(8, 8));
        for _ in 0..10 {
            grid.take_random_free_cell(&mut rng).unwrap();
        }
        grid.initialize(Bounds::new(8, 8));
        assert_eq!(grid.remaining(), 36);
        assert_eq!(grid.claimed(), 0);
    }

    #[test]
    fn degenerate_board_has_no_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = GridIndex::new();
        grid.initialize(Bounds::new(2, 2));
        assert_eq!(grid.remaining(), 0);
        assert!(grid.take_random_free_cell(&mut rng).is_err());
    }

    #[test]
    fn border_ring_surrounds_board() {
        let b = Bounds::new(8, 8);
        assert!(b.is_border(Cell::new(-1, -1)));
        assert!(b.is_border(Cell::new(8, 3)));
        assert!(b.is_border(Cell::new(4, 8)));
        assert!(!b.is_border(Cell::new(0, 0)));
        assert!(!b.is_border(Cell::new(9, 3)));
        assert!(b.contains(Cell::new(7, 7)));
        assert!(!b.contains(Cell::new(8, 7)));
    }
}
