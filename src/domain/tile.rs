/// Board tiles and their properties.
///
/// Tiles are purely visual apart from passability: the outer ring is
/// impassable, floor is walkable. Variant indices pick a sprite/glyph.

use rand::Rng;

use super::grid::{Bounds, Cell};

pub const FLOOR_VARIANTS: u8 = 8;
pub const OUTER_WALL_VARIANTS: u8 = 3;
pub const WALL_VARIANTS: u8 = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor(u8),
    OuterWall(u8),
}

impl Tile {
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Floor(_))
    }

    pub fn variant(self) -> u8 {
        match self {
            Tile::Floor(v) | Tile::OuterWall(v) => v,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor(0)
    }
}

/// The laid-out tile field from (-1, -1) to (columns, rows) inclusive.
#[derive(Clone, Debug)]
pub struct TileField {
    bounds: Bounds,
    tiles: Vec<Tile>,
}

impl TileField {
    /// Lay the field, drawing a random variant for every tile.
    pub fn lay<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> Self {
        let w = (bounds.columns + 2) as usize;
        let h = (bounds.rows + 2) as usize;
        let mut tiles = Vec::with_capacity(w * h);
        for y in -1..=bounds.rows {
            for x in -1..=bounds.columns {
                let tile = if bounds.is_border(Cell::new(x, y)) {
                    Tile::OuterWall(rng.gen_range(0..OUTER_WALL_VARIANTS))
                } else {
                    Tile::Floor(rng.gen_range(0..FLOOR_VARIANTS))
                };
                tiles.push(tile);
            }
        }
        TileField { bounds, tiles }
    }

    /// A field with variant 0 everywhere (tests, headless hosts).
    pub fn plain(bounds: Bounds) -> Self {
        let w = (bounds.columns + 2) as usize;
        let h = (bounds.rows + 2) as usize;
        let mut tiles = Vec::with_capacity(w * h);
        for y in -1..=bounds.rows {
            for x in -1..=bounds.columns {
                let border = bounds.is_border(Cell::new(x, y));
                tiles.push(if border { Tile::OuterWall(0) } else { Tile::Floor(0) });
            }
        }
        TileField { bounds, tiles }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Tile at a cell; `None` outside the field.
    pub fn get(&self, cell: Cell) -> Option<Tile> {
        let w = self.bounds.columns + 2;
        let h = self.bounds.rows + 2;
        let (ix, iy) = (cell.x + 1, cell.y + 1);
        if ix < 0 || iy < 0 || ix >= w || iy >= h {
            return None;
        }
        self.tiles.get((iy * w + ix) as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn field_covers_border_ring() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let field = TileField::lay(Bounds::new(8, 8), &mut rng);
        assert_eq!(field.len(), 100);
        assert!(matches!(field.get(Cell::new(-1, -1)), Some(Tile::OuterWall(_))));
        assert!(matches!(field.get(Cell::new(8, 4)), Some(Tile::OuterWall(_))));
        assert!(matches!(field.get(Cell::new(0, 0)), Some(Tile::Floor(_))));
        assert!(matches!(field.get(Cell::new(7, 7)), Some(Tile::Floor(_))));
        assert_eq!(field.get(Cell::new(9, 0)), None);
    }

    #[test]
    fn variants_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let field = TileField::lay(Bounds::new(10, 6), &mut rng);
        for y in -1..=6 {
            for x in -1..=10 {
                let tile = field.get(Cell::new(x, y)).unwrap();
                match tile {
                    Tile::Floor(v) => assert!(v < FLOOR_VARIANTS),
                    Tile::OuterWall(v) => assert!(v < OUTER_WALL_VARIANTS),
                }
            }
        }
    }

    #[test]
    fn only_floor_is_passable() {
        assert!(Tile::Floor(2).is_passable());
        assert!(!Tile::OuterWall(1).is_passable());
    }
}
