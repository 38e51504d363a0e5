//! The fixed-size 2D tile grid (component C1).
//!
//! Rows are stored contiguously so `get`/`in_bounds` are O(1) and never
//! allocate. The grid is built once during world generation and never
//! mutated again during a tick.

use serde::{Deserialize, Serialize};
use tickforge_types::{Position, Tile};

/// A row-major 2D array of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid of the given dimensions, filled with `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive, or if their product
    /// overflows `usize` -- both indicate a malformed configuration that
    /// should never reach this constructor.
    #[must_use]
    pub fn filled(width: i32, height: i32, fill: Tile) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let area = usize::try_from(width)
            .expect("width fits usize")
            .checked_mul(usize::try_from(height).expect("height fits usize"))
            .expect("grid area does not overflow");
        Self {
            width,
            height,
            tiles: vec![fill; area],
        }
    }

    /// Builds a grid from pre-generated tile content. `tiles.len()` must
    /// equal `width * height`.
    ///
    /// # Panics
    ///
    /// Panics if `tiles.len()` does not match `width * height`.
    #[must_use]
    pub fn from_tiles(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        let area = usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0);
        assert_eq!(tiles.len(), area, "tile buffer length must match width * height");
        Self { width, height, tiles }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(y.checked_mul(width)?.checked_add(x)?)
    }

    /// Returns the tile at `pos`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.index_of(pos).and_then(|i| self.tiles.get(i).copied())
    }

    /// Whether `pos` is in bounds and its tile is walkable.
    #[must_use]
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(Tile::is_walkable)
    }

    /// Whether any of the four orthogonal neighbors of `pos` is a wall
    /// (or out of bounds, treated as a wall for adjacency purposes).
    #[must_use]
    pub fn touches_wall(&self, pos: Position) -> bool {
        [
            Position::new(pos.x + 1, pos.y),
            Position::new(pos.x - 1, pos.y),
            Position::new(pos.x, pos.y + 1),
            Position::new(pos.x, pos.y - 1),
        ]
        .into_iter()
        .any(|n| !self.get(n).is_some_and(Tile::is_walkable))
    }

    /// Bresenham line-of-sight check between two cells: returns `false`
    /// if any intermediate cell (excluding the endpoints) is a wall.
    #[must_use]
    pub fn line_of_sight(&self, from: Position, to: Position) -> bool {
        let (mut x0, mut y0) = (from.x, from.y);
        let (x1, y1) = (to.x, to.y);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if (x0, y0) != (from.x, from.y) && (x0, y0) != (x1, y1) {
                let cell = Position::new(x0, y0);
                if !self.get(cell).is_some_and(Tile::is_walkable) {
                    return false;
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
        true
    }
}
