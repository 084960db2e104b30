//! The fixed-size tile grid and its geometry helpers.
//!
//! Logic always works in [`TilePos`]; presentation positions are the pixel
//! centre of a tile, derived by [`Grid::tile_center`].

use serde::{Deserialize, Serialize};

use blockadia_types::{TilePos, WorldPoint};

/// Dimensions of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Columns.
    width: u32,
    /// Rows.
    height: u32,
    /// Edge length of one tile in pixels.
    tile_size: u32,
}

impl Grid {
    /// Create a grid. Dimensions are clamped to at least one tile and to the
    /// `i32` range so every in-bounds tile has a valid [`TilePos`].
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let limit = u32::try_from(i32::MAX).unwrap_or(u32::MAX);
        Self {
            width: width.clamp(1, limit),
            height: height.clamp(1, limit),
            tile_size: tile_size.max(1),
        }
    }

    /// Columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per tile edge.
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Whether `tile` lies on the grid.
    pub fn in_bounds(&self, tile: TilePos) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(tile.x), u32::try_from(tile.y)) else {
            return false;
        };
        x < self.width && y < self.height
    }

    /// Whether every tile of a `size`-square footprint lies on the grid.
    pub fn footprint_in_bounds(&self, origin: TilePos, size: u8) -> bool {
        let far = i32::from(size.max(1)).saturating_sub(1);
        self.in_bounds(origin) && self.in_bounds(origin.offset(far, far))
    }

    /// The tile in the middle of the map.
    pub fn center_tile(&self) -> TilePos {
        let x = i32::try_from(self.width / 2).unwrap_or(0);
        let y = i32::try_from(self.height / 2).unwrap_or(0);
        TilePos::new(x, y)
    }

    /// Pixel centre of a tile.
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_center(&self, tile: TilePos) -> WorldPoint {
        // Grid coordinates stay far below 2^24, so f32 is exact here.
        let size = self.tile_size as f32;
        WorldPoint::new(
            (tile.x as f32).mul_add(size, size / 2.0),
            (tile.y as f32).mul_add(size, size / 2.0),
        )
    }

    /// Pixel centre of a `size`-square footprint.
    #[allow(clippy::cast_precision_loss)]
    pub fn footprint_center(&self, origin: TilePos, size: u8) -> WorldPoint {
        let px = self.tile_size as f32;
        let half = f32::from(size) * px / 2.0;
        WorldPoint::new(
            (origin.x as f32).mul_add(px, half),
            (origin.y as f32).mul_add(px, half),
        )
    }

    /// The tile containing a pixel position.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn tile_at(&self, point: WorldPoint) -> TilePos {
        let size = self.tile_size as f32;
        TilePos::new((point.x / size).floor() as i32, (point.y / size).floor() as i32)
    }

    /// Every tile of a `size`-square footprint, row-major from `origin`.
    pub fn footprint(origin: TilePos, size: u8) -> impl Iterator<Item = TilePos> {
        let size = i32::from(size);
        (0..size).flat_map(move |dy| (0..size).map(move |dx| origin.offset(dx, dy)))
    }

    /// In-bounds tiles at exactly Chebyshev distance `distance` from the
    /// footprint rectangle, row-major.
    ///
    /// Distance 0 yields the footprint itself.
    pub fn perimeter(&self, origin: TilePos, size: u8, distance: u32) -> Vec<TilePos> {
        let d = i32::try_from(distance).unwrap_or(i32::MAX);
        let far = i32::from(size.max(1)).saturating_sub(1);
        let min = origin.offset(d.saturating_neg(), d.saturating_neg());
        let max = origin.offset(far.saturating_add(d), far.saturating_add(d));
        // Tiles strictly closer than `d` are skipped.
        let inner_min = min.offset(1, 1);
        let inner_max = max.offset(-1, -1);

        let mut tiles = Vec::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let inside = d > 0
                    && x >= inner_min.x
                    && x <= inner_max.x
                    && y >= inner_min.y
                    && y <= inner_max.y;
                let tile = TilePos::new(x, y);
                if !inside && self.in_bounds(tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// Tiles in rings of growing distance around `center`, nearest first,
    /// up to and including `radius`.
    pub fn spiral(&self, center: TilePos, radius: u32) -> impl Iterator<Item = TilePos> + '_ {
        (0..=radius).flat_map(move |d| self.perimeter(center, 1, d))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(80, 60, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let grid = Grid::new(80, 60, 32);
        assert!(grid.in_bounds(TilePos::new(0, 0)));
        assert!(grid.in_bounds(TilePos::new(79, 59)));
        assert!(!grid.in_bounds(TilePos::new(80, 0)));
        assert!(!grid.in_bounds(TilePos::new(-1, 3)));
        assert!(grid.footprint_in_bounds(TilePos::new(77, 57), 3));
        assert!(!grid.footprint_in_bounds(TilePos::new(78, 57), 3));
    }

    #[test]
    fn tile_center_round_trips() {
        let grid = Grid::default();
        let tile = TilePos::new(12, 7);
        let center = grid.tile_center(tile);
        assert!((center.x - 400.0).abs() < f32::EPSILON);
        assert!((center.y - 240.0).abs() < f32::EPSILON);
        assert_eq!(grid.tile_at(center), tile);
    }

    #[test]
    fn footprint_is_row_major() {
        let tiles: Vec<_> = Grid::footprint(TilePos::new(2, 3), 2).collect();
        assert_eq!(
            tiles,
            vec![
                TilePos::new(2, 3),
                TilePos::new(3, 3),
                TilePos::new(2, 4),
                TilePos::new(3, 4),
            ]
        );
    }

    #[test]
    fn perimeter_ring_sizes() {
        let grid = Grid::default();
        assert_eq!(grid.perimeter(TilePos::new(10, 10), 1, 0).len(), 1);
        assert_eq!(grid.perimeter(TilePos::new(10, 10), 1, 1).len(), 8);
        assert_eq!(grid.perimeter(TilePos::new(10, 10), 1, 2).len(), 16);
        assert_eq!(grid.perimeter(TilePos::new(10, 10), 3, 1).len(), 16);
    }

    #[test]
    fn perimeter_clips_to_grid() {
        let grid = Grid::default();
        assert_eq!(grid.perimeter(TilePos::new(0, 0), 1, 1).len(), 3);
    }

    #[test]
    fn spiral_starts_at_center() {
        let grid = Grid::default();
        let tiles: Vec<_> = grid.spiral(TilePos::new(5, 5), 2).collect();
        assert_eq!(tiles.first(), Some(&TilePos::new(5, 5)));
        assert_eq!(tiles.len(), 25);
    }
}
