use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::BuildingType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("coordinate ({x}, {y}) is outside the {size}x{size} grid")]
pub struct GridError {
    pub x: i32,
    pub y: i32,
    pub size: usize,
}

/// An in-bounds cell address. Only the grid hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn signed(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// One grid cell. An empty tile never carries a construction timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    building: BuildingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    construction_ticks_left: Option<u32>,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        building: BuildingType::None,
        construction_ticks_left: None,
    };

    /// A finished building (or road) that contributes from the next aggregation on.
    pub fn active(building: BuildingType) -> Self {
        Self {
            building,
            construction_ticks_left: None,
        }
    }

    pub fn under_construction(building: BuildingType, ticks: u32) -> Self {
        if building == BuildingType::None || ticks == 0 {
            return Self::active(building);
        }
        Self {
            building,
            construction_ticks_left: Some(ticks),
        }
    }

    pub fn building(&self) -> BuildingType {
        self.building
    }

    pub fn construction_ticks_left(&self) -> Option<u32> {
        self.construction_ticks_left
    }

    pub fn is_empty(&self) -> bool {
        self.building == BuildingType::None
    }

    pub fn is_road(&self) -> bool {
        self.building.is_road()
    }

    pub fn is_under_construction(&self) -> bool {
        matches!(self.construction_ticks_left, Some(ticks) if ticks > 0)
    }

    /// Holds a building whose construction has finished.
    pub fn is_active(&self) -> bool {
        !self.is_empty() && !self.is_under_construction()
    }

    pub fn is_consistent(&self) -> bool {
        !(self.is_empty() && self.construction_ticks_left.is_some())
    }

    /// Count the timer down by one. Returns true when this call finished the building.
    pub(crate) fn advance_construction(&mut self) -> bool {
        match self.construction_ticks_left {
            Some(ticks) if ticks > 1 => {
                self.construction_ticks_left = Some(ticks - 1);
                false
            }
            Some(_) => {
                self.construction_ticks_left = None;
                true
            }
            None => false,
        }
    }
}

/// Square grid of tiles stored row-major, addressed as `(x, y)` = (column, row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            tiles: vec![Tile::EMPTY; size * size],
        }
    }

    /// Rebuild a grid from a row-major tile sequence.
    pub fn from_tiles(size: usize, mut tiles: Vec<Tile>) -> Option<Self> {
        if tiles.len() != size * size || !tiles.iter().all(Tile::is_consistent) {
            return None;
        }
        for tile in &mut tiles {
            if tile.construction_ticks_left == Some(0) {
                tile.construction_ticks_left = None;
            }
        }
        Some(Self { size, tiles })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coord(&self, x: i32, y: i32) -> Result<Coord, GridError> {
        if x < 0 || y < 0 || x as usize >= self.size || y as usize >= self.size {
            return Err(GridError {
                x,
                y,
                size: self.size,
            });
        }
        Ok(Coord {
            x: x as usize,
            y: y as usize,
        })
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        coord.y * self.size + coord.x
    }

    pub fn get(&self, x: i32, y: i32) -> Result<&Tile, GridError> {
        let coord = self.coord(x, y)?;
        Ok(self.tile(coord))
    }

    /// Off-grid reads come back as `None` instead of an error.
    pub fn lookup(&self, x: i32, y: i32) -> Option<&Tile> {
        self.get(x, y).ok()
    }

    pub fn tile(&self, coord: Coord) -> &Tile {
        &self.tiles[self.index(coord)]
    }

    pub(crate) fn set(&mut self, coord: Coord, tile: Tile) {
        let idx = self.index(coord);
        self.tiles[idx] = tile;
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = (Coord, &mut Tile)> {
        let size = self.size;
        self.tiles.iter_mut().enumerate().map(move |(idx, tile)| {
            (
                Coord {
                    x: idx % size,
                    y: idx / size,
                },
                tile,
            )
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        let size = self.size;
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            (
                Coord {
                    x: idx % size,
                    y: idx / size,
                },
                tile,
            )
        })
    }

    /// Orthogonal neighbours, clipped at the edges. Order: up, right, down, left.
    pub fn neighbors4(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let (x, y) = coord.signed();
        [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)]
            .into_iter()
            .filter_map(move |(nx, ny)| self.coord(nx, ny).ok())
    }

    pub fn count(&self, kind: BuildingType) -> usize {
        self.tiles.iter().filter(|t| t.building() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(15);
        assert_eq!(grid.tiles().len(), 225);
        assert!(grid.tiles().iter().all(|t| *t == Tile::EMPTY));
    }

    #[test]
    fn out_of_bounds_reads_are_errors() {
        let grid = Grid::new(15);
        assert!(grid.get(0, 0).is_ok());
        assert!(grid.get(14, 14).is_ok());
        for (x, y) in [(-1, 0), (0, -1), (15, 0), (0, 15)] {
            let err = grid.get(x, y).unwrap_err();
            assert_eq!((err.x, err.y, err.size), (x, y, 15));
            assert!(grid.lookup(x, y).is_none());
        }
    }

    #[test]
    fn set_addresses_row_major() {
        let mut grid = Grid::new(4);
        let coord = grid.coord(3, 1).unwrap();
        grid.set(coord, Tile::active(BuildingType::Road));
        assert_eq!(grid.tiles()[4 + 3].building(), BuildingType::Road);
        assert!(grid.get(1, 3).unwrap().is_empty());
    }

    #[test]
    fn neighbors_clip_at_corners_and_edges() {
        let grid = Grid::new(5);
        let corner: Vec<_> = grid.neighbors4(grid.coord(0, 0).unwrap()).collect();
        assert_eq!(corner, vec![Coord { x: 1, y: 0 }, Coord { x: 0, y: 1 }]);
        assert_eq!(grid.neighbors4(grid.coord(2, 0).unwrap()).count(), 3);
        assert_eq!(grid.neighbors4(grid.coord(2, 2).unwrap()).count(), 4);
    }

    #[test]
    fn empty_tiles_never_hold_timers() {
        assert_eq!(Tile::under_construction(BuildingType::None, 4), Tile::EMPTY);
        assert!(!Tile::under_construction(BuildingType::Park, 0).is_under_construction());
    }

    #[test]
    fn construction_counts_down_to_active() {
        let mut tile = Tile::under_construction(BuildingType::Hotel, 2);
        assert!(!tile.is_active());
        assert!(!tile.advance_construction());
        assert_eq!(tile.construction_ticks_left(), Some(1));
        assert!(tile.advance_construction());
        assert_eq!(tile.construction_ticks_left(), None);
        assert!(tile.is_active());
        assert!(!tile.advance_construction());
    }

    #[test]
    fn from_tiles_rejects_bad_shapes() {
        assert!(Grid::from_tiles(2, vec![Tile::EMPTY; 3]).is_none());
        let tiles = vec![Tile::EMPTY; 4];
        assert_eq!(Grid::from_tiles(2, tiles), Some(Grid::new(2)));
    }
}
