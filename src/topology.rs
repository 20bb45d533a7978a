//! Read-only road queries a renderer uses to orient traffic and pick road pieces.

use serde::Serialize;

use crate::grid::Grid;

/// Three or more road neighbours make a tile an intersection.
pub const INTERSECTION_DEGREE: usize = 3;

/// Off-grid cells are never roads.
pub fn is_road(grid: &Grid, x: i32, y: i32) -> bool {
    grid.lookup(x, y).is_some_and(|tile| tile.is_road())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RoadConnections {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl RoadConnections {
    pub fn degree(self) -> usize {
        [self.north, self.east, self.south, self.west]
            .into_iter()
            .filter(|&connected| connected)
            .count()
    }

    pub fn vertical(self) -> bool {
        self.north || self.south
    }

    pub fn horizontal(self) -> bool {
        self.east || self.west
    }
}

/// North is `y - 1`. Neighbours past the edge of `i32` count as off-grid.
pub fn connections(grid: &Grid, x: i32, y: i32) -> RoadConnections {
    let road_at = |nx: Option<i32>, ny: Option<i32>| match (nx, ny) {
        (Some(nx), Some(ny)) => is_road(grid, nx, ny),
        _ => false,
    };
    RoadConnections {
        north: road_at(Some(x), y.checked_sub(1)),
        east: road_at(x.checked_add(1), Some(y)),
        south: road_at(Some(x), y.checked_add(1)),
        west: road_at(x.checked_sub(1), Some(y)),
    }
}

pub fn intersection_degree(grid: &Grid, x: i32, y: i32) -> usize {
    connections(grid, x, y).degree()
}

pub fn is_intersection(grid: &Grid, x: i32, y: i32) -> bool {
    is_road(grid, x, y) && intersection_degree(grid, x, y) >= INTERSECTION_DEGREE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Z,
}

/// Traffic runs along `Z` only on a purely vertical stretch; everything else is `X`.
pub fn preferred_axis(grid: &Grid, x: i32, y: i32) -> Axis {
    let links = connections(grid, x, y);
    if links.vertical() && !links.horizontal() {
        Axis::Z
    } else {
        Axis::X
    }
}
