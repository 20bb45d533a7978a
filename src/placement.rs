use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BuildingType, Catalog};
use crate::grid::{Coord, Grid, GridError, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error(transparent)]
    OutOfBounds(#[from] GridError),
    #[error("{required} needed, {available} available")]
    InsufficientFunds { required: i64, available: i64 },
    #[error("tile ({x}, {y}) already holds {occupant}")]
    TileOccupied {
        x: usize,
        y: usize,
        occupant: BuildingType,
    },
    #[error("only one {building} is allowed")]
    DuplicateUnique { building: BuildingType },
}

impl PlacementError {
    /// Stable identifier for UIs and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PlacementError::OutOfBounds(_) => "out_of_bounds",
            PlacementError::InsufficientFunds { .. } => "insufficient_funds",
            PlacementError::TileOccupied { .. } => "tile_occupied",
            PlacementError::DuplicateUnique { .. } => "duplicate_unique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// Refuse to build on anything but an empty tile.
    #[serde(default = "default_true")]
    pub require_empty_tile: bool,
    /// Reject a second copy of a unique building (the airport).
    #[serde(default = "default_true")]
    pub enforce_unique: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            require_empty_tile: true,
            enforce_unique: true,
        }
    }
}

/// What a successful placement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub coord: Coord,
    pub building: BuildingType,
    pub replaced: BuildingType,
    pub cost: i64,
}

/// Validates and applies build and bulldoze actions.
///
/// Every check runs before anything is written, so a rejected action leaves
/// both the grid and the treasury untouched.
pub struct Placer<'a> {
    pub catalog: &'a Catalog,
    pub policy: PlacementPolicy,
    pub construction_ticks: u32,
}

impl Placer<'_> {
    pub fn place(
        &self,
        grid: &mut Grid,
        treasury: &mut i64,
        x: i32,
        y: i32,
        tool: BuildingType,
    ) -> Result<Placement, PlacementError> {
        let coord = grid.coord(x, y)?;
        let current = *grid.tile(coord);

        if tool == BuildingType::None {
            grid.set(coord, Tile::EMPTY);
            tracing::debug!(x, y, replaced = %current.building(), "bulldozed");
            return Ok(Placement {
                coord,
                building: BuildingType::None,
                replaced: current.building(),
                cost: 0,
            });
        }

        self.check_site(grid, coord, tool)?;

        let cost = i64::from(self.catalog.config_for(tool).cost);
        if *treasury < cost {
            return Err(PlacementError::InsufficientFunds {
                required: cost,
                available: *treasury,
            });
        }

        *treasury -= cost;
        let tile = if tool.needs_construction() {
            Tile::under_construction(tool, self.construction_ticks)
        } else {
            Tile::active(tool)
        };
        grid.set(coord, tile);
        tracing::debug!(x, y, building = %tool, cost, "placed");

        Ok(Placement {
            coord,
            building: tool,
            replaced: current.building(),
            cost,
        })
    }

    /// Drop an already-finished building onto the grid at no charge.
    pub fn prebuild(
        &self,
        grid: &mut Grid,
        x: i32,
        y: i32,
        building: BuildingType,
    ) -> Result<Placement, PlacementError> {
        let coord = grid.coord(x, y)?;
        let current = *grid.tile(coord);
        if building != BuildingType::None {
            self.check_site(grid, coord, building)?;
        }
        grid.set(coord, Tile::active(building));
        Ok(Placement {
            coord,
            building,
            replaced: current.building(),
            cost: 0,
        })
    }

    fn check_site(
        &self,
        grid: &Grid,
        coord: Coord,
        tool: BuildingType,
    ) -> Result<(), PlacementError> {
        let occupant = grid.tile(coord).building();
        let blocked = occupant != BuildingType::None
            && (self.policy.require_empty_tile || occupant == tool);
        if blocked {
            return Err(PlacementError::TileOccupied {
                x: coord.x,
                y: coord.y,
                occupant,
            });
        }
        if self.policy.enforce_unique && tool.is_unique() && grid.count(tool) > 0 {
            return Err(PlacementError::DuplicateUnique { building: tool });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKS: u32 = 5;

    fn placer(catalog: &Catalog, policy: PlacementPolicy) -> Placer<'_> {
        Placer {
            catalog,
            policy,
            construction_ticks: TICKS,
        }
    }

    #[test]
    fn building_debits_cost_and_starts_construction() {
        let catalog = Catalog::standard();
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        let placed = placer(&catalog, PlacementPolicy::default())
            .place(&mut grid, &mut treasury, 3, 4, BuildingType::Residential)
            .unwrap();
        assert_eq!(placed.cost, 100);
        assert_eq!(treasury, 900);
        let tile = grid.get(3, 4).unwrap();
        assert_eq!(tile.building(), BuildingType::Residential);
        assert_eq!(tile.construction_ticks_left(), Some(TICKS));
    }

    #[test]
    fn roads_open_immediately() {
        let catalog = Catalog::standard();
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        placer(&catalog, PlacementPolicy::default())
            .place(&mut grid, &mut treasury, 0, 0, BuildingType::Road)
            .unwrap();
        assert_eq!(treasury, 990);
        assert_eq!(*grid.get(0, 0).unwrap(), Tile::active(BuildingType::Road));
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let catalog = Catalog::standard();
        let mut grid = Grid::new(15);
        let before = grid.clone();
        let mut treasury = 50;
        let err = placer(&catalog, PlacementPolicy::default())
            .place(&mut grid, &mut treasury, 1, 1, BuildingType::Residential)
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::InsufficientFunds {
                required: 100,
                available: 50
            }
        );
        assert_eq!(treasury, 50);
        assert_eq!(grid, before);
    }

    #[test]
    fn exact_funds_are_enough() {
        let catalog = Catalog::standard();
        let mut grid = Grid::new(15);
        let mut treasury = 100;
        placer(&catalog, PlacementPolicy::default())
            .place(&mut grid, &mut treasury, 1, 1, BuildingType::Residential)
            .unwrap();
        assert_eq!(treasury, 0);
    }

    #[test]
    fn occupied_tiles_are_rejected_by_default() {
        let catalog = Catalog::standard();
        let placer = placer(&catalog, PlacementPolicy::default());
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        placer
            .place(&mut grid, &mut treasury, 2, 2, BuildingType::Road)
            .unwrap();
        let err = placer
            .place(&mut grid, &mut treasury, 2, 2, BuildingType::Park)
            .unwrap_err();
        assert_eq!(err.kind(), "tile_occupied");
        assert_eq!(treasury, 990);
        assert!(grid.get(2, 2).unwrap().is_road());
    }

    #[test]
    fn overwrite_policy_replaces_different_buildings() {
        let catalog = Catalog::standard();
        let policy = PlacementPolicy {
            require_empty_tile: false,
            ..Default::default()
        };
        let placer = placer(&catalog, policy);
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        placer
            .place(&mut grid, &mut treasury, 2, 2, BuildingType::Road)
            .unwrap();
        let placed = placer
            .place(&mut grid, &mut treasury, 2, 2, BuildingType::Park)
            .unwrap();
        assert_eq!(placed.replaced, BuildingType::Road);
        assert_eq!(treasury, 940);
        let again = placer.place(&mut grid, &mut treasury, 2, 2, BuildingType::Park);
        assert!(matches!(again, Err(PlacementError::TileOccupied { .. })));
    }

    #[test]
    fn second_airport_is_rejected() {
        let catalog = Catalog::standard();
        let placer = placer(&catalog, PlacementPolicy::default());
        let mut grid = Grid::new(15);
        let mut treasury = 10_000;
        placer
            .place(&mut grid, &mut treasury, 5, 5, BuildingType::Airport)
            .unwrap();
        let err = placer
            .place(&mut grid, &mut treasury, 8, 8, BuildingType::Airport)
            .unwrap_err();
        assert_eq!(
            err,
            PlacementError::DuplicateUnique {
                building: BuildingType::Airport
            }
        );
        assert_eq!(treasury, 8_000);
    }

    #[test]
    fn uniqueness_can_be_switched_off() {
        let catalog = Catalog::standard();
        let policy = PlacementPolicy {
            enforce_unique: false,
            ..Default::default()
        };
        let placer = placer(&catalog, policy);
        let mut grid = Grid::new(15);
        let mut treasury = 10_000;
        for x in [1, 2] {
            placer
                .place(&mut grid, &mut treasury, x, 0, BuildingType::Airport)
                .unwrap();
        }
        assert_eq!(grid.count(BuildingType::Airport), 2);
    }

    #[test]
    fn bulldoze_is_free_and_clears_timers() {
        let catalog = Catalog::standard();
        let placer = placer(&catalog, PlacementPolicy::default());
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        placer
            .place(&mut grid, &mut treasury, 4, 4, BuildingType::Hotel)
            .unwrap();
        let placed = placer
            .place(&mut grid, &mut treasury, 4, 4, BuildingType::None)
            .unwrap();
        assert_eq!(placed.replaced, BuildingType::Hotel);
        assert_eq!(treasury, 600);
        assert_eq!(*grid.get(4, 4).unwrap(), Tile::EMPTY);

        let mut broke = 0;
        placer
            .place(&mut grid, &mut broke, 4, 4, BuildingType::None)
            .unwrap();
        assert_eq!(broke, 0);
    }

    #[test]
    fn off_grid_targets_are_rejected() {
        let catalog = Catalog::standard();
        let placer = placer(&catalog, PlacementPolicy::default());
        let mut grid = Grid::new(15);
        let mut treasury = 1000;
        for tool in [BuildingType::None, BuildingType::Road] {
            let err = placer
                .place(&mut grid, &mut treasury, 15, 0, tool)
                .unwrap_err();
            assert_eq!(err.kind(), "out_of_bounds");
        }
        assert_eq!(treasury, 1000);
    }

    #[test]
    fn prebuild_is_free_and_active() {
        let catalog = Catalog::standard();
        let placer = placer(&catalog, PlacementPolicy::default());
        let mut grid = Grid::new(15);
        placer
            .prebuild(&mut grid, 0, 0, BuildingType::Commercial)
            .unwrap();
        assert!(grid.get(0, 0).unwrap().is_active());
        assert!(placer
            .prebuild(&mut grid, 0, 0, BuildingType::Park)
            .is_err());
    }
}
