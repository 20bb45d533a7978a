//! One simulation advance: finish construction, then settle the economy.
//!
//! The two phases run in that order inside a single tick, so a building whose
//! timer runs out this tick already pays and houses people this tick.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::grid::{Coord, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: i64,
    pub population: i64,
    pub active_buildings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub tick: u64,
    pub treasury: i64,
    pub population: i64,
    pub income: i64,
    pub completed: usize,
}

/// Count every running timer down by one and return the tiles that finished.
pub fn progress_construction(grid: &mut Grid) -> Vec<Coord> {
    let mut completed = Vec::new();
    for (coord, tile) in grid.tiles_mut() {
        if tile.is_under_construction() && tile.advance_construction() {
            tracing::debug!(x = coord.x, y = coord.y, building = %tile.building(), "construction finished");
            completed.push(coord);
        }
    }
    completed
}

/// Sum what every active building contributes.
pub fn aggregate(grid: &Grid, catalog: &Catalog) -> Totals {
    grid.tiles()
        .iter()
        .filter(|tile| tile.is_active())
        .fold(Totals::default(), |mut totals, tile| {
            let config = catalog.config_for(tile.building());
            totals.income += i64::from(config.income);
            totals.population += i64::from(config.population);
            totals.active_buildings += 1;
            totals
        })
}

/// Income is added (the treasury may go negative); population is replaced.
pub fn settle(treasury: &mut i64, population: &mut i64, totals: Totals) {
    *treasury = treasury.saturating_add(totals.income);
    *population = totals.population;
}
