use anyhow::Result;

use crate::{
    catalog::BuildingType,
    engine::{System, SystemContext},
    rng::SystemRng,
    state::{GameState, TickMetrics},
};

pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let grid = state.grid();
        let mut active_buildings = 0;
        let mut under_construction = 0;
        for (coord, tile) in grid.iter() {
            if !tile.is_consistent() {
                tracing::warn!(x = coord.x, y = coord.y, "empty tile carries a construction timer");
            }
            if tile.is_under_construction() {
                under_construction += 1;
            } else if tile.is_active() {
                active_buildings += 1;
            }
        }
        let roads = grid.count(BuildingType::Road);

        let metrics = TickMetrics {
            tick: ctx.tick,
            income: state.pending_totals().income,
            treasury: state.treasury(),
            population: state.population(),
            active_buildings,
            under_construction,
            roads,
        };
        state.ledger.record(metrics);
        Ok(())
    }
}
