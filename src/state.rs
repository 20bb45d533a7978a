use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingType, Catalog};
use crate::config::GameConfig;
use crate::grid::{Coord, Grid, GridError, Tile};
use crate::placement::{Placement, PlacementError, PlacementPolicy, Placer};
use crate::tick::{self, TickOutcome, Totals};

const LEDGER_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickMetrics {
    pub tick: u64,
    pub income: i64,
    pub treasury: i64,
    pub population: i64,
    pub active_buildings: usize,
    pub under_construction: usize,
    pub roads: usize,
}

/// Rolling history of per-tick metrics.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    history: VecDeque<TickMetrics>,
}

impl Ledger {
    pub fn record(&mut self, metrics: TickMetrics) {
        if self.history.len() == LEDGER_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(metrics);
    }

    pub fn latest(&self) -> Option<&TickMetrics> {
        self.history.back()
    }

    pub fn history(&self) -> impl Iterator<Item = &TickMetrics> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Work done by the phases of the tick currently in progress.
#[derive(Debug, Clone, Copy, Default)]
struct PendingTick {
    completed: usize,
    totals: Totals,
}

/// Read-only copy of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub tick: u64,
    pub treasury: i64,
    pub population: i64,
    pub grid_size: usize,
    pub tiles: Vec<Tile>,
}

/// The whole simulation: grid, treasury and the rules they change under.
///
/// Placement and ticking are the only ways to mutate it; both either apply
/// completely or leave the state as it was.
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid,
    catalog: Catalog,
    policy: PlacementPolicy,
    construction_ticks: u32,
    treasury: i64,
    population: i64,
    tick: u64,
    pending: PendingTick,
    pub(crate) ledger: Ledger,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: Grid::new(config.grid_size),
            catalog: config.catalog(),
            policy: config.placement,
            construction_ticks: config.construction_ticks,
            treasury: config.initial_money,
            population: 0,
            tick: 0,
            pending: PendingTick::default(),
            ledger: Ledger::default(),
        }
    }

    pub(crate) fn from_parts(config: &GameConfig, grid: Grid, treasury: i64, elapsed: u64) -> Self {
        let mut state = Self::new(config);
        state.grid = grid;
        state.treasury = treasury;
        state.tick = elapsed;
        state.population = tick::aggregate(&state.grid, &state.catalog).population;
        state
    }

    /// Build `tool` at `(x, y)`, or bulldoze when `tool` is `None`.
    pub fn place_building(
        &mut self,
        x: i32,
        y: i32,
        tool: BuildingType,
    ) -> Result<Placement, PlacementError> {
        let placer = Placer {
            catalog: &self.catalog,
            policy: self.policy,
            construction_ticks: self.construction_ticks,
        };
        placer.place(&mut self.grid, &mut self.treasury, x, y, tool)
    }

    /// Place a finished building for free, as scenario layouts do.
    pub fn prebuild(
        &mut self,
        x: i32,
        y: i32,
        building: BuildingType,
    ) -> Result<Placement, PlacementError> {
        let placer = Placer {
            catalog: &self.catalog,
            policy: self.policy,
            construction_ticks: self.construction_ticks,
        };
        let result = placer.prebuild(&mut self.grid, x, y, building);
        self.population = tick::aggregate(&self.grid, &self.catalog).population;
        result
    }

    /// Run one full tick: construction first, then the economy.
    pub fn advance_tick(&mut self) -> TickOutcome {
        self.progress_construction();
        self.settle_economy();
        self.finish_tick()
    }

    pub(crate) fn progress_construction(&mut self) -> Vec<Coord> {
        let completed = tick::progress_construction(&mut self.grid);
        self.pending.completed += completed.len();
        completed
    }

    pub(crate) fn settle_economy(&mut self) -> Totals {
        let totals = tick::aggregate(&self.grid, &self.catalog);
        tick::settle(&mut self.treasury, &mut self.population, totals);
        self.pending.totals = totals;
        totals
    }

    pub(crate) fn pending_totals(&self) -> Totals {
        self.pending.totals
    }

    /// Drop whatever a half-run tick accumulated.
    pub(crate) fn discard_pending(&mut self) {
        self.pending = PendingTick::default();
    }

    pub(crate) fn finish_tick(&mut self) -> TickOutcome {
        let pending = std::mem::take(&mut self.pending);
        self.tick += 1;
        TickOutcome {
            tick: self.tick,
            treasury: self.treasury,
            population: self.population,
            income: pending.totals.income,
            completed: pending.completed,
        }
    }

    pub fn tile(&self, x: i32, y: i32) -> Result<Tile, GridError> {
        self.grid.get(x, y).copied()
    }

    pub fn treasury(&self) -> i64 {
        self.treasury
    }

    pub fn population(&self) -> i64 {
        self.population
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            tick: self.tick,
            treasury: self.treasury,
            population: self.population,
            grid_size: self.grid.size(),
            tiles: self.grid.tiles().to_vec(),
        }
    }
}
