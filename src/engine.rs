use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::{
    rng::{RngManager, SystemRng},
    snapshot::{SnapshotError, SnapshotWriter},
    state::{GameState, StateSnapshot},
    systems::{BookkeepingSystem, ConstructionSystem, EconomySystem},
    tick::TickOutcome,
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Construction, economy, bookkeeping: the order a tick must follow.
    pub fn with_core_systems(self) -> Self {
        self.with_system(ConstructionSystem::new())
            .with_system(EconomySystem::new())
            .with_system(BookkeepingSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    /// Run every system once and close the tick.
    ///
    /// A failing system aborts the tick before the counter moves. A failed
    /// snapshot write does not: the tick has happened, so it is returned with
    /// the error attached in `snapshot_error`.
    pub fn step(&mut self, state: &mut GameState) -> Result<TickSummary> {
        let ctx = SystemContext {
            tick: state.tick() + 1,
            scenario_name: &self.settings.scenario_name,
        };
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let mut rng_stream = self.rng.stream(system.name());
            let start = Instant::now();
            if let Err(err) = system.run(&ctx, state, &mut rng_stream) {
                state.discard_pending();
                return Err(err).with_context(|| {
                    format!("system '{}' failed on tick {}", system.name(), ctx.tick)
                });
            }
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        let outcome = state.finish_tick();
        let (snapshot_path, snapshot_error) = match self
            .snapshot_writer
            .maybe_write(state, &self.settings.scenario_name)
        {
            Ok(path) => (path, None),
            Err(err) => (None, Some(err)),
        };
        Ok(TickSummary {
            outcome,
            system_reports,
            snapshot_path,
            snapshot_error,
        })
    }

    pub fn run(&mut self, state: &mut GameState, ticks: u64) -> Result<()> {
        self.run_with_hook(state, ticks, |_| {})
    }

    /// Like `run`, handing a snapshot of the state to `hook` after every tick.
    pub fn run_with_hook<F>(&mut self, state: &mut GameState, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(StateSnapshot),
    {
        tracing::info!(
            scenario = %self.settings.scenario_name,
            ticks,
            systems = self.systems.len(),
            "engine run started"
        );
        for _ in 0..ticks {
            let summary = self.step(state)?;
            hook(state.snapshot());
            if let Some(err) = summary.snapshot_error {
                return Err(err).with_context(|| {
                    format!("failed to write snapshot for tick {}", summary.outcome.tick)
                });
            }
        }
        tracing::info!(
            scenario = %self.settings.scenario_name,
            tick = state.tick(),
            treasury = state.treasury(),
            population = state.population(),
            "engine run finished"
        );
        Ok(())
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.name()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Debug)]
pub struct TickSummary {
    pub outcome: TickOutcome,
    pub system_reports: Vec<SystemRunReport>,
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_error: Option<SnapshotError>,
}

pub struct SystemContext<'a> {
    /// The tick being computed; the state's counter moves to it once every system has run.
    pub tick: u64,
    pub scenario_name: &'a str,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
