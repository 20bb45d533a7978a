//! The simulation actor: the only task that ever touches the `GameState`.
//!
//! It ticks on a fixed interval and applies placement commands between ticks.
//! Everyone else reads immutable frames published after each change.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    catalog::BuildingType,
    engine::Engine,
    grid::Grid,
    placement::{Placement, PlacementError},
    state::GameState,
    tick::TickOutcome,
};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

/// What readers see of the city after a tick or a placement.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    pub scenario: String,
    pub tick: u64,
    pub treasury: i64,
    pub population: i64,
    pub last_tick: Option<TickOutcome>,
    pub grid: Grid,
}

impl Frame {
    fn capture(scenario: &str, state: &GameState, last_tick: Option<TickOutcome>) -> Self {
        Self {
            scenario: scenario.to_string(),
            tick: state.tick(),
            treasury: state.treasury(),
            population: state.population(),
            last_tick,
            grid: state.grid().clone(),
        }
    }
}

enum Command {
    Place {
        x: i32,
        y: i32,
        tool: BuildingType,
        reply: oneshot::Sender<Result<Placement, PlacementError>>,
    },
}

#[derive(Clone)]
pub struct SimHandle {
    commands: mpsc::Sender<Command>,
    latest: watch::Receiver<Arc<Frame>>,
    events: broadcast::Sender<Arc<Frame>>,
}

impl SimHandle {
    /// Outer error: the actor is gone. Inner error: the placement was rejected.
    pub async fn place(
        &self,
        x: i32,
        y: i32,
        tool: BuildingType,
    ) -> Result<Result<Placement, PlacementError>> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Place { x, y, tool, reply })
            .await
            .map_err(|_| anyhow!("simulation has stopped"))?;
        response
            .await
            .map_err(|_| anyhow!("simulation dropped the request"))
    }

    pub fn latest(&self) -> Arc<Frame> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Frame>> {
        self.events.subscribe()
    }
}

pub fn spawn(
    scenario: String,
    engine: Engine,
    state: GameState,
    period: Duration,
) -> (SimHandle, JoinHandle<()>) {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let initial = Arc::new(Frame::capture(&scenario, &state, None));
    let (latest_tx, latest_rx) = watch::channel(initial);
    let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = Actor {
        scenario,
        engine,
        state,
        latest: latest_tx,
        events: events_tx.clone(),
    };
    let task = tokio::spawn(actor.run(period, commands_rx));
    let handle = SimHandle {
        commands: commands_tx,
        latest: latest_rx,
        events: events_tx,
    };
    (handle, task)
}

struct Actor {
    scenario: String,
    engine: Engine,
    state: GameState,
    latest: watch::Sender<Arc<Frame>>,
    events: broadcast::Sender<Arc<Frame>>,
}

impl Actor {
    async fn run(mut self, period: Duration, mut commands: mpsc::Receiver<Command>) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => match self.engine.step(&mut self.state) {
                    Ok(summary) => {
                        self.publish(Some(summary.outcome));
                        if let Some(err) = summary.snapshot_error {
                            tracing::error!(error = %err, tick = summary.outcome.tick, "snapshot write failed");
                        }
                    }
                    Err(err) => tracing::error!(error = %err, tick = self.state.tick(), "tick failed"),
                },
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }
        tracing::info!(scenario = %self.scenario, tick = self.state.tick(), "simulation stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Place { x, y, tool, reply } => {
                let result = self.state.place_building(x, y, tool);
                if result.is_ok() {
                    let last_tick = self.latest.borrow().last_tick;
                    self.publish(last_tick);
                }
                // The caller may have given up waiting; nothing to do then.
                let _ = reply.send(result);
            }
        }
    }

    fn publish(&self, last_tick: Option<TickOutcome>) {
        let frame = Arc::new(Frame::capture(&self.scenario, &self.state, last_tick));
        self.latest.send_replace(frame.clone());
        let _ = self.events.send(frame);
    }
}
