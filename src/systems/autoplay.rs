use anyhow::Result;
use rand::{seq::SliceRandom, Rng};
use serde::Deserialize;

use crate::{
    catalog::BuildingType,
    engine::{System, SystemContext},
    rng::SystemRng,
    state::GameState,
};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AutoplayConfig {
    #[serde(default = "default_attempts_per_tick")]
    pub attempts_per_tick: u32,
}

fn default_attempts_per_tick() -> u32 {
    1
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            attempts_per_tick: default_attempts_per_tick(),
        }
    }
}

/// A seeded stand-in player that tries random placements each tick.
///
/// Runs before construction so its buildings start counting down at once.
/// Rejected placements are expected and only logged.
pub struct AutoplaySystem {
    attempts_per_tick: u32,
    placed: u64,
    rejected: u64,
}

impl AutoplaySystem {
    pub fn new(config: AutoplayConfig) -> Self {
        Self {
            attempts_per_tick: config.attempts_per_tick,
            placed: 0,
            rejected: 0,
        }
    }

    pub fn placed(&self) -> u64 {
        self.placed
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl System for AutoplaySystem {
    fn name(&self) -> &str {
        "autoplay"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let size = state.grid().size() as i32;
        for _ in 0..self.attempts_per_tick {
            let x = rng.gen_range(0..size);
            let y = rng.gen_range(0..size);
            let Some(&tool) = BuildingType::BUILDABLE.choose(rng) else {
                continue;
            };
            match state.place_building(x, y, tool) {
                Ok(_) => self.placed += 1,
                Err(err) => {
                    self.rejected += 1;
                    tracing::debug!(tick = ctx.tick, x, y, building = %tool, error = %err, "autoplay placement rejected");
                }
            }
        }
        Ok(())
    }
}
