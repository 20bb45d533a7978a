use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    state::GameState,
};

/// Counts construction timers down; must run before the economy.
pub struct ConstructionSystem;

impl ConstructionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstructionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConstructionSystem {
    fn name(&self) -> &str {
        "construction"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        state.progress_construction();
        Ok(())
    }
}
