use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    state::GameState,
};

/// Pays out income and recounts population from every active building.
pub struct EconomySystem;

impl EconomySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let totals = state.settle_economy();
        if state.treasury() < 0 {
            tracing::debug!(
                tick = ctx.tick,
                treasury = state.treasury(),
                income = totals.income,
                "treasury in debt"
            );
        }
        Ok(())
    }
}
