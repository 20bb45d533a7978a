//! Game settings, normally read from the `config:` block of a scenario file.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingType, Catalog, CatalogOverride};
use crate::placement::PlacementPolicy;

pub const GRID_SIZE: usize = 15;
pub const INITIAL_MONEY: i64 = 1000;
pub const INITIAL_CONSTRUCTION_TICKS: u32 = 5;
pub const TICK_PERIOD_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_initial_money")]
    pub initial_money: i64,
    #[serde(default = "default_construction_ticks")]
    pub construction_ticks: u32,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default)]
    pub placement: PlacementPolicy,
    #[serde(default)]
    pub catalog: HashMap<BuildingType, CatalogOverride>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_grid_size() -> usize {
    GRID_SIZE
}

fn default_initial_money() -> i64 {
    INITIAL_MONEY
}

fn default_construction_ticks() -> u32 {
    INITIAL_CONSTRUCTION_TICKS
}

fn default_tick_period_ms() -> u64 {
    TICK_PERIOD_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            initial_money: INITIAL_MONEY,
            construction_ticks: INITIAL_CONSTRUCTION_TICKS,
            tick_period_ms: TICK_PERIOD_MS,
            placement: PlacementPolicy::default(),
            catalog: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GameConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid_size > 0, "grid_size must be at least 1");
        ensure!(
            self.grid_size <= i32::MAX as usize,
            "grid_size {} is too large",
            self.grid_size
        );
        ensure!(
            self.construction_ticks > 0,
            "construction_ticks must be at least 1"
        );
        ensure!(self.tick_period_ms > 0, "tick_period_ms must be at least 1");
        Ok(())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::with_overrides(&self.catalog)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}
