use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    catalog::BuildingType, config::GameConfig, state::GameState, systems::AutoplayConfig,
};

fn default_snapshot_interval_ticks() -> u64 {
    0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub config: GameConfig,
    /// Finished buildings the city starts with, free of charge.
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,
    #[serde(default)]
    pub autoplay: Option<AutoplayConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LayoutEntry {
    pub x: i32,
    pub y: i32,
    pub building: BuildingType,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// A bare scenario around the default game settings.
    pub fn sandbox(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            seed: 0,
            ticks: None,
            snapshot_interval_ticks: default_snapshot_interval_ticks(),
            config: GameConfig::default(),
            layout: Vec::new(),
            autoplay: None,
        }
    }

    pub fn build_state(&self) -> Result<GameState> {
        self.config.validate()?;
        let mut state = GameState::new(&self.config);
        for entry in &self.layout {
            state
                .prebuild(entry.x, entry.y, entry.building)
                .with_context(|| {
                    format!(
                        "Scenario '{}' cannot place {} at ({}, {})",
                        self.name, entry.building, entry.x, entry.y
                    )
                })?;
        }
        Ok(state)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
