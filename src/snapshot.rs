//! Save files: the grid as a row-major tile list plus the treasury, verbatim.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;
use crate::grid::{Grid, Tile};
use crate::state::GameState;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save holds a {found}x{found} grid but the game is configured for {expected}x{expected}")]
    GridSizeMismatch { expected: usize, found: usize },
    #[error("save holds {found} tiles, a {size}x{size} grid needs {}", .size * .size)]
    TileCount { size: usize, found: usize },
    #[error("save holds an empty tile with a construction timer")]
    InconsistentTile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub scenario: String,
    pub tick: u64,
    pub saved_at: DateTime<Utc>,
    pub grid_size: usize,
    pub treasury: i64,
    pub population: i64,
    pub tiles: Vec<Tile>,
}

impl SaveFile {
    pub fn capture(state: &GameState, scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            tick: state.tick(),
            saved_at: Utc::now(),
            grid_size: state.grid().size(),
            treasury: state.treasury(),
            population: state.population(),
            tiles: state.grid().tiles().to_vec(),
        }
    }
}

pub fn save(path: impl AsRef<Path>, state: &GameState, scenario: &str) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&SaveFile::capture(state, scenario))?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<SaveFile, SnapshotError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

impl GameState {
    /// Rebuild a running game from a save. Population is recounted from the grid.
    pub fn restore(config: &GameConfig, save: SaveFile) -> Result<Self, SnapshotError> {
        if save.grid_size != config.grid_size {
            return Err(SnapshotError::GridSizeMismatch {
                expected: config.grid_size,
                found: save.grid_size,
            });
        }
        let found = save.tiles.len();
        if found != save.grid_size * save.grid_size {
            return Err(SnapshotError::TileCount {
                size: save.grid_size,
                found,
            });
        }
        let grid = Grid::from_tiles(save.grid_size, save.tiles)
            .ok_or(SnapshotError::InconsistentTile)?;
        Ok(GameState::from_parts(config, grid, save.treasury, save.tick))
    }
}

/// Writes `<dir>/<scenario>/tick_NNNNNN.json` every `interval` ticks; 0 turns it off.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(
        &self,
        state: &GameState,
        scenario: &str,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval == 0 || state.tick() == 0 || state.tick() % self.interval != 0 {
            return Ok(None);
        }
        let path = self
            .dir
            .join(scenario)
            .join(format!("tick_{:06}.json", state.tick()));
        save(&path, state, scenario)?;
        tracing::info!(path = %path.display(), tick = state.tick(), "snapshot written");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingType;

    fn sample_state() -> GameState {
        let mut state = GameState::new(&GameConfig::default());
        state.place_building(0, 0, BuildingType::Road).unwrap();
        state.place_building(1, 0, BuildingType::Residential).unwrap();
        state.prebuild(2, 0, BuildingType::Commercial).unwrap();
        state.advance_tick();
        state
    }

    #[test]
    fn save_and_restore_preserve_grid_and_treasury() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("city.json");
        let state = sample_state();
        save(&path, &state, "test").unwrap();

        let restored = GameState::restore(&GameConfig::default(), load(&path).unwrap()).unwrap();
        assert_eq!(restored.grid(), state.grid());
        assert_eq!(restored.treasury(), state.treasury());
        assert_eq!(restored.population(), state.population());
        assert_eq!(restored.tick(), 1);
        assert_eq!(
            restored.tile(1, 0).unwrap().construction_ticks_left(),
            state.tile(1, 0).unwrap().construction_ticks_left()
        );
    }

    #[test]
    fn restore_rejects_wrong_grid_size() {
        let save = SaveFile::capture(&sample_state(), "test");
        let config = GameConfig {
            grid_size: 10,
            ..Default::default()
        };
        let err = GameState::restore(&config, save).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::GridSizeMismatch {
                expected: 10,
                found: 15
            }
        ));
    }

    #[test]
    fn restore_rejects_truncated_tiles() {
        let mut save = SaveFile::capture(&sample_state(), "test");
        save.tiles.pop();
        let err = GameState::restore(&GameConfig::default(), save).unwrap_err();
        assert!(matches!(err, SnapshotError::TileCount { found: 224, .. }));
    }

    #[test]
    fn writer_respects_interval() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 2);
        let mut state = GameState::new(&GameConfig::default());
        assert!(writer.maybe_write(&state, "demo").unwrap().is_none());
        state.advance_tick();
        assert!(writer.maybe_write(&state, "demo").unwrap().is_none());
        state.advance_tick();
        let path = writer.maybe_write(&state, "demo").unwrap().unwrap();
        assert_eq!(path, dir.path().join("demo").join("tick_000002.json"));
        assert!(path.exists());
    }

    #[test]
    fn disabled_writer_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 0);
        let mut state = GameState::new(&GameConfig::default());
        state.advance_tick();
        assert!(writer.maybe_write(&state, "demo").unwrap().is_none());
    }
}
