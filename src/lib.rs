pub mod catalog;
pub mod config;
pub mod engine;
pub mod grid;
pub mod hash;
pub mod placement;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod tick;
pub mod topology;
pub mod web;

pub use catalog::{BuildingConfig, BuildingType, Catalog};
pub use config::GameConfig;
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use grid::{Coord, Grid, GridError, Tile};
pub use placement::{Placement, PlacementError, PlacementPolicy};
pub use state::{GameState, StateSnapshot};
pub use tick::TickOutcome;
