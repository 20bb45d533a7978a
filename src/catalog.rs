use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    #[default]
    None,
    Road,
    Residential,
    Commercial,
    Industrial,
    Park,
    Restaurant,
    Hotel,
    Hospital,
    Airport,
}

impl BuildingType {
    pub const ALL: [BuildingType; 10] = [
        BuildingType::None,
        BuildingType::Road,
        BuildingType::Residential,
        BuildingType::Commercial,
        BuildingType::Industrial,
        BuildingType::Park,
        BuildingType::Restaurant,
        BuildingType::Hotel,
        BuildingType::Hospital,
        BuildingType::Airport,
    ];

    /// Everything a player can actually build.
    pub const BUILDABLE: [BuildingType; 9] = [
        BuildingType::Road,
        BuildingType::Residential,
        BuildingType::Commercial,
        BuildingType::Industrial,
        BuildingType::Park,
        BuildingType::Restaurant,
        BuildingType::Hotel,
        BuildingType::Hospital,
        BuildingType::Airport,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn is_road(self) -> bool {
        matches!(self, BuildingType::Road)
    }

    /// Roads open immediately; everything else goes through construction.
    pub fn needs_construction(self) -> bool {
        !matches!(self, BuildingType::None | BuildingType::Road)
    }

    /// At most one per city when the placement policy enforces it.
    pub fn is_unique(self) -> bool {
        matches!(self, BuildingType::Airport)
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(default_entry(*self).name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildingConfig {
    pub kind: BuildingType,
    pub cost: u32,
    pub population: i32,
    pub income: i32,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// Partial override of a catalog entry, as written in a scenario file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CatalogOverride {
    pub cost: Option<u32>,
    pub population: Option<i32>,
    pub income: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: [BuildingConfig; 10],
}

impl Catalog {
    pub fn standard() -> Self {
        Self {
            entries: BuildingType::ALL.map(default_entry),
        }
    }

    pub fn with_overrides(overrides: &HashMap<BuildingType, CatalogOverride>) -> Self {
        let mut catalog = Self::standard();
        for (&kind, patch) in overrides {
            // The empty tile is not purchasable; it stays free and inert.
            if kind == BuildingType::None {
                continue;
            }
            let entry = &mut catalog.entries[kind.index()];
            if let Some(cost) = patch.cost {
                entry.cost = cost;
            }
            if let Some(population) = patch.population {
                entry.population = population;
            }
            if let Some(income) = patch.income {
                entry.income = income;
            }
        }
        catalog
    }

    pub fn config_for(&self, kind: BuildingType) -> &BuildingConfig {
        &self.entries[kind.index()]
    }

    pub fn entries(&self) -> &[BuildingConfig] {
        &self.entries
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn default_entry(kind: BuildingType) -> BuildingConfig {
    let (cost, population, income, name, description, color) = match kind {
        BuildingType::None => (0, 0, 0, "Bulldoze", "Clear a tile", "#8b5a2b"),
        BuildingType::Road => (10, 0, 0, "Road", "Connects buildings", "#444444"),
        BuildingType::Residential => (100, 5, 2, "House", "Homes for 5 residents", "#4caf50"),
        BuildingType::Commercial => (200, 0, 15, "Shop", "Earns 15 per tick", "#2196f3"),
        BuildingType::Industrial => (300, 0, 25, "Factory", "Earns 25 per tick", "#ff9800"),
        BuildingType::Park => (50, 1, -1, "Park", "Green space, small upkeep", "#8bc34a"),
        BuildingType::Restaurant => (150, 0, 10, "Restaurant", "Earns 10 per tick", "#e91e63"),
        BuildingType::Hotel => (400, 10, 30, "Hotel", "Guests and income", "#9c27b0"),
        BuildingType::Hospital => (500, 0, -20, "Hospital", "Upkeep 20 per tick", "#f44336"),
        BuildingType::Airport => (2000, 0, 100, "Airport", "Unique, earns 100 per tick", "#607d8b"),
    };
    BuildingConfig {
        kind,
        cost,
        population,
        income,
        name,
        description,
        color,
    }
}

/// Presentation record a renderer dispatches on. The simulation never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualDescriptor {
    pub color: &'static str,
    pub footprint_height: f32,
    pub model_count: usize,
}

pub fn visual(kind: BuildingType) -> VisualDescriptor {
    let color = default_entry(kind).color;
    let (footprint_height, model_count) = match kind {
        BuildingType::None => (0.0, 1),
        BuildingType::Road => (0.05, 1),
        BuildingType::Residential => (1.0, 3),
        BuildingType::Commercial => (1.6, 3),
        BuildingType::Industrial => (1.2, 2),
        BuildingType::Park => (0.2, 2),
        BuildingType::Restaurant => (0.9, 2),
        BuildingType::Hotel => (2.8, 2),
        BuildingType::Hospital => (2.0, 1),
        BuildingType::Airport => (0.6, 1),
    };
    VisualDescriptor {
        color,
        footprint_height,
        model_count,
    }
}
