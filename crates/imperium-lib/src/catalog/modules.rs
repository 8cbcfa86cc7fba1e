//! Ship module catalog loaded from `modules.csv`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::blueprint::StatBlock;
use crate::error::{Error, Result};
use crate::resources::Costs;

use super::ResearchId;

pub type ModuleTypeId = i64;

const CATALOG: &str = "modules.csv";

/// Fixed set of module categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleCategory {
    Weapons,
    Hull,
    Hyperdrive,
    SublightEngine,
    Shields,
    Sensors,
    Cargo,
    LifeSupport,
}

impl ModuleCategory {
    pub const ALL: [ModuleCategory; 8] = [
        ModuleCategory::Weapons,
        ModuleCategory::Hull,
        ModuleCategory::Hyperdrive,
        ModuleCategory::SublightEngine,
        ModuleCategory::Shields,
        ModuleCategory::Sensors,
        ModuleCategory::Cargo,
        ModuleCategory::LifeSupport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleCategory::Weapons => "WEAPONS",
            ModuleCategory::Hull => "HULL",
            ModuleCategory::Hyperdrive => "HYPERDRIVE",
            ModuleCategory::SublightEngine => "SUBLIGHT_ENGINE",
            ModuleCategory::Shields => "SHIELDS",
            ModuleCategory::Sensors => "SENSORS",
            ModuleCategory::Cargo => "CARGO",
            ModuleCategory::LifeSupport => "LIFE_SUPPORT",
        }
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ModuleCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown module category '{s}'"))
    }
}

/// Research a module requires before ships using it may be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRequirement {
    pub research_id: ResearchId,
    pub level: u32,
}

/// Module definition with level-1 stats and costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleType {
    pub id: ModuleTypeId,
    pub name: String,
    pub category: ModuleCategory,
    pub max_level: u32,
    pub base_stats: StatBlock,
    pub base_costs: Costs,
    pub required_research: Option<ResearchRequirement>,
}

impl ModuleType {
    /// Validate module attributes for correctness.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid(format!("module {} has an empty name", self.id)));
        }
        if self.max_level == 0 {
            return Err(invalid(format!(
                "module {} must have max_level of at least 1",
                self.id
            )));
        }

        let stats = self.base_stats.fields();
        let costs = self.base_costs.fields();
        for (value, field) in stats.into_iter().chain(costs) {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "module {}: {field} must be a finite non-negative number",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ModuleRow {
    id: ModuleTypeId,
    name: String,
    category: String,
    max_level: u32,
    hull: Option<f64>,
    damage: Option<f64>,
    shield: Option<f64>,
    sensor_range: Option<f64>,
    cargo: Option<f64>,
    crew: Option<f64>,
    speed: Option<f64>,
    hyperdrive_rating: Option<f64>,
    consumption: Option<f64>,
    cost_credits: Option<f64>,
    cost_durastahl: Option<f64>,
    cost_kristallin: Option<f64>,
    cost_tibanna: Option<f64>,
    build_time_minutes: Option<f64>,
    required_research_id: Option<ResearchId>,
    required_level: Option<u32>,
}

impl ModuleRow {
    fn into_module(self) -> Result<ModuleType> {
        let category = self.category.parse::<ModuleCategory>().map_err(invalid)?;
        let required_research = match (self.required_research_id, self.required_level) {
            (Some(research_id), level) => Some(ResearchRequirement {
                research_id,
                level: level.unwrap_or(1),
            }),
            (None, Some(_)) => {
                return Err(invalid(format!(
                    "module {} sets required_level without required_research_id",
                    self.id
                )))
            }
            (None, None) => None,
        };

        Ok(ModuleType {
            id: self.id,
            name: self.name.trim().to_string(),
            category,
            max_level: self.max_level,
            base_stats: StatBlock {
                hull: self.hull.unwrap_or(0.0),
                damage: self.damage.unwrap_or(0.0),
                shield: self.shield.unwrap_or(0.0),
                sensor_range: self.sensor_range.unwrap_or(0.0),
                cargo: self.cargo.unwrap_or(0.0),
                crew: self.crew.unwrap_or(0.0),
                speed: self.speed.unwrap_or(0.0),
                hyperdrive_rating: self.hyperdrive_rating.unwrap_or(0.0),
                consumption: self.consumption.unwrap_or(0.0),
            },
            base_costs: Costs {
                credits: self.cost_credits.unwrap_or(0.0),
                durastahl: self.cost_durastahl.unwrap_or(0.0),
                kristallin: self.cost_kristallin.unwrap_or(0.0),
                tibanna: self.cost_tibanna.unwrap_or(0.0),
                build_minutes: self.build_time_minutes.unwrap_or(0.0),
            },
            required_research,
        })
    }
}

/// Collection of module definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<ModuleTypeId, ModuleType>,
    source: Option<PathBuf>,
}

impl ModuleCatalog {
    /// Load a module catalog from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = fs::File::open(path)?;
        let mut catalog = Self::from_reader(file)?;
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Load a module catalog from any reader producing CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);
        let mut modules = Vec::new();
        for record in csv_reader.deserialize::<ModuleRow>() {
            let row = record.map_err(|err| invalid(err.to_string()))?;
            modules.push(row.into_module()?);
        }
        Self::from_modules(modules)
    }

    /// Build a catalog from already constructed definitions.
    pub fn from_modules(modules: impl IntoIterator<Item = ModuleType>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for module in modules {
            module.validate()?;
            if by_id.contains_key(&module.id) {
                return Err(invalid(format!("duplicate module id {}", module.id)));
            }
            by_id.insert(module.id, module);
        }
        Ok(Self {
            modules: by_id,
            source: None,
        })
    }

    pub fn get(&self, id: ModuleTypeId) -> Option<&ModuleType> {
        self.modules.get(&id)
    }

    /// All modules in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleType> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Get the source path if the catalog was loaded from a file.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::CatalogValidation {
        catalog: CATALOG,
        message: message.into(),
    }
}
