//! Building types loaded from `buildings.csv`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resources::Resource;

pub type BuildingTypeId = i64;

const CATALOG: &str = "buildings.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingOutput {
    pub resource: Resource,
    pub per_tick: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingType {
    pub id: BuildingTypeId,
    pub name: String,
    pub build_time_minutes: u32,
    pub output: Option<BuildingOutput>,
    pub is_research_lab: bool,
}

#[derive(Debug, Deserialize)]
struct BuildingRow {
    id: BuildingTypeId,
    name: String,
    build_time_minutes: u32,
    produces: Option<String>,
    production_per_tick: Option<u64>,
    #[serde(default)]
    is_research_lab: bool,
}

impl BuildingRow {
    fn into_building(self) -> Result<BuildingType> {
        let output = match (self.produces, self.production_per_tick) {
            (Some(resource), Some(per_tick)) if per_tick > 0 => Some(BuildingOutput {
                resource: resource.parse().map_err(invalid)?,
                per_tick,
            }),
            (Some(_), _) => {
                return Err(invalid(format!(
                    "building {} names a resource but no positive production_per_tick",
                    self.id
                )))
            }
            (None, Some(per_tick)) if per_tick > 0 => {
                return Err(invalid(format!(
                    "building {} sets production_per_tick without a resource",
                    self.id
                )))
            }
            (None, _) => None,
        };

        Ok(BuildingType {
            id: self.id,
            name: self.name.trim().to_string(),
            build_time_minutes: self.build_time_minutes,
            output,
            is_research_lab: self.is_research_lab,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildingCatalog {
    buildings: BTreeMap<BuildingTypeId, BuildingType>,
    source: Option<PathBuf>,
}

impl BuildingCatalog {
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

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);
        let mut buildings = BTreeMap::new();
        for record in csv_reader.deserialize::<BuildingRow>() {
            let row = record.map_err(|err| invalid(err.to_string()))?;
            let building = row.into_building()?;
            if buildings.contains_key(&building.id) {
                return Err(invalid(format!("duplicate building id {}", building.id)));
            }
            buildings.insert(building.id, building);
        }
        Ok(Self {
            buildings,
            source: None,
        })
    }

    pub fn get(&self, id: BuildingTypeId) -> Option<&BuildingType> {
        self.buildings.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingType> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,build_time_minutes,produces,production_per_tick,is_research_lab\n";

    #[test]
    fn parses_producers_and_labs() {
        let csv = format!("{HEADER}1,Mine,30,durastahl,25,false\n2,Labor,60,,,true\n");
        let catalog = BuildingCatalog::from_reader(csv.as_bytes()).expect("parses");
        let mine = catalog.get(1).unwrap();
        assert_eq!(
            mine.output,
            Some(BuildingOutput {
                resource: Resource::Durastahl,
                per_tick: 25
            })
        );
        assert!(!mine.is_research_lab);
        assert!(catalog.get(2).unwrap().is_research_lab);
    }

    #[test]
    fn rejects_resource_without_rate() {
        let csv = format!("{HEADER}1,Mine,30,durastahl,,false\n");
        assert!(BuildingCatalog::from_reader(csv.as_bytes()).is_err());
    }
}
