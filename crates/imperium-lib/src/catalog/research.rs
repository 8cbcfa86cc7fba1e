//! Research tree loaded from `research.csv`.
//!
//! Level 0 nodes are gated by a sustained production rate of exactly one
//! resource; level 1+ nodes are gated by research points and lab count. The
//! CSV keeps one pair of columns per resource, but a row that populates more
//! than one pair is rejected so the gate is never ambiguous.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resources::Resource;

pub type ResearchId = i64;
pub type FactionId = i64;

const CATALOG: &str = "research.csv";

/// How a research node becomes available and what it costs to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ResearchGate {
    /// Requires `per_tick` production of `resource`; finishing takes `total` units.
    Production {
        resource: Resource,
        per_tick: u64,
        total: u64,
    },
    /// Requires `required_lab_count` labs; finishing takes `cost` research points.
    Points { cost: u64, required_lab_count: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchBonus {
    pub kind: String,
    pub value: f64,
}

/// Effects granted on completion. Applying them is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchUnlocks {
    pub building: Option<String>,
    pub ship: Option<String>,
    pub bonus: Option<ResearchBonus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchType {
    pub id: ResearchId,
    pub name: String,
    pub research_level: u32,
    pub faction_id: Option<FactionId>,
    pub prerequisite_id: Option<ResearchId>,
    pub gate: ResearchGate,
    pub unlocks: ResearchUnlocks,
}

impl ResearchType {
    /// Universal nodes are visible to everyone, faction nodes only to members.
    pub fn is_visible_to(&self, faction_id: Option<FactionId>) -> bool {
        match self.faction_id {
            None => true,
            Some(required) => faction_id == Some(required),
        }
    }

    /// Progress target snapshotted into a player's progress row on start.
    pub fn max_progress(&self) -> u64 {
        match self.gate {
            ResearchGate::Production { total, .. } => total,
            ResearchGate::Points { cost, .. } => cost,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResearchRow {
    id: ResearchId,
    name: String,
    research_level: u32,
    faction_id: Option<FactionId>,
    prerequisite_id: Option<ResearchId>,
    required_durastahl_per_tick: Option<u64>,
    required_durastahl_total: Option<u64>,
    required_kristallin_per_tick: Option<u64>,
    required_kristallin_total: Option<u64>,
    required_tibanna_per_tick: Option<u64>,
    required_tibanna_total: Option<u64>,
    required_energie_per_tick: Option<u64>,
    required_energie_total: Option<u64>,
    research_point_cost: Option<u64>,
    required_lab_count: Option<u32>,
    unlocks_building: Option<String>,
    unlocks_ship: Option<String>,
    bonus_type: Option<String>,
    bonus_value: Option<f64>,
}

impl ResearchRow {
    fn resource_columns(&self) -> [(Resource, Option<u64>, Option<u64>); 4] {
        [
            (
                Resource::Durastahl,
                self.required_durastahl_per_tick,
                self.required_durastahl_total,
            ),
            (
                Resource::Kristallin,
                self.required_kristallin_per_tick,
                self.required_kristallin_total,
            ),
            (
                Resource::Tibanna,
                self.required_tibanna_per_tick,
                self.required_tibanna_total,
            ),
            (
                Resource::Energie,
                self.required_energie_per_tick,
                self.required_energie_total,
            ),
        ]
    }

    fn gate(&self) -> Result<ResearchGate> {
        let populated: Vec<(Resource, u64, u64)> = self
            .resource_columns()
            .into_iter()
            .filter_map(|(resource, per_tick, total)| {
                let per_tick = per_tick.unwrap_or(0);
                let total = total.unwrap_or(0);
                (per_tick > 0 || total > 0).then_some((resource, per_tick, total))
            })
            .collect();

        if self.research_level == 0 {
            return match populated.as_slice() {
                [(resource, per_tick, total)] if *per_tick > 0 && *total > 0 => {
                    Ok(ResearchGate::Production {
                        resource: *resource,
                        per_tick: *per_tick,
                        total: *total,
                    })
                }
                [(resource, ..)] => Err(invalid(format!(
                    "research {} needs both per-tick and total {resource} requirements",
                    self.id
                ))),
                [] => Err(invalid(format!(
                    "research {} is level 0 but has no production requirement",
                    self.id
                ))),
                _ => Err(invalid(format!(
                    "research {} populates {} production requirements; exactly one is allowed",
                    self.id,
                    populated.len()
                ))),
            };
        }

        if !populated.is_empty() {
            return Err(invalid(format!(
                "research {} is level {} and must not set production requirements",
                self.id, self.research_level
            )));
        }

        match self.research_point_cost {
            Some(cost) if cost > 0 => Ok(ResearchGate::Points {
                cost,
                required_lab_count: self.required_lab_count.unwrap_or(0),
            }),
            _ => Err(invalid(format!(
                "research {} is level {} but has no research_point_cost",
                self.id, self.research_level
            ))),
        }
    }

    fn into_research(self) -> Result<ResearchType> {
        let gate = self.gate()?;
        let bonus = match (self.bonus_type, self.bonus_value) {
            (Some(kind), value) => Some(ResearchBonus {
                kind,
                value: value.unwrap_or(0.0),
            }),
            (None, _) => None,
        };
        Ok(ResearchType {
            id: self.id,
            name: self.name.trim().to_string(),
            research_level: self.research_level,
            faction_id: self.faction_id,
            prerequisite_id: self.prerequisite_id,
            gate,
            unlocks: ResearchUnlocks {
                building: self.unlocks_building,
                ship: self.unlocks_ship,
                bonus,
            },
        })
    }
}

/// The research tree keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ResearchCatalog {
    nodes: BTreeMap<ResearchId, ResearchType>,
    source: Option<PathBuf>,
}

impl ResearchCatalog {
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
        let mut nodes = Vec::new();
        for record in csv_reader.deserialize::<ResearchRow>() {
            let row = record.map_err(|err| invalid(err.to_string()))?;
            nodes.push(row.into_research()?);
        }
        Self::from_nodes(nodes)
    }

    /// Build a catalog and check that prerequisites form a forest.
    pub fn from_nodes(nodes: impl IntoIterator<Item = ResearchType>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for node in nodes {
            if node.name.is_empty() {
                return Err(invalid(format!("research {} has an empty name", node.id)));
            }
            if by_id.insert(node.id, node).is_some() {
                return Err(invalid("duplicate research id"));
            }
        }

        let catalog = Self {
            nodes: by_id,
            source: None,
        };
        catalog.check_prerequisites()?;
        Ok(catalog)
    }

    fn check_prerequisites(&self) -> Result<()> {
        for node in self.nodes.values() {
            if let Some(prerequisite) = node.prerequisite_id {
                if !self.nodes.contains_key(&prerequisite) {
                    return Err(invalid(format!(
                        "research {} references unknown prerequisite {prerequisite}",
                        node.id
                    )));
                }
            }

            let mut steps = 0;
            let mut current = node.prerequisite_id;
            while let Some(id) = current {
                if id == node.id || steps > self.nodes.len() {
                    return Err(invalid(format!(
                        "research {} has a cyclic prerequisite chain",
                        node.id
                    )));
                }
                steps += 1;
                current = self.nodes.get(&id).and_then(|n| n.prerequisite_id);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: ResearchId) -> Option<&ResearchType> {
        self.nodes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResearchType> {
        self.nodes.values()
    }

    /// Nodes visible to the given faction, in id order.
    pub fn visible_to(&self, faction_id: Option<FactionId>) -> impl Iterator<Item = &ResearchType> {
        self.nodes
            .values()
            .filter(move |node| node.is_visible_to(faction_id))
    }

    /// Walk from `id` up through its prerequisites, starting with `id` itself.
    pub fn chain(&self, id: ResearchId) -> impl Iterator<Item = &ResearchType> {
        let mut current = self.nodes.get(&id);
        std::iter::from_fn(move || {
            let node = current?;
            current = node.prerequisite_id.and_then(|p| self.nodes.get(&p));
            Some(node)
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
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
