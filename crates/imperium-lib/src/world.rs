//! Persisted world records the engine reads from and materializes into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blueprint::{BlueprintId, StatBlock};
use crate::catalog::{BuildingTypeId, FactionId};
use crate::resources::Production;

pub type PlayerId = i64;
pub type PlanetId = i64;
pub type BuildingId = i64;
pub type ShipId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub faction_id: Option<FactionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub player_id: PlayerId,
    pub name: String,
}

/// A building on a planet. Buildings ordered through the construction queue
/// exist inactive until their queue entry completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub planet_id: PlanetId,
    pub building_type_id: BuildingTypeId,
    pub is_active: bool,
    pub queue_entry_id: Option<i64>,
}

/// A materialized ship carrying a snapshot of its blueprint's stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub player_id: PlayerId,
    pub planet_id: PlanetId,
    pub blueprint_id: BlueprintId,
    pub stats: StatBlock,
    pub created_at: DateTime<Utc>,
}

/// Output of a player's active buildings, as read by the research resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEconomy {
    pub production: Production,
    pub lab_count: u32,
}
