use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{BuildingTypeId, FactionId, ModuleTypeId, ResearchId};
use crate::resources::Resource;
use crate::world::{PlanetId, PlayerId};

/// Convenient result alias for the Imperium library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A blueprint was rejected at save time. Never persisted.
    #[error("invalid blueprint: {0}")]
    Validation(#[from] ValidationError),

    /// A construction or research start was refused because a gate is closed.
    #[error("{0}")]
    Gating(#[from] GatingError),

    /// A uniqueness or state check failed (e.g. a second active research).
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// Reference data failed validation while loading a catalog file.
    #[error("invalid catalog data in {catalog}: {message}")]
    CatalogValidation {
        catalog: &'static str,
        message: String,
    },

    /// A catalog file could not be found.
    #[error("catalog file not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for reference data")]
    ProjectDirsUnavailable,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown planet {0}")]
    UnknownPlanet(PlanetId),

    #[error("unknown blueprint {0}")]
    UnknownBlueprint(i64),

    #[error("unknown building type {0}")]
    UnknownBuildingType(BuildingTypeId),

    #[error("unknown research {0}")]
    UnknownResearch(ResearchId),

    /// Raised when a queue entry id does not refer to a pending order.
    #[error("no pending {kind} queue entry with id {id}")]
    UnknownQueueEntry { kind: &'static str, id: i64 },

    /// Raised when a record belongs to another player.
    #[error("{entity} {id} is not owned by player {player_id}")]
    NotOwned {
        entity: &'static str,
        id: i64,
        player_id: PlayerId,
    },

    /// Raised when a construction order asks for zero units.
    #[error("construction quantity must be at least 1")]
    InvalidQuantity,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reasons a blueprint is rejected when it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("blueprint name must not be empty")]
    EmptyName,

    #[error("slot {slot} is used by more than one module")]
    DuplicateSlot { slot: u32 },

    #[error("slot {slot} is outside the {max_slots} slots of the ship class")]
    SlotOutOfRange { slot: u32, max_slots: usize },

    #[error("{count} modules exceed the ship class maximum of {max_slots}")]
    TooManyModules { count: usize, max_slots: usize },

    #[error("module {module_type_id} level {level} exceeds max level {max_level}")]
    LevelExceedsMax {
        module_type_id: ModuleTypeId,
        level: u32,
        max_level: u32,
    },

    #[error("module {module_type_id} level must be at least 1")]
    ZeroLevel { module_type_id: ModuleTypeId },

    #[error("unknown module type {module_type_id}")]
    UnknownModule { module_type_id: ModuleTypeId },
}

/// A research shortfall for one module instance on a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingResearch {
    pub module_type_id: ModuleTypeId,
    pub research_id: ResearchId,
    pub required_level: u32,
    /// `None` when the player never completed anything on that research line.
    pub current_level: Option<u32>,
}

impl fmt::Display for MissingResearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current_level {
            Some(level) => write!(
                f,
                "module {} needs research {} at level {} (have {})",
                self.module_type_id, self.research_id, self.required_level, level
            ),
            None => write!(
                f,
                "module {} needs research {} at level {} (not researched)",
                self.module_type_id, self.research_id, self.required_level
            ),
        }
    }
}

/// Closed gates on construction or research start.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatingError {
    #[error("missing research: {}", join_missing(.missing))]
    MissingResearch { missing: Vec<MissingResearch> },

    #[error("research {research_id} needs {required} labs, player has {available}")]
    InsufficientLabs {
        research_id: ResearchId,
        required: u32,
        available: u32,
    },

    #[error("research {research_id} needs {required} {resource}/tick, player produces {current}")]
    InsufficientProduction {
        research_id: ResearchId,
        resource: Resource,
        required: u64,
        current: u64,
    },

    #[error("research {research_id} requires research {prerequisite_id} to be completed first")]
    PrerequisiteIncomplete {
        research_id: ResearchId,
        prerequisite_id: ResearchId,
    },

    #[error("research {research_id} is not available to faction {}", format_faction(.faction_id))]
    FactionMismatch {
        research_id: ResearchId,
        faction_id: Option<FactionId>,
    },
}

/// Uniqueness and state conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictError {
    #[error("player {player_id} is already researching {active_research_id}")]
    ResearchAlreadyActive {
        player_id: PlayerId,
        active_research_id: ResearchId,
    },

    #[error("research {research_id} was already started by player {player_id}")]
    ResearchAlreadyStarted {
        player_id: PlayerId,
        research_id: ResearchId,
    },

    #[error("research {research_id} is already completed for player {player_id}")]
    ResearchAlreadyCompleted {
        player_id: PlayerId,
        research_id: ResearchId,
    },

    #[error("player {player_id} has no active research")]
    NoActiveResearch { player_id: PlayerId },

    #[error("blueprint {blueprint_id} is referenced by {pending} pending ship orders")]
    BlueprintInUse { blueprint_id: i64, pending: usize },
}

fn join_missing(missing: &[MissingResearch]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_faction(faction: &Option<FactionId>) -> String {
    match faction {
        Some(id) => id.to_string(),
        None => "<none>".to_string(),
    }
}
