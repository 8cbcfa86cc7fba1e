//! Imperium engine library entry points.
//!
//! This crate hosts the three coupled subsystems of the game backend: the
//! blueprint stat/cost calculator, the construction queue, and the research
//! dependency resolver. Reference data is loaded from CSV catalogs and game
//! state lives in SQLite. The CLI and the HTTP service should only depend on
//! the items exported here instead of reimplementing behavior.
//!

pub mod blueprint;
pub mod catalog;
pub mod constants;
pub mod construction;
pub mod error;
pub mod notify;
pub mod research;
pub mod resources;
pub mod store;
pub mod world;

pub use blueprint::{
    calculate, Blueprint, BlueprintDraft, BlueprintId, BlueprintManager, BlueprintModule,
    BlueprintReport, CombatRating, ShipClass, StatBlock,
};
pub use catalog::{resolve_data_dir, Catalog};
pub use construction::{ConstructionManager, QueueEntry, QueueKind, ScanReport};
pub use error::{ConflictError, Error, GatingError, MissingResearch, Result, ValidationError};
pub use notify::{MemorySink, NoopSink, NotificationSink, TracingSink};
pub use research::{ResearchLevels, ResearchManager, ResearchStatus, ResearchView};
pub use resources::{Costs, Production, Resource};
pub use store::Store;
pub use world::{Planet, PlanetId, Player, PlayerId};
