//! Construction queue: orders for buildings and ships that complete after a
//! fixed build time.
//!
//! An entry is either pending (`completed_at` is `None`) or complete. The
//! transition happens once, inside [`scanner::scan`], through a conditional
//! update so overlapping scans cannot complete the same entry twice.

pub mod queue;
pub mod scanner;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MILLIS_PER_MINUTE;
use crate::world::{PlanetId, PlayerId};

pub use queue::ConstructionManager;
pub use scanner::{scan, ScanReport};

pub type QueueEntryId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    Building,
    Ship,
}

impl QueueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueKind::Building => "building",
            QueueKind::Ship => "ship",
        }
    }
}

impl std::fmt::Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted construction order.
///
/// `target_id` is the building type for building orders and the blueprint for
/// ship orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub kind: QueueKind,
    pub player_id: PlayerId,
    pub planet_id: PlanetId,
    pub target_id: i64,
    pub quantity: u32,
    pub started_at: DateTime<Utc>,
    /// Fixed when the order is created.
    pub required_build_time_minutes: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn required_millis(&self) -> i64 {
        i64::from(self.required_build_time_minutes) * MILLIS_PER_MINUTE
    }

    pub fn due_at(&self) -> DateTime<Utc> {
        self.started_at + Duration::milliseconds(self.required_millis())
    }

    /// Whether the build time has fully elapsed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.started_at).num_milliseconds();
        elapsed >= self.required_millis()
    }
}
