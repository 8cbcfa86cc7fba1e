//! SQLite persistence for world records, blueprints, queues and research.
//!
//! A [`Store`] owns one connection behind a mutex. Independent processes (or
//! threads holding their own `Store`) may open the same database file; writes
//! that must be atomic run inside `BEGIN IMMEDIATE` transactions and rely on
//! the busy timeout to wait for each other.

mod blueprints;
mod construction;
mod research;
mod world;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};
use tracing::debug;

use crate::error::Result;

pub use research::ResearchAdvance;

/// Environment variable naming the database file used by the CLI and service.
pub const DATABASE_ENV: &str = "IMPERIUM_DATABASE";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    faction_id INTEGER
);

CREATE TABLE IF NOT EXISTS planets (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS buildings (
    id INTEGER PRIMARY KEY,
    planet_id INTEGER NOT NULL,
    building_type_id INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    queue_entry_id INTEGER
);

CREATE TABLE IF NOT EXISTS blueprints (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    ship_class TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS blueprint_modules (
    blueprint_id INTEGER NOT NULL,
    ordinal INTEGER NOT NULL,
    module_type_id INTEGER NOT NULL,
    level INTEGER NOT NULL,
    slot_position INTEGER NOT NULL,
    PRIMARY KEY (blueprint_id, ordinal),
    UNIQUE (blueprint_id, slot_position)
);

CREATE TABLE IF NOT EXISTS ships (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL,
    planet_id INTEGER NOT NULL,
    blueprint_id INTEGER NOT NULL,
    stats TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS building_queue (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL,
    planet_id INTEGER NOT NULL,
    building_type_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    started_at INTEGER NOT NULL,
    required_build_time_minutes INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE TABLE IF NOT EXISTS ship_queue (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL,
    planet_id INTEGER NOT NULL,
    blueprint_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    started_at INTEGER NOT NULL,
    required_build_time_minutes INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE INDEX IF NOT EXISTS building_queue_pending ON building_queue (completed_at);
CREATE INDEX IF NOT EXISTS ship_queue_pending ON ship_queue (completed_at);
CREATE INDEX IF NOT EXISTS buildings_queue_entry ON buildings (queue_entry_id);

CREATE TABLE IF NOT EXISTS player_research (
    player_id INTEGER NOT NULL,
    research_type_id INTEGER NOT NULL,
    current_progress INTEGER NOT NULL DEFAULT 0,
    max_progress INTEGER NOT NULL,
    started_at INTEGER NOT NULL,
    completed_at INTEGER,
    PRIMARY KEY (player_id, research_type_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS player_research_single_active
    ON player_research (player_id) WHERE completed_at IS NULL;
"#;

pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

impl Store {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening store");
        let conn = Connection::open(path)?;
        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Round-trip a trivial query; used by readiness probes.
    pub fn ping(&self) -> Result<()> {
        let conn = self.connection();
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // Uncommitted transactions roll back on drop, so a poisoned lock is still usable.
    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create all tables and indexes that do not exist yet.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, ms))
}

fn from_optional_millis(ms: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    ms.map(from_millis).transpose()
}

// SQLite integers are signed; counters and progress never go negative.
fn unsigned(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn conversion_error(
    column: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, err.into())
}
