use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

use crate::blueprint::{BlueprintId, StatBlock};
use crate::catalog::BuildingTypeId;
use crate::construction::{QueueEntry, QueueEntryId, QueueKind};
use crate::error::Result;
use crate::world::{BuildingId, PlanetId, PlayerId, ShipId};

use super::{from_millis, from_optional_millis, to_millis, Store};

const BUILDING_COLUMNS: &str = "id, player_id, planet_id, building_type_id, quantity, started_at, \
     required_build_time_minutes, completed_at";
const SHIP_COLUMNS: &str = "id, player_id, planet_id, blueprint_id, quantity, started_at, \
     required_build_time_minutes, completed_at";

fn table(kind: QueueKind) -> &'static str {
    match kind {
        QueueKind::Building => "building_queue",
        QueueKind::Ship => "ship_queue",
    }
}

fn columns(kind: QueueKind) -> &'static str {
    match kind {
        QueueKind::Building => BUILDING_COLUMNS,
        QueueKind::Ship => SHIP_COLUMNS,
    }
}

impl Store {
    pub fn insert_ship_order(
        &self,
        player_id: PlayerId,
        planet_id: PlanetId,
        blueprint_id: BlueprintId,
        quantity: u32,
        started_at: DateTime<Utc>,
        required_build_time_minutes: u32,
    ) -> Result<QueueEntry> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO ship_queue (player_id, planet_id, blueprint_id, quantity, started_at, \
             required_build_time_minutes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                player_id,
                planet_id,
                blueprint_id,
                quantity,
                to_millis(started_at),
                required_build_time_minutes
            ],
        )?;
        Ok(QueueEntry {
            id: conn.last_insert_rowid(),
            kind: QueueKind::Ship,
            player_id,
            planet_id,
            target_id: blueprint_id,
            quantity,
            started_at,
            required_build_time_minutes,
            completed_at: None,
        })
    }

    /// Insert a building order together with `quantity` inactive building rows.
    pub fn insert_building_order(
        &self,
        player_id: PlayerId,
        planet_id: PlanetId,
        building_type_id: BuildingTypeId,
        quantity: u32,
        started_at: DateTime<Utc>,
        required_build_time_minutes: u32,
    ) -> Result<QueueEntry> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO building_queue (player_id, planet_id, building_type_id, quantity, \
             started_at, required_build_time_minutes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                player_id,
                planet_id,
                building_type_id,
                quantity,
                to_millis(started_at),
                required_build_time_minutes
            ],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO buildings (planet_id, building_type_id, is_active, queue_entry_id) \
                 VALUES (?1, ?2, 0, ?3)",
            )?;
            for _ in 0..quantity {
                stmt.execute(params![planet_id, building_type_id, id])?;
            }
        }
        tx.commit()?;

        Ok(QueueEntry {
            id,
            kind: QueueKind::Building,
            player_id,
            planet_id,
            target_id: building_type_id,
            quantity,
            started_at,
            required_build_time_minutes,
            completed_at: None,
        })
    }

    /// All entries of both kinds with `completed_at IS NULL`, oldest first.
    pub fn pending_entries(&self) -> Result<Vec<QueueEntry>> {
        let conn = self.connection();
        let mut entries = select_entries(&conn, QueueKind::Building, "completed_at IS NULL", &[])?;
        entries.extend(select_entries(&conn, QueueKind::Ship, "completed_at IS NULL", &[])?);
        entries.sort_by_key(|e| (e.started_at, e.id));
        Ok(entries)
    }

    /// Pending and completed entries for one player, oldest first.
    pub fn entries_for_player(&self, player_id: PlayerId) -> Result<Vec<QueueEntry>> {
        let conn = self.connection();
        let filter = "player_id = ?1";
        let mut entries = select_entries(&conn, QueueKind::Building, filter, &[player_id])?;
        entries.extend(select_entries(&conn, QueueKind::Ship, filter, &[player_id])?);
        entries.sort_by_key(|e| (e.started_at, e.id));
        Ok(entries)
    }

    pub fn queue_entry(&self, kind: QueueKind, id: QueueEntryId) -> Result<Option<QueueEntry>> {
        let conn = self.connection();
        Ok(select_entries(&conn, kind, "id = ?1", &[id])?.into_iter().next())
    }

    /// Complete a ship order and create its ships in one immediate transaction.
    ///
    /// Returns `None` without writing anything if another scan already
    /// completed the entry.
    pub fn complete_ship_entry(
        &self,
        entry: &QueueEntry,
        stats: &StatBlock,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<ShipId>>> {
        let stats = serde_json::to_string(stats)?;
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = tx.execute(
            "UPDATE ship_queue SET completed_at = ?1 WHERE id = ?2 AND completed_at IS NULL",
            params![to_millis(now), entry.id],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let mut ship_ids = Vec::with_capacity(entry.quantity as usize);
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ships (player_id, planet_id, blueprint_id, stats, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for _ in 0..entry.quantity {
                stmt.execute(params![
                    entry.player_id,
                    entry.planet_id,
                    entry.target_id,
                    stats,
                    to_millis(now)
                ])?;
                ship_ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(Some(ship_ids))
    }

    /// Complete a building order and activate its buildings in one transaction.
    pub fn complete_building_entry(
        &self,
        entry: &QueueEntry,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<BuildingId>>> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = tx.execute(
            "UPDATE building_queue SET completed_at = ?1 WHERE id = ?2 AND completed_at IS NULL",
            params![to_millis(now), entry.id],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        tx.execute(
            "UPDATE buildings SET is_active = 1 WHERE queue_entry_id = ?1",
            [entry.id],
        )?;
        let building_ids: Vec<BuildingId> = {
            let mut stmt =
                tx.prepare("SELECT id FROM buildings WHERE queue_entry_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map([entry.id], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        tx.commit()?;
        Ok(Some(building_ids))
    }

    /// Delete a pending entry, and for building orders its inactive buildings.
    ///
    /// Returns the removed entry, or `None` if no pending entry has that id.
    pub fn delete_pending_entry(
        &self,
        kind: QueueKind,
        id: QueueEntryId,
    ) -> Result<Option<QueueEntry>> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(entry) = select_entries(&tx, kind, "id = ?1 AND completed_at IS NULL", &[id])?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND completed_at IS NULL", table(kind)),
            [id],
        )?;
        if kind == QueueKind::Building {
            tx.execute(
                "DELETE FROM buildings WHERE queue_entry_id = ?1 AND is_active = 0",
                [id],
            )?;
        }
        tx.commit()?;
        Ok(Some(entry))
    }
}

fn select_entries(
    conn: &Connection,
    kind: QueueKind,
    filter: &str,
    values: &[i64],
) -> Result<Vec<QueueEntry>> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE {filter} ORDER BY started_at, id",
        columns = columns(kind),
        table = table(kind),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| row_to_entry(kind, row))?;
    let mut entries = Vec::new();
    for entry in rows {
        entries.push(entry?);
    }
    Ok(entries)
}

fn row_to_entry(kind: QueueKind, row: &Row<'_>) -> rusqlite::Result<QueueEntry> {
    Ok(QueueEntry {
        id: row.get(0)?,
        kind,
        player_id: row.get(1)?,
        planet_id: row.get(2)?,
        target_id: row.get(3)?,
        quantity: row.get(4)?,
        started_at: from_millis(row.get(5)?)?,
        required_build_time_minutes: row.get(6)?,
        completed_at: from_optional_millis(row.get(7)?)?,
    })
}
