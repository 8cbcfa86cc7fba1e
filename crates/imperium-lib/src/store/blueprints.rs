use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::blueprint::{Blueprint, BlueprintDraft, BlueprintId, BlueprintModule, ShipClass};
use crate::error::{ConflictError, Result};
use crate::world::PlayerId;

use super::{conversion_error, from_millis, to_millis, unsigned, Store};

impl Store {
    /// Persist a validated draft. Module order is kept through an ordinal column.
    pub fn insert_blueprint(
        &self,
        player_id: PlayerId,
        draft: &BlueprintDraft,
        now: DateTime<Utc>,
    ) -> Result<Blueprint> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO blueprints (player_id, name, ship_class, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![player_id, draft.name, draft.ship_class.as_str(), to_millis(now)],
        )?;
        let id = tx.last_insert_rowid();
        insert_modules(&tx, id, &draft.modules)?;
        tx.commit()?;

        Ok(Blueprint {
            id,
            player_id,
            name: draft.name.clone(),
            ship_class: draft.ship_class,
            modules: draft.modules.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace name, class and the full module list. `None` if the blueprint is gone;
    /// refused while pending ship orders reference it.
    pub fn update_blueprint(
        &self,
        id: BlueprintId,
        draft: &BlueprintDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Blueprint>> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_not_in_use(&tx, id)?;
        let updated = tx.execute(
            "UPDATE blueprints SET name = ?1, ship_class = ?2, updated_at = ?3 WHERE id = ?4",
            params![draft.name, draft.ship_class.as_str(), to_millis(now), id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tx.execute("DELETE FROM blueprint_modules WHERE blueprint_id = ?1", [id])?;
        insert_modules(&tx, id, &draft.modules)?;
        let blueprint = load_blueprint(&tx, id)?;
        tx.commit()?;
        Ok(blueprint)
    }

    pub fn blueprint(&self, id: BlueprintId) -> Result<Option<Blueprint>> {
        let conn = self.connection();
        load_blueprint(&conn, id)
    }

    pub fn blueprints_for_player(&self, player_id: PlayerId) -> Result<Vec<Blueprint>> {
        let conn = self.connection();
        let ids: Vec<BlueprintId> = {
            let mut stmt =
                conn.prepare("SELECT id FROM blueprints WHERE player_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map([player_id], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };

        let mut blueprints = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(blueprint) = load_blueprint(&conn, id)? {
                blueprints.push(blueprint);
            }
        }
        Ok(blueprints)
    }

    /// Delete a blueprint unless pending ship orders still reference it.
    pub fn delete_blueprint(&self, id: BlueprintId) -> Result<bool> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_not_in_use(&tx, id)?;
        tx.execute("DELETE FROM blueprint_modules WHERE blueprint_id = ?1", [id])?;
        let removed = tx.execute("DELETE FROM blueprints WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}

/// Pending ship orders pin the blueprint they were validated against.
fn ensure_not_in_use(conn: &Connection, id: BlueprintId) -> Result<()> {
    let pending: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ship_queue WHERE blueprint_id = ?1 AND completed_at IS NULL",
        [id],
        |row| row.get(0),
    )?;
    if pending > 0 {
        return Err(ConflictError::BlueprintInUse {
            blueprint_id: id,
            pending: unsigned(pending) as usize,
        }
        .into());
    }
    Ok(())
}

fn insert_modules(
    conn: &Connection,
    blueprint_id: BlueprintId,
    modules: &[BlueprintModule],
) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO blueprint_modules \
         (blueprint_id, ordinal, module_type_id, level, slot_position) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (ordinal, module) in modules.iter().enumerate() {
        stmt.execute(params![
            blueprint_id,
            ordinal as i64,
            module.module_type_id,
            module.level,
            module.slot_position
        ])?;
    }
    Ok(())
}

pub(super) fn load_blueprint(conn: &Connection, id: BlueprintId) -> Result<Option<Blueprint>> {
    let header = conn
        .query_row(
            "SELECT id, player_id, name, ship_class, created_at, updated_at \
             FROM blueprints WHERE id = ?1",
            [id],
            |row| {
                let class: String = row.get(3)?;
                let ship_class: ShipClass =
                    class.parse().map_err(|err: String| conversion_error(3, err))?;
                Ok(Blueprint {
                    id: row.get(0)?,
                    player_id: row.get(1)?,
                    name: row.get(2)?,
                    ship_class,
                    modules: Vec::new(),
                    created_at: from_millis(row.get(4)?)?,
                    updated_at: from_millis(row.get(5)?)?,
                })
            },
        )
        .optional()?;

    let Some(mut blueprint) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT module_type_id, level, slot_position FROM blueprint_modules \
         WHERE blueprint_id = ?1 ORDER BY ordinal",
    )?;
    let rows = stmt.query_map([id], |row| {
        Ok(BlueprintModule {
            module_type_id: row.get(0)?,
            level: row.get(1)?,
            slot_position: row.get(2)?,
        })
    })?;
    for module in rows {
        blueprint.modules.push(module?);
    }
    Ok(Some(blueprint))
}
