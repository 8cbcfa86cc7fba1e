use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::catalog::{BuildingCatalog, ResearchCatalog, ResearchId};
use crate::error::{ConflictError, Error, Result};
use crate::research::{PlayerResearchProgress, PlayerResearchState, ResearchLevels};
use crate::world::PlayerId;

use super::{
    from_millis, from_optional_millis, is_constraint_violation, signed, to_millis, unsigned, Store,
};

const PROGRESS_COLUMNS: &str =
    "player_id, research_type_id, current_progress, max_progress, started_at, completed_at";

/// Outcome of adding progress to a player's active research.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchAdvance {
    pub progress: PlayerResearchProgress,
    /// True only for the call that set `completed_at`.
    pub completed_now: bool,
}

impl Store {
    pub fn research_progress(&self, player_id: PlayerId) -> Result<Vec<PlayerResearchProgress>> {
        let conn = self.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM player_research WHERE player_id = ?1 \
             ORDER BY started_at, research_type_id"
        ))?;
        let rows = stmt.query_map([player_id], row_to_progress)?;
        let mut progress = Vec::new();
        for row in rows {
            progress.push(row?);
        }
        Ok(progress)
    }

    /// Research levels reached by the player, for module requirement checks.
    pub fn research_levels(
        &self,
        player_id: PlayerId,
        catalog: &ResearchCatalog,
    ) -> Result<ResearchLevels> {
        let completed: Vec<ResearchId> = self
            .research_progress(player_id)?
            .into_iter()
            .filter(PlayerResearchProgress::is_completed)
            .map(|row| row.research_type_id)
            .collect();
        Ok(ResearchLevels::from_completed(catalog, completed))
    }

    /// Load everything the research resolver needs for one player.
    pub fn research_state(
        &self,
        player_id: PlayerId,
        buildings: &BuildingCatalog,
    ) -> Result<PlayerResearchState> {
        let player = self.player(player_id)?.ok_or(Error::UnknownPlayer(player_id))?;
        Ok(PlayerResearchState {
            player_id,
            faction_id: player.faction_id,
            economy: self.player_economy(player_id, buildings)?,
            progress: self.research_progress(player_id)?,
        })
    }

    /// Insert a freshly started progress row.
    ///
    /// The primary key and the single-active index reject a second start;
    /// that rejection is reported as a conflict.
    pub fn insert_research_progress(&self, row: &PlayerResearchProgress) -> Result<()> {
        let conn = self.connection();
        let inserted = conn.execute(
            "INSERT INTO player_research (player_id, research_type_id, current_progress, \
             max_progress, started_at, completed_at) VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
            params![
                row.player_id,
                row.research_type_id,
                signed(row.current_progress),
                signed(row.max_progress),
                to_millis(row.started_at)
            ],
        );
        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_constraint_violation(&err) => {
                Err(conflict_for(&conn, row.player_id, row.research_type_id)?.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the player's active row, returning it.
    pub fn delete_active_research(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<PlayerResearchProgress>> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let Some(active) = active_row(&tx, player_id)? else {
            return Ok(None);
        };
        tx.execute(
            "DELETE FROM player_research WHERE player_id = ?1 AND completed_at IS NULL",
            [player_id],
        )?;
        tx.commit()?;
        Ok(Some(active))
    }

    /// Add `amount` to the active row for `research_id` and complete it once
    /// progress reaches the snapshotted maximum.
    ///
    /// Returns `None` if the player has no active row for that node.
    pub fn advance_research(
        &self,
        player_id: PlayerId,
        research_id: ResearchId,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<ResearchAdvance>> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let updated = tx.execute(
            "UPDATE player_research \
             SET current_progress = MIN(max_progress, current_progress + ?1) \
             WHERE player_id = ?2 AND research_type_id = ?3 AND completed_at IS NULL",
            params![signed(amount), player_id, research_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        let completed = tx.execute(
            "UPDATE player_research SET completed_at = ?1 \
             WHERE player_id = ?2 AND research_type_id = ?3 AND completed_at IS NULL \
             AND current_progress >= max_progress",
            params![to_millis(now), player_id, research_id],
        )?;

        let progress = tx.query_row(
            &format!(
                "SELECT {PROGRESS_COLUMNS} FROM player_research \
                 WHERE player_id = ?1 AND research_type_id = ?2"
            ),
            [player_id, research_id],
            row_to_progress,
        )?;
        tx.commit()?;

        Ok(Some(ResearchAdvance {
            progress,
            completed_now: completed == 1,
        }))
    }
}

fn active_row(conn: &Connection, player_id: PlayerId) -> Result<Option<PlayerResearchProgress>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {PROGRESS_COLUMNS} FROM player_research \
                 WHERE player_id = ?1 AND completed_at IS NULL"
            ),
            [player_id],
            row_to_progress,
        )
        .optional()?;
    Ok(row)
}

fn conflict_for(
    conn: &Connection,
    player_id: PlayerId,
    research_id: ResearchId,
) -> Result<ConflictError> {
    let existing = conn
        .query_row(
            &format!(
                "SELECT {PROGRESS_COLUMNS} FROM player_research \
                 WHERE player_id = ?1 AND research_type_id = ?2"
            ),
            [player_id, research_id],
            row_to_progress,
        )
        .optional()?;

    Ok(match (existing, active_row(conn, player_id)?) {
        (Some(row), _) if row.is_completed() => ConflictError::ResearchAlreadyCompleted {
            player_id,
            research_id,
        },
        (Some(_), _) => ConflictError::ResearchAlreadyStarted {
            player_id,
            research_id,
        },
        (None, Some(active)) => ConflictError::ResearchAlreadyActive {
            player_id,
            active_research_id: active.research_type_id,
        },
        (None, None) => ConflictError::ResearchAlreadyStarted {
            player_id,
            research_id,
        },
    })
}

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<PlayerResearchProgress> {
    Ok(PlayerResearchProgress {
        player_id: row.get(0)?,
        research_type_id: row.get(1)?,
        current_progress: unsigned(row.get(2)?),
        max_progress: unsigned(row.get(3)?),
        started_at: from_millis(row.get(4)?)?,
        completed_at: from_optional_millis(row.get(5)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(research_type_id: ResearchId, max_progress: u64) -> PlayerResearchProgress {
        PlayerResearchProgress {
            player_id: 1,
            research_type_id,
            current_progress: 0,
            max_progress,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn index_rejects_second_active_row() {
        let store = Store::open_in_memory().unwrap();
        store.insert_research_progress(&started(1, 100)).unwrap();
        let err = store
            .insert_research_progress(&started(2, 100))
            .expect_err("one active row per player");
        assert!(matches!(
            err,
            Error::Conflict(ConflictError::ResearchAlreadyActive {
                active_research_id: 1,
                ..
            })
        ));
    }

    #[test]
    fn advance_completes_exactly_once() {
        let store = Store::open_in_memory().unwrap();
        store.insert_research_progress(&started(1, 100)).unwrap();
        let now = Utc::now();

        let first = store.advance_research(1, 1, 60, now).unwrap().unwrap();
        assert!(!first.completed_now);
        assert_eq!(first.progress.current_progress, 60);

        let second = store.advance_research(1, 1, 60, now).unwrap().unwrap();
        assert!(second.completed_now);
        assert_eq!(second.progress.current_progress, 100);
        assert!(second.progress.is_completed());

        assert!(store.advance_research(1, 1, 60, now).unwrap().is_none());
    }

    #[test]
    fn completed_rows_free_the_active_slot() {
        let store = Store::open_in_memory().unwrap();
        store.insert_research_progress(&started(1, 10)).unwrap();
        store.advance_research(1, 1, 10, Utc::now()).unwrap();
        store.insert_research_progress(&started(2, 10)).unwrap();

        let err = store
            .insert_research_progress(&started(1, 10))
            .expect_err("primary key");
        assert!(matches!(
            err,
            Error::Conflict(ConflictError::ResearchAlreadyCompleted { .. })
        ));
    }

    #[test]
    fn cancel_removes_only_the_active_row() {
        let store = Store::open_in_memory().unwrap();
        store.insert_research_progress(&started(1, 10)).unwrap();
        store.advance_research(1, 1, 10, Utc::now()).unwrap();
        store.insert_research_progress(&started(2, 10)).unwrap();

        let removed = store.delete_active_research(1).unwrap().expect("active");
        assert_eq!(removed.research_type_id, 2);
        assert_eq!(store.research_progress(1).unwrap().len(), 1);
        assert!(store.delete_active_research(1).unwrap().is_none());
    }
}
